//! Route inbound conversation messages to registered action handlers.
//!
//! Flow per message: consult the session → resolve the action (first
//! message only) → append to the accumulated sequence → pick the most
//! specific handler by hop distance → execute it → interpret the outcome
//! (OK / RETRY / ABORT) and advance or clear the session.

pub mod dispatcher;
pub mod error;
pub mod resolve;

pub use {
    dispatcher::Dispatcher,
    error::{Error, Result},
    resolve::{resolve_action, resolve_handler},
};
