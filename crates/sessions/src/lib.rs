//! Per-conversation mutable state.
//!
//! A [`Session`] tracks one conversation: the active action (if any) and
//! the messages accumulated so far. The [`SessionStore`] keys sessions by
//! conversation id and hands out one shared handle per conversation, so
//! the host can enforce strictly sequential dispatch per conversation
//! while distinct conversations run concurrently.

pub mod session;
pub mod store;

pub use {session::Session, store::SessionStore};
