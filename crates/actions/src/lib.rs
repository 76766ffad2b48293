//! Declarative action model for conversational command dispatch.
//!
//! An [`Action`] is a registered command/topic: a match discriminant
//! (validator capability or regex) plus the request handlers that consume
//! the messages a conversation accumulates. Actions are collected into an
//! immutable [`ActionRegistry`] at startup; the dispatch engine does the
//! rest.

pub mod action;
pub mod components;
pub mod error;
pub mod handler;
pub mod registry;
pub mod validator;

pub use {
    action::{Action, ActionBuilder, ActionMatcher},
    components::{ComponentResolver, ControllerHandle, StaticComponents},
    error::{Error, Result},
    handler::{HopsComposition, RequestHandler, RequestResult, TypeMismatch},
    registry::ActionRegistry,
    validator::CommandValidator,
};
