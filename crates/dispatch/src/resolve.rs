//! Action and handler resolution.
//!
//! Action resolution runs once per conversation, on the first message.
//! Handler resolution runs on every message: filter the action's handlers
//! to the current arity, rank the survivors by hop distance, and take the
//! unique most specific one — an equal-distance tie is genuine ambiguity
//! and fails loudly rather than picking arbitrarily.

use std::sync::Arc;

use tracing::{debug, error};

use {
    parley_actions::{
        Action, ActionMatcher, ActionRegistry, ComponentResolver, HopsComposition, RequestHandler,
    },
    parley_common::InboundMessage,
};

use crate::error::{Error, Result};

/// Match a message against the registry. Exactly one action must match.
pub fn resolve_action(
    registry: &ActionRegistry,
    components: &dyn ComponentResolver,
    message: &InboundMessage,
) -> Result<Arc<Action>> {
    let mut matching = Vec::new();
    for action in registry.iter() {
        if matches(action, components, message)? {
            matching.push(Arc::clone(action));
        }
    }

    if matching.len() > 1 {
        let names: Vec<String> = matching.iter().map(|a| a.name().to_string()).collect();
        error!(actions = %names.join(", "), "multiple matching commands");
        return Err(Error::MultipleCommandsMatched { names });
    }
    matching.pop().ok_or(Error::CommandNotFound)
}

fn matches(
    action: &Action,
    components: &dyn ComponentResolver,
    message: &InboundMessage,
) -> Result<bool> {
    match action.matcher() {
        ActionMatcher::Validator { key } => {
            let validator = components
                .validator(key)
                .ok_or_else(|| Error::ValidatorUnresolved(key.clone()))?;
            Ok(validator.validate(message))
        },
        ActionMatcher::Regex(regex) => {
            Ok(message.get_text().is_some_and(|text| regex.is_match(text)))
        },
        ActionMatcher::Unmatchable => Ok(false),
    }
}

/// Pick the handler for the current accumulated sequence, or `None` when no
/// handler applies at this arity yet.
pub fn resolve_handler(
    action: &Action,
    messages: &[InboundMessage],
) -> Result<Option<Arc<dyn RequestHandler>>> {
    if action.handlers().is_empty() {
        return Err(Error::NoHandlersDefined {
            action: action.name().to_string(),
        });
    }

    let ranked = ranked_candidates(action, messages);
    if ranked.is_empty() {
        return Ok(None);
    }
    minimal_hop_handler(action, &ranked).map(Some)
}

/// Handlers at the current arity whose hop computation succeeds, sorted by
/// hop count ascending. A type mismatch only removes the handler from
/// candidacy; it is never surfaced.
fn ranked_candidates(action: &Action, messages: &[InboundMessage]) -> Vec<HopsComposition> {
    let mut ranked: Vec<HopsComposition> = action
        .handlers()
        .iter()
        .filter(|handler| handler.parameter_count() == messages.len())
        .filter_map(|handler| match handler.hops(messages) {
            Ok(hops) => Some(HopsComposition::new(hops, Arc::clone(handler))),
            Err(mismatch) => {
                debug!(action = action.name(), %mismatch, "handler dropped from candidacy");
                None
            },
        })
        .collect();
    ranked.sort();
    ranked
}

/// Ascending scan over hop values: the first non-empty bucket decides.
/// A singleton wins; anything more is ambiguous.
fn minimal_hop_handler(
    action: &Action,
    ranked: &[HopsComposition],
) -> Result<Arc<dyn RequestHandler>> {
    let most_hops = ranked.iter().map(HopsComposition::hops).max().unwrap_or(0);

    for hops in 0..=most_hops {
        let mut bucket = ranked.iter().filter(|c| c.hops() == hops);
        match (bucket.next(), bucket.next()) {
            (Some(winner), None) => return Ok(Arc::clone(winner.handler())),
            (Some(_), Some(_)) => {
                return Err(Error::MultipleHandlersFound {
                    action: action.name().to_string(),
                    hops,
                });
            },
            (None, _) => {},
        }
    }

    // The bucket holding `most_hops` is non-empty whenever `ranked` is, so
    // falling out of the loop means the invariant broke upstream.
    Err(Error::HopScanExhausted)
}
