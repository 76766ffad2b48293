use std::sync::Arc;

use crate::{
    action::Action,
    error::{Error, Result},
};

/// Immutable collection of action descriptors, supplied once at startup and
/// shared read-only across every conversation.
#[derive(Debug)]
pub struct ActionRegistry {
    actions: Vec<Arc<Action>>,
}

impl ActionRegistry {
    /// Build the registry. Duplicate action names are rejected: two actions
    /// answering to the same name could never be told apart later.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for action in &actions {
            if !seen.insert(action.name().to_string()) {
                return Err(Error::DuplicateAction(action.name().to_string()));
            }
        }
        Ok(Self {
            actions: actions.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Action>> {
        self.actions.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Action>> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
