use std::sync::Arc;

use regex::Regex;

use crate::{
    error::{Error, Result},
    handler::RequestHandler,
};

/// How an action decides whether an incoming message opens it.
///
/// The variant is selected once, when the action is built: a validator key
/// beats a regex pattern, and an action declaring neither never matches.
#[derive(Debug, Clone)]
pub enum ActionMatcher {
    /// Delegate to a [`CommandValidator`] looked up by component key.
    ///
    /// [`CommandValidator`]: crate::validator::CommandValidator
    Validator { key: String },
    /// Test the pattern against the message text, when the message has any.
    Regex(Regex),
    /// Never matches; the action can only be reached by other means
    /// (e.g. a host wiring it up directly for tests).
    Unmatchable,
}

/// A registered conversational command/topic.
pub struct Action {
    name: String,
    controller: String,
    matcher: ActionMatcher,
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl Action {
    pub fn builder(name: impl Into<String>, controller: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            controller: controller.into(),
            validator: None,
            regex: None,
            handlers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component key of the controller instance handlers execute against.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn matcher(&self) -> &ActionMatcher {
        &self.matcher
    }

    pub fn handlers(&self) -> &[Arc<dyn RequestHandler>] {
        &self.handlers
    }

    /// Largest parameter count declared across this action's handlers.
    ///
    /// Once a session has accumulated this many messages there is nothing
    /// left to wait for, so the conversation completes.
    pub fn max_parameter_count(&self) -> usize {
        self.handlers
            .iter()
            .map(|h| h.parameter_count())
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("controller", &self.controller)
            .field("matcher", &self.matcher)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Builder encoding the discriminant precedence at registration time.
pub struct ActionBuilder {
    name: String,
    controller: String,
    validator: Option<String>,
    regex: Option<String>,
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl ActionBuilder {
    /// Match via a validator component. Takes precedence over any regex.
    #[must_use]
    pub fn validator(mut self, key: impl Into<String>) -> Self {
        self.validator = Some(key.into());
        self
    }

    /// Match via a regex over the message text.
    #[must_use]
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> Result<Action> {
        let matcher = match (self.validator, self.regex) {
            (Some(key), _) => ActionMatcher::Validator { key },
            (None, Some(pattern)) => {
                let regex = Regex::new(&pattern).map_err(|source| Error::InvalidRegex {
                    action: self.name.clone(),
                    source,
                })?;
                ActionMatcher::Regex(regex)
            },
            (None, None) => ActionMatcher::Unmatchable,
        };
        Ok(Action {
            name: self.name,
            controller: self.controller,
            matcher,
            handlers: self.handlers,
        })
    }
}
