use std::sync::Arc;

use {parley_actions::Action, parley_common::InboundMessage};

/// One conversation's mutable state: the active action plus the messages
/// accumulated since it was opened.
///
/// At most one action is active at a time. The action is set once, on the
/// first message of a conversation, and both fields reset together when
/// the conversation completes or aborts. A session is owned by exactly one
/// conversation and must only ever see one dispatch call at a time.
#[derive(Debug, Default)]
pub struct Session {
    action: Option<Arc<Action>>,
    messages: Vec<InboundMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> Option<&Arc<Action>> {
        self.action.as_ref()
    }

    pub fn messages(&self) -> &[InboundMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// No active action and no accumulated messages.
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.messages.is_empty()
    }

    /// Activate an action for this conversation. Only meaningful while the
    /// session is empty; an already-active action is never replaced.
    pub fn activate(&mut self, action: Arc<Action>) {
        if self.action.is_none() {
            self.action = Some(action);
        }
    }

    /// Append a message in arrival order.
    pub fn push(&mut self, message: InboundMessage) {
        self.messages.push(message);
    }

    /// Drop the most recently appended message (the RETRY contract).
    pub fn drop_last(&mut self) -> Option<InboundMessage> {
        self.messages.pop()
    }

    /// Reset to empty: forget the action and every accumulated message.
    pub fn clear(&mut self) {
        self.action = None;
        self.messages.clear();
    }
}
