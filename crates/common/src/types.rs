//! The inbound platform message as the dispatch core sees it.

use serde::{Deserialize, Serialize};

/// One discrete message delivered by the platform transport.
///
/// Matching only ever consults the optional text. Everything else the
/// platform attaches (sender, chat, media descriptors, …) rides along in
/// `payload` and is handed to handlers unexamined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    payload: serde_json::Value,
}

impl InboundMessage {
    /// A plain text message with no platform payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            payload: serde_json::Value::Null,
        }
    }

    /// A message without text (e.g. a sticker or location share).
    pub fn without_text() -> Self {
        Self::default()
    }

    /// Attach the opaque platform payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}
