use std::{cmp::Ordering, sync::Arc};

use {async_trait::async_trait, thiserror::Error};

use {crate::components::ControllerHandle, parley_common::InboundMessage};

/// Outcome of one handler execution, driving the session transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestResult {
    /// Accept the input and move on.
    #[default]
    Ok,
    /// The newest message was unusable; drop it and wait for a replacement.
    Retry,
    /// Abandon the conversation and reset the session.
    Abort,
}

/// The accumulated messages cannot satisfy a handler's parameter types.
///
/// Raised by [`RequestHandler::hops`] and consumed by handler resolution as
/// a filter: the handler drops out of candidacy for the current message
/// set. It never reaches the caller.
#[derive(Debug, Clone, Copy, Error)]
#[error("messages do not satisfy the handler's parameter types")]
pub struct TypeMismatch;

/// A unit of business logic bound to a fixed number of accumulated messages.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// How many accumulated messages this handler consumes.
    fn parameter_count(&self) -> usize;

    /// Coercion distance between the raw messages and this handler's
    /// declared parameter types. Smaller is more specific; zero is a direct
    /// match. Fails with [`TypeMismatch`] when the messages cannot be
    /// coerced at all.
    fn hops(&self, messages: &[InboundMessage]) -> Result<u32, TypeMismatch>;

    /// Run the business logic against the externally resolved controller
    /// and the full accumulated sequence. Failures propagate to the
    /// dispatch caller uninterpreted.
    async fn execute(
        &self,
        controller: ControllerHandle,
        messages: &[InboundMessage],
    ) -> anyhow::Result<RequestResult>;
}

impl std::fmt::Debug for dyn RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("parameter_count", &self.parameter_count())
            .finish()
    }
}

/// A handler paired with its computed hop count, ordered by hop count
/// ascending so candidate lists sort most-specific-first.
#[derive(Clone)]
pub struct HopsComposition {
    hops: u32,
    handler: Arc<dyn RequestHandler>,
}

impl HopsComposition {
    pub fn new(hops: u32, handler: Arc<dyn RequestHandler>) -> Self {
        Self { hops, handler }
    }

    pub fn hops(&self) -> u32 {
        self.hops
    }

    pub fn handler(&self) -> &Arc<dyn RequestHandler> {
        &self.handler
    }

    pub fn into_handler(self) -> Arc<dyn RequestHandler> {
        self.handler
    }
}

impl std::fmt::Debug for HopsComposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HopsComposition")
            .field("hops", &self.hops)
            .field("parameter_count", &self.handler.parameter_count())
            .finish()
    }
}

// Ordering is by hop count alone; the handler is payload, not identity.
impl PartialEq for HopsComposition {
    fn eq(&self, other: &Self) -> bool {
        self.hops == other.hops
    }
}

impl Eq for HopsComposition {}

impl PartialOrd for HopsComposition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HopsComposition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hops.cmp(&other.hops)
    }
}
