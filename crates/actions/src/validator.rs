use parley_common::InboundMessage;

/// Capability deciding whether a message opens a given action.
///
/// Validators are looked up through the [`ComponentResolver`] by key, so
/// they stay lifecycle-managed by the host. A plain closure works too via
/// the blanket impl.
///
/// [`ComponentResolver`]: crate::components::ComponentResolver
pub trait CommandValidator: Send + Sync {
    fn validate(&self, message: &InboundMessage) -> bool;
}

impl<F> CommandValidator for F
where
    F: Fn(&InboundMessage) -> bool + Send + Sync,
{
    fn validate(&self, message: &InboundMessage) -> bool {
        self(message)
    }
}
