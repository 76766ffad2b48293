use std::{any::Any, collections::HashMap, sync::Arc};

use crate::validator::CommandValidator;

/// Opaque controller instance handed to handler execution. Concrete
/// handlers downcast to the controller type they were written against.
pub type ControllerHandle = Arc<dyn Any + Send + Sync>;

/// External component lookup: the dispatch engine never constructs
/// controllers or validators, it only asks for them by key.
///
/// Implementations must be safe for concurrent lookups — independent
/// conversations resolve components without coordination.
pub trait ComponentResolver: Send + Sync {
    fn controller(&self, key: &str) -> Option<ControllerHandle>;

    fn validator(&self, key: &str) -> Option<Arc<dyn CommandValidator>>;
}

/// Map-backed [`ComponentResolver`] for hosts that wire components up
/// directly instead of bridging a DI container.
#[derive(Default)]
pub struct StaticComponents {
    controllers: HashMap<String, ControllerHandle>,
    validators: HashMap<String, Arc<dyn CommandValidator>>,
}

impl StaticComponents {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_controller(mut self, key: impl Into<String>, controller: ControllerHandle) -> Self {
        self.controllers.insert(key.into(), controller);
        self
    }

    #[must_use]
    pub fn with_validator(
        mut self,
        key: impl Into<String>,
        validator: Arc<dyn CommandValidator>,
    ) -> Self {
        self.validators.insert(key.into(), validator);
        self
    }
}

impl ComponentResolver for StaticComponents {
    fn controller(&self, key: &str) -> Option<ControllerHandle> {
        self.controllers.get(key).map(Arc::clone)
    }

    fn validator(&self, key: &str) -> Option<Arc<dyn CommandValidator>> {
        self.validators.get(key).map(Arc::clone)
    }
}
