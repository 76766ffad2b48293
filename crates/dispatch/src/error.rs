use thiserror::Error;

/// Fatal dispatch failures. Every variant aborts the current dispatch call
/// and leaves the session exactly as it was; none are retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("command not found")]
    CommandNotFound,

    #[error("multiple matching commands: {}", .names.join(", "))]
    MultipleCommandsMatched { names: Vec<String> },

    #[error("no handlers defined for action `{action}`")]
    NoHandlersDefined { action: String },

    #[error("multiple handlers found for action `{action}` at {hops} hops")]
    MultipleHandlersFound { action: String, hops: u32 },

    #[error("validator `{0}` could not be resolved")]
    ValidatorUnresolved(String),

    #[error("controller `{0}` could not be resolved")]
    ControllerUnresolved(String),

    /// The hop scan finished without selecting a winner even though
    /// candidates existed. Not reachable from user input.
    #[error("hop scan exhausted without selecting a handler")]
    HopScanExhausted,

    /// A handler's own execution failure, passed through uninterpreted.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
