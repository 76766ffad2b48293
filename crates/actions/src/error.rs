use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid regex for action `{action}`: {source}")]
    InvalidRegex {
        action: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate action name `{0}`")]
    DuplicateAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
