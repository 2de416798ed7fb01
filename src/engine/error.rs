use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("category `{0}` is built-in and cannot be deleted")]
    BuiltinCategory(String),

    #[error("rule `{0}` is built-in and cannot be deleted")]
    BuiltinRule(String),

    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("rule `{0}` carries no pattern for its match target")]
    MissingPattern(String),

    #[error("activity {0} already has a manual category")]
    AlreadyOverridden(Uuid),
}

pub type EngineResult<T> = Result<T, EngineError>;
