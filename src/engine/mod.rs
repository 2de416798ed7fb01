pub mod error;
pub mod matcher;
pub mod rules;
pub mod stats;

pub use error::{EngineError, EngineResult};
pub use rules::RuleEngine;
