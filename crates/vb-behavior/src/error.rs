use thiserror::Error;

use vb_core::VbError;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("an RSU needs at least one direction with approaching or leaving enabled")]
    NoDirections,

    #[error("behavior configuration error: {0}")]
    Config(String),

    #[error("direction file parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] VbError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
