use thiserror::Error;

use vb_behavior::BehaviorError;
use vb_core::NodeId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("behavior error: {0}")]
    Behavior(#[from] BehaviorError),
}

pub type SimResult<T> = Result<T, SimError>;
