//! Errors raised by the core value types.
//!
//! Sub-crates wrap `VbError` as one variant of their own error enum.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum VbError {
    #[error("direction angle must be a finite number of degrees, got {0}")]
    NonFiniteAngle(f64),
}

pub type VbResult<T> = Result<T, VbError>;
