//! Engine error type

use thiserror::Error;

/// Precondition failures reported at the engine boundary.
///
/// None of these can occur inside the batch loop; a search that finds
/// nothing is a normal outcome, not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid {buffer} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("No work prepared: call prepare_data before searching")]
    NotPrepared,

    #[error("Invalid nonce range {start}..{end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Kernel {0} is not supported on this CPU")]
    Unsupported(&'static str),

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
