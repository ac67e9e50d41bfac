//! # Error Types
//!
//! Errors raised by world state adapters and the contract service.

use crate::domain::ContractAddress;
use thiserror::Error;

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Errors from state access operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// No account at this address.
    #[error("account not found: {0}")]
    NotFound(ContractAddress),

    /// An account already lives at this address.
    #[error("account already exists: {0}")]
    AlreadyExists(ContractAddress),

    /// Address string is empty or contains unsupported characters.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// Deployment with no code.
    #[error("contract code is empty")]
    EmptyCode,

    /// Deployment code larger than the configured limit.
    #[error("contract code too large: {size} > {max} bytes")]
    CodeTooLarge {
        /// Submitted code size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max: usize,
    },

    /// Reading or writing the backing file failed.
    #[error("state i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded.
    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// SERVICE ERRORS
// =============================================================================

/// Errors from the contract service.
///
/// Bytecode failures are not errors at this level: they come back as an
/// `ExecutionResult` with a failure status.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// State access failed.
    #[error(transparent)]
    State(#[from] StateError),

    /// Execution exceeded the wall-clock budget.
    #[error("execution timeout: exceeded {timeout_ms} ms")]
    Timeout {
        /// Budget that was exceeded.
        timeout_ms: u64,
    },

    /// The blocking worker running the interpreter died.
    #[error("execution worker failed: {0}")]
    Worker(String),
}

impl ServiceError {
    /// Returns true if the call was cut off by the timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
