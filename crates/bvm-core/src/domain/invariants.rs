//! # Domain Invariants
//!
//! Post-conditions every [`ExecutionResult`] must satisfy, whatever bytecode
//! produced it. Callers that receive results from elsewhere (a worker thread,
//! a persisted record) can re-check them here.

use crate::domain::entities::{ExecutionResult, ExecutionStatus};
use crate::errors::VmError;
use crate::vm::stack::MAX_STACK_DEPTH;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Gas spent never exceeds the limit.
#[must_use]
pub fn check_gas_limit_invariant(result: &ExecutionResult) -> bool {
    result.gas_remaining <= result.gas_limit
}

/// The final stack respects the depth bound.
#[must_use]
pub fn check_stack_bound_invariant(result: &ExecutionResult) -> bool {
    result.stack.len() <= MAX_STACK_DEPTH
}

/// A failure points at a byte that exists and holds the reported opcode.
#[must_use]
pub fn check_failure_location_invariant(result: &ExecutionResult, code: &[u8]) -> bool {
    match &result.status {
        ExecutionStatus::Success => true,
        ExecutionStatus::Failure(failure) => {
            code.get(failure.pc).is_some_and(|byte| *byte == failure.opcode)
        }
    }
}

/// An invalid-opcode failure names the byte it stopped on.
#[must_use]
pub fn check_invalid_opcode_invariant(result: &ExecutionResult) -> bool {
    match &result.status {
        ExecutionStatus::Failure(failure) => match failure.error {
            VmError::InvalidOpcode(byte) => byte == failure.opcode,
            _ => true,
        },
        ExecutionStatus::Success => true,
    }
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(result: &ExecutionResult, code: &[u8]) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_gas_limit_invariant(result) {
        violations.push(InvariantViolation::GasLimitExceeded {
            remaining: result.gas_remaining,
            limit: result.gas_limit,
        });
    }

    if !check_stack_bound_invariant(result) {
        violations.push(InvariantViolation::StackBoundExceeded {
            depth: result.stack.len(),
        });
    }

    if !check_failure_location_invariant(result, code) {
        violations.push(InvariantViolation::FailureLocationMismatch {
            pc: result.failed_pc().unwrap_or_default(),
            code_len: code.len(),
        });
    }

    if !check_invalid_opcode_invariant(result) {
        violations.push(InvariantViolation::InvalidOpcodeMismatch);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Result of an invariant check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More gas reported remaining than was supplied.
    GasLimitExceeded {
        /// Gas reported remaining.
        remaining: u64,
        /// Gas supplied.
        limit: u64,
    },
    /// Stack deeper than the maximum depth.
    StackBoundExceeded {
        /// Final stack depth.
        depth: usize,
    },
    /// Failure pc outside the code or pointing at a different byte.
    FailureLocationMismatch {
        /// Reported failure pc.
        pc: usize,
        /// Length of the executed code.
        code_len: usize,
    },
    /// `InvalidOpcode` payload disagrees with the failing byte.
    InvalidOpcodeMismatch,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GasLimitExceeded { remaining, limit } => {
                write!(f, "gas remaining {remaining} exceeds limit {limit}")
            }
            Self::StackBoundExceeded { depth } => {
                write!(f, "stack depth {depth} exceeds {MAX_STACK_DEPTH}")
            }
            Self::FailureLocationMismatch { pc, code_len } => {
                write!(f, "failure pc {pc} does not match code of length {code_len}")
            }
            Self::InvalidOpcodeMismatch => write!(f, "invalid opcode payload mismatch"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
