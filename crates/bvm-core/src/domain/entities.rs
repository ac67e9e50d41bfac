//! # Core Domain Entities
//!
//! Configuration and result records for a BVM execution.

use crate::domain::value_objects::Word;
use crate::errors::VmError;
use crate::vm::gas::GasProfile;
use crate::vm::jumpdest::JumpAnalysis;
use crate::vm::stack::MAX_STACK_DEPTH;
use crate::vm::storage::Storage;
use serde::{Deserialize, Serialize};

// =============================================================================
// EXECUTION RESULT
// =============================================================================

/// Where and why an execution stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// Error that halted execution.
    pub error: VmError,
    /// Offset of the failing instruction's opcode byte.
    pub pc: usize,
    /// Raw byte at `pc`.
    pub opcode: u8,
}

/// Terminal state of an execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Halted on STOP or by running off the end of the code.
    Success,
    /// Halted on an error.
    Failure(ExecutionFailure),
}

/// Result of executing one program.
///
/// On failure the stack and storage hold whatever state existed when the
/// failing instruction was reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// How execution ended.
    pub status: ExecutionStatus,
    /// Final stack, bottom first, top of stack last.
    pub stack: Vec<Word>,
    /// Final storage.
    pub storage: Storage,
    /// Gas supplied by the caller.
    pub gas_limit: u64,
    /// Gas left unspent.
    pub gas_remaining: u64,
}

impl ExecutionResult {
    /// Creates a successful execution result.
    #[must_use]
    pub fn success(stack: Vec<Word>, storage: Storage, gas_limit: u64, gas_remaining: u64) -> Self {
        Self {
            status: ExecutionStatus::Success,
            stack,
            storage,
            gas_limit,
            gas_remaining,
        }
    }

    /// Creates a failed execution result.
    #[must_use]
    pub fn failure(
        failure: ExecutionFailure,
        stack: Vec<Word>,
        storage: Storage,
        gas_limit: u64,
        gas_remaining: u64,
    ) -> Self {
        Self {
            status: ExecutionStatus::Failure(failure),
            stack,
            storage,
            gas_limit,
            gas_remaining,
        }
    }

    /// Whether execution succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success)
    }

    /// Failure details, if execution failed.
    #[must_use]
    pub fn failure_info(&self) -> Option<&ExecutionFailure> {
        match &self.status {
            ExecutionStatus::Success => None,
            ExecutionStatus::Failure(failure) => Some(failure),
        }
    }

    /// Error that halted execution, if any.
    #[must_use]
    pub fn error(&self) -> Option<VmError> {
        self.failure_info().map(|f| f.error)
    }

    /// Offset of the failing instruction, if any.
    #[must_use]
    pub fn failed_pc(&self) -> Option<usize> {
        self.failure_info().map(|f| f.pc)
    }

    /// Gas consumed.
    #[must_use]
    pub fn gas_used(&self) -> u64 {
        self.gas_limit.saturating_sub(self.gas_remaining)
    }

    /// Top of the final stack.
    #[must_use]
    pub fn top(&self) -> Option<Word> {
        self.stack.last().copied()
    }
}

// =============================================================================
// VM CONFIGURATION
// =============================================================================

/// Virtual machine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Gas schedule to charge instructions against.
    pub gas_profile: GasProfile,
    /// How jump destinations are discovered.
    pub jump_analysis: JumpAnalysis,
}

impl VmConfig {
    /// Stack depth limit (fixed).
    pub const MAX_STACK_DEPTH: usize = MAX_STACK_DEPTH;

    /// Override the gas profile.
    #[must_use]
    pub fn with_gas_profile(mut self, profile: GasProfile) -> Self {
        self.gas_profile = profile;
        self
    }

    /// Override the jump analysis mode.
    #[must_use]
    pub fn with_jump_analysis(mut self, mode: JumpAnalysis) -> Self {
        self.jump_analysis = mode;
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
