//! # Step Tracing
//!
//! Observability hook invoked once per executed instruction.
//!
//! Tracers only observe. They receive a copy of the step record after the
//! instruction has been charged and dispatched, and cannot influence control
//! flow, gas or the final result.

use crate::domain::value_objects::Word;
use crate::errors::VmError;
use crate::vm::opcodes::mnemonic_of;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One executed (or attempted) instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTrace {
    /// Offset of the opcode byte.
    pub pc: usize,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Gas before the instruction was charged.
    pub gas_before: u64,
    /// Gas after the instruction was charged.
    pub gas_after: u64,
    /// Stack depth after the instruction ran.
    pub stack_depth: usize,
    /// Top of stack after the instruction ran.
    pub stack_top: Option<Word>,
    /// Error raised by this step, if any.
    pub error: Option<VmError>,
}

impl StepTrace {
    /// Gas charged for this step.
    #[must_use]
    pub fn gas_cost(&self) -> u64 {
        self.gas_before - self.gas_after
    }

    /// Mnemonic of the opcode (hex for unknown bytes).
    #[must_use]
    pub fn mnemonic(&self) -> String {
        mnemonic_of(self.opcode)
    }
}

/// Receives a record for every instruction the interpreter steps through.
pub trait StepTracer {
    /// Called after each step, including the one that failed.
    fn on_step(&mut self, step: &StepTrace);
}

/// Tracer that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl StepTracer for NoopTracer {
    #[inline]
    fn on_step(&mut self, _step: &StepTrace) {}
}

/// Forwards every step to `tracing` at TRACE level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracer;

impl StepTracer for LogTracer {
    fn on_step(&mut self, step: &StepTrace) {
        trace!(
            pc = step.pc,
            opcode = %step.mnemonic(),
            gas_before = step.gas_before,
            gas_after = step.gas_after,
            stack_depth = step.stack_depth,
            error = ?step.error,
            "executing opcode"
        );
    }
}

/// Records every step in memory.
#[derive(Clone, Debug, Default)]
pub struct CollectingTracer {
    steps: Vec<StepTrace>,
}

impl CollectingTracer {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded steps, oldest first.
    #[must_use]
    pub fn steps(&self) -> &[StepTrace] {
        &self.steps
    }

    /// Take the recorded steps, leaving the collector empty.
    pub fn take(&mut self) -> Vec<StepTrace> {
        std::mem::take(&mut self.steps)
    }
}

impl StepTracer for CollectingTracer {
    fn on_step(&mut self, step: &StepTrace) {
        self.steps.push(step.clone());
    }
}

impl<T: StepTracer + ?Sized> StepTracer for &mut T {
    fn on_step(&mut self, step: &StepTrace) {
        (**self).on_step(step);
    }
}

// =============================================================================
// TESTS
// =============================================================================
