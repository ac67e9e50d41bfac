//! # BVM Interpreter
//!
//! The execution engine for BVM bytecode.
//!
//! Each call to [`Interpreter::execute`] builds a fresh frame (program
//! counter, stack, storage, gas, jump table), so one interpreter can run any
//! number of programs one after another. Execution is synchronous and bounded
//! only by gas; wall-clock limits are the caller's business.
//!
//! Binary operations pop `a` (top of stack) and then `b`, and push `b op a`.

use crate::domain::entities::{ExecutionFailure, ExecutionResult, VmConfig};
use crate::domain::value_objects::{bool_word, Word};
use crate::errors::VmError;
use crate::vm::gas::GasSchedule;
use crate::vm::jumpdest::JumpTable;
use crate::vm::opcodes::Opcode;
use crate::vm::stack::Stack;
use crate::vm::storage::Storage;
use crate::vm::trace::{NoopTracer, StepTrace, StepTracer};
use tracing::debug;

/// Run `code` once with the default configuration.
#[must_use]
pub fn execute(code: &[u8], storage: Storage, gas_limit: u64) -> ExecutionResult {
    Interpreter::default().execute(code, storage, gas_limit)
}

/// Reusable BVM interpreter.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    config: VmConfig,
    schedule: GasSchedule,
}

impl Interpreter {
    /// Create an interpreter for the given configuration.
    #[must_use]
    pub fn new(config: VmConfig) -> Self {
        Self {
            config,
            schedule: GasSchedule::for_profile(config.gas_profile),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Gas schedule derived from the configuration.
    #[must_use]
    pub fn schedule(&self) -> &GasSchedule {
        &self.schedule
    }

    /// Execute `code` against `storage` with `gas_limit` gas.
    ///
    /// Never panics. Every error is reported through the returned
    /// [`ExecutionResult`] together with the partial stack and storage.
    #[must_use]
    pub fn execute(&self, code: &[u8], storage: Storage, gas_limit: u64) -> ExecutionResult {
        self.execute_traced(code, storage, gas_limit, &mut NoopTracer)
    }

    /// Execute `code`, reporting every step to `tracer`.
    pub fn execute_traced<T>(
        &self,
        code: &[u8],
        storage: Storage,
        gas_limit: u64,
        tracer: &mut T,
    ) -> ExecutionResult
    where
        T: StepTracer + ?Sized,
    {
        debug!(
            code_len = code.len(),
            gas_limit,
            gas_profile = ?self.config.gas_profile,
            jump_analysis = ?self.config.jump_analysis,
            "execution started"
        );

        let result = Frame::new(code, storage, gas_limit, self).run(tracer);

        debug!(
            success = result.is_success(),
            gas_used = result.gas_used(),
            stack_depth = result.stack.len(),
            error = ?result.error(),
            pc = ?result.failed_pc(),
            "execution finished"
        );
        result
    }
}

/// What the loop does after a successful step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Control {
    Continue,
    Stop,
}

/// Transient state of one execution.
struct Frame<'a> {
    code: &'a [u8],
    schedule: &'a GasSchedule,
    jump_table: JumpTable,
    pc: usize,
    stack: Stack,
    storage: Storage,
    gas_limit: u64,
    gas_remaining: u64,
}

impl<'a> Frame<'a> {
    fn new(code: &'a [u8], storage: Storage, gas_limit: u64, vm: &'a Interpreter) -> Self {
        Self {
            code,
            schedule: &vm.schedule,
            jump_table: JumpTable::analyze(code, vm.config.jump_analysis),
            pc: 0,
            stack: Stack::new(),
            storage,
            gas_limit,
            gas_remaining: gas_limit,
        }
    }

    fn run<T: StepTracer + ?Sized>(mut self, tracer: &mut T) -> ExecutionResult {
        while let Some(&byte) = self.code.get(self.pc) {
            let pc = self.pc;
            let gas_before = self.gas_remaining;
            let outcome = self.step(byte);

            tracer.on_step(&StepTrace {
                pc,
                opcode: byte,
                gas_before,
                gas_after: self.gas_remaining,
                stack_depth: self.stack.len(),
                stack_top: self.stack.peek(),
                error: outcome.err(),
            });

            match outcome {
                Ok(Control::Continue) => {}
                Ok(Control::Stop) => break,
                Err(error) => {
                    let failure = ExecutionFailure {
                        error,
                        pc,
                        opcode: byte,
                    };
                    return ExecutionResult::failure(
                        failure,
                        self.stack.into_vec(),
                        self.storage,
                        self.gas_limit,
                        self.gas_remaining,
                    );
                }
            }
        }

        ExecutionResult::success(
            self.stack.into_vec(),
            self.storage,
            self.gas_limit,
            self.gas_remaining,
        )
    }

    /// Charge and execute the instruction at `self.pc`.
    fn step(&mut self, byte: u8) -> Result<Control, VmError> {
        let cost = self.schedule.cost(byte);
        if self.gas_remaining < cost {
            return Err(VmError::OutOfGas);
        }
        self.gas_remaining -= cost;
        self.pc += 1;

        let Some(opcode) = Opcode::from_byte(byte) else {
            return Err(VmError::InvalidOpcode(byte));
        };

        match opcode {
            // =================================================================
            // STOP & ARITHMETIC
            // =================================================================
            Opcode::Stop => return Ok(Control::Stop),

            Opcode::Add => self.binary_op(Word::wrapping_add)?,
            Opcode::Sub => self.binary_op(|a, b| b.wrapping_sub(a))?,
            Opcode::Mul => self.binary_op(Word::wrapping_mul)?,
            Opcode::Div => self.binary_op(|a, b| if a == 0 { 0 } else { b.wrapping_div(a) })?,
            Opcode::Mod => self.binary_op(|a, b| if a == 0 { 0 } else { b.wrapping_rem(a) })?,

            // =================================================================
            // COMPARISON
            // =================================================================
            Opcode::Lt => self.binary_op(|a, b| bool_word(b < a))?,
            Opcode::Gt => self.binary_op(|a, b| bool_word(b > a))?,
            Opcode::Lte => self.binary_op(|a, b| bool_word(b <= a))?,
            Opcode::Gte => self.binary_op(|a, b| bool_word(b >= a))?,
            Opcode::Eq => self.binary_op(|a, b| bool_word(a == b))?,
            Opcode::IsZero => {
                let a = self.stack.pop()?;
                self.stack.push(bool_word(a == 0))?;
            }

            // =================================================================
            // STACK & STORAGE
            // =================================================================
            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::SLoad => {
                let key = self.stack.pop()?;
                self.stack.push(self.storage.get(key))?;
            }
            Opcode::SStore => {
                let key = self.stack.pop()?;
                let value = self.stack.pop()?;
                self.storage.set(key, value);
            }
            Opcode::Push1 => {
                let value = *self
                    .code
                    .get(self.pc)
                    .ok_or(VmError::MissingImmediateOperand)?;
                self.stack.push(Word::from(value))?;
                self.pc += 1;
            }

            // =================================================================
            // CONTROL FLOW
            // =================================================================
            Opcode::Jump => {
                let dest = self.stack.pop()?;
                self.jump_to(dest)?;
            }
            Opcode::JumpI => {
                let dest = self.stack.pop()?;
                let condition = self.stack.pop()?;
                if condition != 0 {
                    self.jump_to(dest)?;
                }
            }
            Opcode::JumpDest => {}
        }

        Ok(Control::Continue)
    }

    fn binary_op(&mut self, op: impl FnOnce(Word, Word) -> Word) -> Result<(), VmError> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(op(a, b))
    }

    fn jump_to(&mut self, dest: Word) -> Result<(), VmError> {
        if !self.jump_table.contains(dest) {
            return Err(VmError::InvalidJumpDestination(dest));
        }
        self.pc = usize::try_from(dest).map_err(|_| VmError::InvalidJumpDestination(dest))?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
