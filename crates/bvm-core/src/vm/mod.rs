//! # BVM Implementation
//!
//! The bytecode virtual machine: a deterministic, gas-metered stack machine.
//!
//! ## Components
//!
//! - `interpreter.rs` - Opcode execution engine
//! - `gas.rs` - Gas schedules and costs
//! - `stack.rs` - Bounded operand stack
//! - `storage.rs` - Per-execution key/value storage
//! - `jumpdest.rs` - Jump destination analysis
//! - `opcodes.rs` - Opcode definitions
//! - `trace.rs` - Per-step tracing hooks

pub mod gas;
pub mod interpreter;
pub mod jumpdest;
pub mod opcodes;
pub mod stack;
pub mod storage;
pub mod trace;

pub use gas::{GasProfile, GasSchedule};
pub use interpreter::{execute, Interpreter};
pub use jumpdest::{JumpAnalysis, JumpTable};
pub use opcodes::Opcode;
pub use stack::{Stack, MAX_STACK_DEPTH};
pub use storage::Storage;
pub use trace::{CollectingTracer, LogTracer, NoopTracer, StepTrace, StepTracer};
