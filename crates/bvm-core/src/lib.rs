//! # BVM Core - Bytecode Virtual Machine
//!
//! A small deterministic stack machine for contract bytecode. Programs are
//! byte sequences of single-byte opcodes (PUSH1 carries one inline byte),
//! operate on a 1024-deep stack of signed 64-bit words, read and write a
//! key/value storage, and pay for every instruction in gas.
//!
//! ## Execution Guarantees
//!
//! | Guarantee | Enforcement Location |
//! |-----------|---------------------|
//! | Gas charged before side effects | `vm/interpreter.rs` - `Frame::step()` |
//! | Gas never exceeds the limit | `domain/invariants.rs` - `check_gas_limit_invariant()` |
//! | Bounded stack | `vm/stack.rs` - `Stack::push()` |
//! | Jumps land on JUMPDEST only | `vm/jumpdest.rs` - `JumpTable::contains()` |
//! | No panics on any input | every error surfaces as `ExecutionStatus::Failure` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Interpreter | `vm/interpreter.rs` | Main execution engine |
//! | Stack | `vm/stack.rs` | 1024-item stack |
//! | Storage | `vm/storage.rs` | Ordered key/value slots |
//! | Gas | `vm/gas.rs` | Cost tables and profiles |
//! | Tracing | `vm/trace.rs` | Per-step observation hooks |
//! | Assembler | `asm/` | Text to bytecode and back |
//! | Compiler | `lang/` | Java-style source to bytecode |
//!
//! ## Usage Example
//!
//! ```
//! use bvm_core::prelude::*;
//!
//! let code = assemble("PUSH1 2 PUSH1 3 ADD STOP").unwrap();
//! let result = Interpreter::default().execute(&code, Storage::new(), 100);
//!
//! assert!(result.is_success());
//! assert_eq!(result.top(), Some(5));
//! assert_eq!(result.gas_used(), 9);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod asm;
pub mod domain;
pub mod errors;
pub mod lang;
pub mod vm;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        ExecutionFailure, ExecutionResult, ExecutionStatus, VmConfig,
    };

    // Value objects
    pub use crate::domain::value_objects::Word;

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Errors
    pub use crate::errors::{AsmError, CompileError, VmError};

    // VM components
    pub use crate::vm::{
        execute, CollectingTracer, GasProfile, GasSchedule, Interpreter, JumpAnalysis,
        LogTracer, NoopTracer, Opcode, StepTrace, StepTracer, Storage, MAX_STACK_DEPTH,
    };

    // Assembly
    pub use crate::asm::{assemble, disassemble, listing, Instruction};

    // Source language
    pub use crate::lang::{compile, CompiledContract};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
