//! # Contract Language
//!
//! A small Java-flavoured source language that compiles to BVM bytecode.
//!
//! - `lexer.rs` - source text to tokens
//! - `parser.rs` - tokens to a statement tree
//! - `codegen.rs` - statement tree to bytecode
//!
//! ## Accepted Subset
//!
//! ```text
//! public class Counter {
//!     public static void main() {
//!         int count;              // slot 0, keeps its value between calls
//!         int step = 2;           // slot 1
//!         if (count < 10) {
//!             count += step;
//!         } else {
//!             count = 0;
//!         }
//!     }
//! }
//! ```
//!
//! - The class and method wrapper is optional; a bare statement list compiles
//!   the same way.
//! - `int`, `long` and `boolean` all declare one 64-bit storage slot. Slots
//!   are handed out from 0 in declaration order and share one flat scope.
//! - Statements: declarations, `=` and compound assignment, `++`/`--`,
//!   `if`/`else`, `while`, `return;` and blocks.
//! - Expressions: `+ - * / %`, comparisons, `== !=`, `&& ||`, unary `!` and
//!   `-`. Comparisons and logic yield 0 or 1. `&&` and `||` evaluate both
//!   operands.

pub mod codegen;
pub mod lexer;
pub mod parser;

use crate::domain::value_objects::Word;
use crate::errors::CompileError;
use std::collections::BTreeMap;

/// Output of [`compile`]: bytecode plus the storage layout it assumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    /// Bytecode ready to deploy or execute.
    pub code: Vec<u8>,
    /// Storage slot of every declared variable.
    pub slots: BTreeMap<String, Word>,
}

impl CompiledContract {
    /// Slot assigned to `name`, if it was declared.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<Word> {
        self.slots.get(name).copied()
    }
}

/// Compile contract source to bytecode.
///
/// # Errors
///
/// Returns the first [`CompileError`] from lexing, parsing or code generation.
pub fn compile(source: &str) -> Result<CompiledContract, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(&tokens)?;
    codegen::generate(&program)
}

// =============================================================================
// TESTS
// =============================================================================
