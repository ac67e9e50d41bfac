//! # Error Types
//!
//! All error types for bytecode execution, assembly and compilation.

use crate::domain::value_objects::Word;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// VM ERRORS
// =============================================================================

/// Errors that terminate a BVM execution.
///
/// Every variant is final for the run that raised it; nothing is retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum VmError {
    /// An operation required more operands than were on the stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// A push would exceed the maximum stack depth.
    #[error("stack overflow")]
    StackOverflow,

    /// Remaining gas could not pay for the next instruction.
    #[error("out of gas")]
    OutOfGas,

    /// Byte at `pc` is not in the instruction set.
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    /// JUMP/JUMPI target is not a registered jump destination.
    #[error("invalid jump destination: {0}")]
    InvalidJumpDestination(Word),

    /// PUSH1 was the last byte of code.
    #[error("missing immediate operand")]
    MissingImmediateOperand,
}

impl VmError {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StackUnderflow => "StackUnderflow",
            Self::StackOverflow => "StackOverflow",
            Self::OutOfGas => "OutOfGas",
            Self::InvalidOpcode(_) => "InvalidOpcode",
            Self::InvalidJumpDestination(_) => "InvalidJumpDestination",
            Self::MissingImmediateOperand => "MissingImmediateOperand",
        }
    }

    /// Returns true if the error was caused by the stack bounds.
    #[must_use]
    pub fn is_stack_error(&self) -> bool {
        matches!(self, Self::StackUnderflow | Self::StackOverflow)
    }
}

// =============================================================================
// ASSEMBLER ERRORS
// =============================================================================

/// Errors raised while assembling BVM source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// Mnemonic is not part of the instruction set.
    #[error("line {line}: unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic {
        /// Source line (1-based).
        line: usize,
        /// Offending token.
        mnemonic: String,
    },

    /// PUSH1 without an operand.
    #[error("line {line}: `{mnemonic}` expects an operand")]
    MissingOperand {
        /// Source line (1-based).
        line: usize,
        /// Instruction missing its operand.
        mnemonic: String,
    },

    /// Operand given to an instruction that takes none.
    #[error("line {line}: `{mnemonic}` takes no operand")]
    UnexpectedOperand {
        /// Source line (1-based).
        line: usize,
        /// Instruction the operand followed.
        mnemonic: String,
    },

    /// Operand could not be parsed as a number or label reference.
    #[error("line {line}: invalid operand `{operand}`")]
    InvalidOperand {
        /// Source line (1-based).
        line: usize,
        /// Operand text as written.
        operand: String,
    },

    /// Numeric operand does not fit in one byte.
    #[error("line {line}: operand {value} out of range 0..=255")]
    OperandOutOfRange {
        /// Source line (1-based).
        line: usize,
        /// Parsed value.
        value: i128,
    },

    /// Label defined more than once.
    #[error("line {line}: duplicate label `{label}`")]
    DuplicateLabel {
        /// Line of the second definition.
        line: usize,
        /// Label name.
        label: String,
    },

    /// Label referenced but never defined.
    #[error("line {line}: undefined label `{label}`")]
    UndefinedLabel {
        /// Line of the reference.
        line: usize,
        /// Label name.
        label: String,
    },

    /// Label resolves to an offset that a one-byte immediate cannot encode.
    #[error("line {line}: label `{label}` at offset {offset} does not fit in one byte")]
    LabelOutOfRange {
        /// Line of the reference.
        line: usize,
        /// Label name.
        label: String,
        /// Resolved code offset.
        offset: usize,
    },
}

impl AsmError {
    /// Source line the error refers to (1-based).
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UnknownMnemonic { line, .. }
            | Self::MissingOperand { line, .. }
            | Self::UnexpectedOperand { line, .. }
            | Self::InvalidOperand { line, .. }
            | Self::OperandOutOfRange { line, .. }
            | Self::DuplicateLabel { line, .. }
            | Self::UndefinedLabel { line, .. }
            | Self::LabelOutOfRange { line, .. } => *line,
        }
    }
}

// =============================================================================
// COMPILER ERRORS
// =============================================================================

/// Errors raised while compiling contract source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Character that starts no token.
    #[error("line {line}: unexpected character `{ch}`")]
    UnexpectedChar {
        /// Source line (1-based).
        line: usize,
        /// Offending character.
        ch: char,
    },

    /// `/*` comment never closed.
    #[error("line {line}: unterminated block comment")]
    UnterminatedComment {
        /// Line the comment opened on.
        line: usize,
    },

    /// Token that does not fit the grammar at this point.
    #[error("line {line}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        /// Source line (1-based).
        line: usize,
        /// What the parser was looking for.
        expected: String,
        /// Token text as written.
        found: String,
    },

    /// Source ended in the middle of a construct.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for.
        expected: String,
    },

    /// Integer literal larger than a word.
    #[error("line {line}: integer literal `{literal}` out of range")]
    LiteralOutOfRange {
        /// Source line (1-based).
        line: usize,
        /// Literal as written.
        literal: String,
    },

    /// Variable used before its declaration.
    #[error("line {line}: undefined variable `{name}`")]
    UndefinedVariable {
        /// Source line (1-based).
        line: usize,
        /// Variable name.
        name: String,
    },

    /// Variable declared twice.
    #[error("line {line}: variable `{name}` already declared")]
    DuplicateVariable {
        /// Line of the second declaration.
        line: usize,
        /// Variable name.
        name: String,
    },

    /// A jump target lies beyond what PUSH1 can address.
    #[error("jump target at offset {offset} does not fit in one byte")]
    ProgramTooLarge {
        /// Offset of the unreachable JUMPDEST.
        offset: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================
