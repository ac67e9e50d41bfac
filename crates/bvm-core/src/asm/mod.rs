//! # Assembly Tooling
//!
//! Text front-end for BVM bytecode.
//!
//! - `assembler.rs` - mnemonic source to bytecode, with labels
//! - `disassembler.rs` - bytecode to instruction listing

pub mod assembler;
pub mod disassembler;

pub use assembler::assemble;
pub use disassembler::{disassemble, listing, Instruction};
