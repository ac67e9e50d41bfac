//! # Disassembler
//!
//! Decodes bytecode into an instruction listing, walking code the way the
//! interpreter does (PUSH1 consumes the byte after it).

use crate::vm::opcodes::Opcode;
use serde::Serialize;
use std::fmt;

/// One decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Offset of the opcode byte.
    pub offset: usize,
    /// Raw opcode byte.
    pub byte: u8,
    /// Decoded opcode, `None` for bytes outside the instruction set.
    pub opcode: Option<Opcode>,
    /// PUSH1 immediate, `None` when absent or not applicable.
    pub operand: Option<u8>,
}

impl Instruction {
    /// Bytes this instruction occupies in the code.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + usize::from(self.operand.is_some())
    }

    /// Returns true for a PUSH1 whose immediate is cut off by the end of code.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.opcode.is_some_and(|op| op.immediate_size() > 0) && self.operand.is_none()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}  {:02x}", self.offset, self.byte)?;
        match self.operand {
            Some(value) => write!(f, " {value:02x}")?,
            None => f.write_str("   ")?,
        }

        match (self.opcode, self.operand) {
            (None, _) => write!(f, "  INVALID(0x{:02X})", self.byte),
            (Some(op), Some(value)) => write!(f, "  {op} {value}"),
            (Some(op), None) if self.is_truncated() => write!(f, "  {op} <missing>"),
            (Some(op), None) => write!(f, "  {op}"),
        }
    }
}

/// Decode `code` into instructions.
#[must_use]
pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut offset = 0usize;

    while let Some(&byte) = code.get(offset) {
        let opcode = Opcode::from_byte(byte);
        let operand = match opcode {
            Some(op) if op.immediate_size() > 0 => code.get(offset + 1).copied(),
            _ => None,
        };
        let ins = Instruction {
            offset,
            byte,
            opcode,
            operand,
        };
        offset += ins.size();
        out.push(ins);
    }

    out
}

/// Render `code` as a text listing, one instruction per line.
#[must_use]
pub fn listing(code: &[u8]) -> String {
    let instructions = disassemble(code);
    if instructions.is_empty() {
        return "(empty program)\n".to_string();
    }

    let mut out = String::new();
    for ins in instructions {
        out.push_str(&ins.to_string());
        out.push('\n');
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
