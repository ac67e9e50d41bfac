//! # BVM Opcodes
//!
//! Opcode definitions and metadata for the BVM instruction set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// BVM opcode enumeration.
///
/// The instruction set is closed: any byte not listed here is rejected by the
/// interpreter with `InvalidOpcode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
    // 0x00 - Stop and Arithmetic
    Stop = 0x00,
    Add = 0x01,
    Sub = 0x02,
    Mul = 0x03,
    Div = 0x04,
    Mod = 0x06,

    // 0x10 - Comparison
    Lt = 0x10,
    Gt = 0x11,
    Lte = 0x12,
    Gte = 0x13,
    Eq = 0x14,
    IsZero = 0x15,

    // 0x50 - Stack, Storage, Flow
    Pop = 0x50,
    SLoad = 0x54,
    SStore = 0x55,
    Jump = 0x56,
    JumpI = 0x57,
    JumpDest = 0x5B,

    // 0x60 - Push (one immediate byte)
    Push1 = 0x60,
}

impl Opcode {
    /// Every opcode in the table, in byte order.
    pub const ALL: [Opcode; 19] = [
        Self::Stop,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Lt,
        Self::Gt,
        Self::Lte,
        Self::Gte,
        Self::Eq,
        Self::IsZero,
        Self::Pop,
        Self::SLoad,
        Self::SStore,
        Self::Jump,
        Self::JumpI,
        Self::JumpDest,
        Self::Push1,
    ];

    /// Try to decode an opcode from a byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Stop),
            0x01 => Some(Self::Add),
            0x02 => Some(Self::Sub),
            0x03 => Some(Self::Mul),
            0x04 => Some(Self::Div),
            0x06 => Some(Self::Mod),

            0x10 => Some(Self::Lt),
            0x11 => Some(Self::Gt),
            0x12 => Some(Self::Lte),
            0x13 => Some(Self::Gte),
            0x14 => Some(Self::Eq),
            0x15 => Some(Self::IsZero),

            0x50 => Some(Self::Pop),
            0x54 => Some(Self::SLoad),
            0x55 => Some(Self::SStore),
            0x56 => Some(Self::Jump),
            0x57 => Some(Self::JumpI),
            0x5B => Some(Self::JumpDest),

            0x60 => Some(Self::Push1),

            _ => None,
        }
    }

    /// Look an opcode up by its mnemonic (case-insensitive).
    ///
    /// `PUSH` is accepted as an alias for `PUSH1`.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper == "PUSH" {
            return Some(Self::Push1);
        }
        Self::ALL.iter().copied().find(|op| op.mnemonic() == upper)
    }

    /// The raw byte for this opcode.
    #[must_use]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Mnemonic used in diagnostics, traces and assembly listings.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Stop => "STOP",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Lte => "LTE",
            Self::Gte => "GTE",
            Self::Eq => "EQ",
            Self::IsZero => "ISZERO",
            Self::Pop => "POP",
            Self::SLoad => "SLOAD",
            Self::SStore => "SSTORE",
            Self::Jump => "JUMP",
            Self::JumpI => "JUMPI",
            Self::JumpDest => "JUMPDEST",
            Self::Push1 => "PUSH1",
        }
    }

    /// Number of inline immediate bytes following the opcode.
    #[must_use]
    pub fn immediate_size(self) -> usize {
        match self {
            Self::Push1 => 1,
            _ => 0,
        }
    }

    /// Returns true if this opcode terminates execution.
    #[must_use]
    pub fn is_terminating(self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Returns true if this opcode may move the program counter.
    #[must_use]
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Jump | Self::JumpI)
    }

    /// Returns true if this opcode modifies storage.
    #[must_use]
    pub fn is_state_modifying(self) -> bool {
        matches!(self, Self::SStore)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Mnemonic for an arbitrary byte, falling back to its hex form.
#[must_use]
pub fn mnemonic_of(byte: u8) -> String {
    match Opcode::from_byte(byte) {
        Some(op) => op.mnemonic().to_string(),
        None => format!("0x{byte:02X}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================
