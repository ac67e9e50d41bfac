//! # BVM Gas Metering
//!
//! Static gas costs for BVM opcodes.
//!
//! Two schedules exist and are selected explicitly through [`GasProfile`]:
//!
//! | Profile | SSTORE | Notes |
//! |---------|--------|-------|
//! | `Standard` | 5 | Canonical table, used by default |
//! | `StorageHeavy` | 200 | For deployments that price storage writes higher |
//!
//! Every other opcode costs the same under both profiles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// BASE GAS COSTS
// =============================================================================

/// Gas costs for common operations.
pub mod costs {
    /// Zero gas.
    pub const ZERO: u64 = 0;
    /// Jump destination cost.
    pub const JUMPDEST: u64 = 1;
    /// Base cost (e.g., for `POP`, `SLOAD`).
    pub const BASE: u64 = 2;
    /// Very low cost (e.g., for `ADD`).
    pub const VERY_LOW: u64 = 3;
    /// Inclusive comparisons (`LTE`, `GTE`).
    pub const COMPARE_INCLUSIVE: u64 = 4;
    /// Low cost (e.g., for `MUL`).
    pub const LOW: u64 = 5;
    /// Mid cost (`JUMP`).
    pub const MID: u64 = 8;
    /// High cost (`JUMPI`).
    pub const HIGH: u64 = 10;

    /// SSTORE under the standard profile.
    pub const SSTORE: u64 = 5;
    /// SSTORE under the storage-heavy profile.
    pub const SSTORE_HEAVY: u64 = 200;
}

// =============================================================================
// OPCODE GAS COSTS TABLE
// =============================================================================

/// Static gas costs for opcodes under the standard profile.
///
/// Bytes that are not opcodes cost zero.
#[rustfmt::skip]
pub const OPCODE_GAS: [u64; 256] = {
    let mut table = [0u64; 256];

    // Stop and arithmetic
    table[0x00] = costs::ZERO;              // STOP
    table[0x01] = costs::VERY_LOW;          // ADD
    table[0x02] = costs::VERY_LOW;          // SUB
    table[0x03] = costs::LOW;               // MUL
    table[0x04] = costs::LOW;               // DIV
    table[0x06] = costs::LOW;               // MOD

    // Comparison
    table[0x10] = costs::VERY_LOW;          // LT
    table[0x11] = costs::VERY_LOW;          // GT
    table[0x12] = costs::COMPARE_INCLUSIVE; // LTE
    table[0x13] = costs::COMPARE_INCLUSIVE; // GTE
    table[0x14] = costs::VERY_LOW;          // EQ
    table[0x15] = costs::VERY_LOW;          // ISZERO

    // Stack, storage and flow
    table[0x50] = costs::BASE;              // POP
    table[0x54] = costs::BASE;              // SLOAD
    table[0x55] = costs::SSTORE;            // SSTORE
    table[0x56] = costs::MID;               // JUMP
    table[0x57] = costs::HIGH;              // JUMPI
    table[0x5B] = costs::JUMPDEST;          // JUMPDEST

    // Push
    table[0x60] = costs::VERY_LOW;          // PUSH1

    table
};

// =============================================================================
// GAS PROFILES
// =============================================================================

/// Named gas schedule selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GasProfile {
    /// Canonical schedule (SSTORE = 5).
    #[default]
    Standard,
    /// Storage writes priced at 200.
    StorageHeavy,
}

impl FromStr for GasProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "storage-heavy" | "storage_heavy" => Ok(Self::StorageHeavy),
            other => Err(format!("unknown gas profile: {other}")),
        }
    }
}

/// Per-opcode gas lookup table.
///
/// Lookups never fail: bytes outside the instruction set return the
/// caller-supplied default. Rejecting unknown bytes is the interpreter's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasSchedule {
    profile: GasProfile,
    table: [u64; 256],
}

impl GasSchedule {
    /// The canonical schedule.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            profile: GasProfile::Standard,
            table: OPCODE_GAS,
        }
    }

    /// Standard schedule with SSTORE raised to 200.
    #[must_use]
    pub fn storage_heavy() -> Self {
        let mut table = OPCODE_GAS;
        table[0x55] = costs::SSTORE_HEAVY;
        Self {
            profile: GasProfile::StorageHeavy,
            table,
        }
    }

    /// Build the schedule for a profile.
    #[must_use]
    pub fn for_profile(profile: GasProfile) -> Self {
        match profile {
            GasProfile::Standard => Self::standard(),
            GasProfile::StorageHeavy => Self::storage_heavy(),
        }
    }

    /// Profile this schedule was built from.
    #[must_use]
    pub fn profile(&self) -> GasProfile {
        self.profile
    }

    /// Gas cost of `opcode`, zero for unknown bytes.
    #[must_use]
    pub fn cost(&self, opcode: u8) -> u64 {
        self.table[usize::from(opcode)]
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// Total static cost of running every instruction in `code` once, in code-flow
/// order. Handy for sizing gas limits of straight-line programs.
#[must_use]
pub fn static_cost(schedule: &GasSchedule, code: &[u8]) -> u64 {
    let mut total = 0u64;
    let mut i = 0;
    while i < code.len() {
        let byte = code[i];
        total = total.saturating_add(schedule.cost(byte));
        if byte == super::opcodes::Opcode::Push1.byte() {
            i += 1;
        }
        i += 1;
    }
    total
}

// =============================================================================
// TESTS
// =============================================================================
