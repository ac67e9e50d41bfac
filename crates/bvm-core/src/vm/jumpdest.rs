//! # Jump Destination Analysis
//!
//! Precomputes the set of offsets JUMP and JUMPI may land on.
//!
//! Two scanning modes exist:
//!
//! - [`JumpAnalysis::Positional`] registers every byte equal to JUMPDEST,
//!   including bytes that are PUSH1 immediates. This is the compatible
//!   behaviour and the default.
//! - [`JumpAnalysis::CodeFlow`] walks the code as the interpreter would and
//!   skips PUSH1 operands, so data bytes are never registered.

use crate::domain::value_objects::Word;
use crate::vm::opcodes::Opcode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Jump destination scanning mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JumpAnalysis {
    /// Every JUMPDEST-valued byte counts, immediates included.
    #[default]
    Positional,
    /// PUSH1 operand bytes are skipped.
    CodeFlow,
}

impl FromStr for JumpAnalysis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positional" => Ok(Self::Positional),
            "code-flow" | "code_flow" | "codeflow" => Ok(Self::CodeFlow),
            other => Err(format!("unknown jump analysis mode: {other}")),
        }
    }
}

/// Valid jump destinations for one piece of code. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpTable {
    dests: HashSet<usize>,
}

impl JumpTable {
    /// Scan `code` for JUMPDEST markers.
    #[must_use]
    pub fn analyze(code: &[u8], mode: JumpAnalysis) -> Self {
        let dests = match mode {
            JumpAnalysis::Positional => analyze_positional(code),
            JumpAnalysis::CodeFlow => analyze_code_flow(code),
        };
        Self { dests }
    }

    /// Returns true if `dest` is a valid landing offset.
    ///
    /// Negative words never are.
    #[must_use]
    pub fn contains(&self, dest: Word) -> bool {
        usize::try_from(dest).is_ok_and(|offset| self.dests.contains(&offset))
    }

    /// Number of registered destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dests.len()
    }

    /// Returns true if the code has no jump destinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dests.is_empty()
    }

    /// Registered offsets in ascending order.
    #[must_use]
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets: Vec<usize> = self.dests.iter().copied().collect();
        offsets.sort_unstable();
        offsets
    }
}

fn analyze_positional(code: &[u8]) -> HashSet<usize> {
    code.iter()
        .enumerate()
        .filter(|(_, byte)| **byte == Opcode::JumpDest.byte())
        .map(|(offset, _)| offset)
        .collect()
}

fn analyze_code_flow(code: &[u8]) -> HashSet<usize> {
    let mut dests = HashSet::new();
    let mut i = 0;

    while i < code.len() {
        let op = code[i];
        if op == Opcode::JumpDest.byte() {
            dests.insert(i);
        }
        // Skip PUSH1 data byte
        if op == Opcode::Push1.byte() {
            i += 1;
        }
        i += 1;
    }

    dests
}

// =============================================================================
// TESTS
// =============================================================================
