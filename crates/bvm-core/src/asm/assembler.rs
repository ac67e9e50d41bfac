//! # Assembler
//!
//! Turns BVM assembly text into bytecode.
//!
//! ## Syntax
//!
//! ```text
//! ; count down from 3
//!         PUSH1 3
//! loop:   PUSH1 1
//!         SUB
//!         PUSH1 0x00 SSTORE   # several instructions may share a line
//!         PUSH1 0 SLOAD
//!         PUSH1 0 SLOAD
//!         PUSH1 @loop
//!         JUMPI
//!         STOP
//! ```
//!
//! - Mnemonics are case-insensitive; `PUSH` is an alias for `PUSH1`.
//! - Operands are decimal or `0x` hex literals in `0..=255`, or `@label`.
//! - `;` and `#` start a comment that runs to the end of the line.
//! - `name:` defines a label and emits a JUMPDEST at that offset.

use crate::errors::AsmError;
use crate::vm::opcodes::Opcode;
use std::collections::HashMap;

const LABEL_SUFFIX: char = ':';
const LABEL_REF_PREFIX: char = '@';
const COMMENT_CHARS: [char; 2] = [';', '#'];

/// Assemble `source` into bytecode.
///
/// # Errors
///
/// Returns the first [`AsmError`] encountered, tagged with its 1-based line.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let items = parse(source)?;
    let labels = collect_labels(&items)?;
    emit(&items, &labels)
}

/// One parsed source element.
#[derive(Debug)]
enum Item<'a> {
    Label {
        line: usize,
        name: &'a str,
    },
    Op {
        line: usize,
        opcode: Opcode,
        operand: Option<Operand<'a>>,
    },
}

impl Item<'_> {
    fn size(&self) -> usize {
        match self {
            Item::Label { .. } => 1,
            Item::Op { opcode, .. } => 1 + opcode.immediate_size(),
        }
    }
}

#[derive(Debug)]
enum Operand<'a> {
    Literal(u8),
    Label(&'a str),
}

// =============================================================================
// PASS 1: TOKENIZE AND PARSE
// =============================================================================

fn strip_comment(line: &str) -> &str {
    match line.find(|c: char| COMMENT_CHARS.contains(&c)) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn is_valid_label(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

fn looks_like_operand(token: &str) -> bool {
    token.starts_with(LABEL_REF_PREFIX)
        || token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
}

fn parse(source: &str) -> Result<Vec<Item<'_>>, AsmError> {
    let mut items = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line = idx + 1;
        let mut tokens = strip_comment(raw_line).split_whitespace();

        while let Some(token) = tokens.next() {
            if let Some(name) = token.strip_suffix(LABEL_SUFFIX) {
                if !is_valid_label(name) {
                    return Err(AsmError::UnknownMnemonic {
                        line,
                        mnemonic: token.to_string(),
                    });
                }
                items.push(Item::Label { line, name });
                continue;
            }

            let Some(opcode) = Opcode::from_mnemonic(token) else {
                return Err(match previous_mnemonic(&items, line) {
                    Some(mnemonic) if looks_like_operand(token) => {
                        AsmError::UnexpectedOperand { line, mnemonic }
                    }
                    _ => AsmError::UnknownMnemonic {
                        line,
                        mnemonic: token.to_string(),
                    },
                });
            };

            let operand = if opcode.immediate_size() > 0 {
                let raw = tokens.next().ok_or_else(|| AsmError::MissingOperand {
                    line,
                    mnemonic: opcode.mnemonic().to_string(),
                })?;
                Some(parse_operand(line, opcode, raw)?)
            } else {
                None
            };

            items.push(Item::Op {
                line,
                opcode,
                operand,
            });
        }
    }

    Ok(items)
}

/// Mnemonic of the last instruction on `line`, for operand diagnostics.
fn previous_mnemonic(items: &[Item<'_>], line: usize) -> Option<String> {
    match items.last() {
        Some(Item::Op {
            line: l, opcode, ..
        }) if *l == line => Some(opcode.mnemonic().to_string()),
        _ => None,
    }
}

fn parse_operand<'a>(line: usize, opcode: Opcode, raw: &'a str) -> Result<Operand<'a>, AsmError> {
    if let Some(label) = raw.strip_prefix(LABEL_REF_PREFIX) {
        if !is_valid_label(label) {
            return Err(AsmError::InvalidOperand {
                line,
                operand: raw.to_string(),
            });
        }
        return Ok(Operand::Label(label));
    }

    // A mnemonic where an operand belongs means the operand was left out.
    if Opcode::from_mnemonic(raw).is_some() {
        return Err(AsmError::MissingOperand {
            line,
            mnemonic: opcode.mnemonic().to_string(),
        });
    }

    let value = parse_number(raw).ok_or_else(|| AsmError::InvalidOperand {
        line,
        operand: raw.to_string(),
    })?;
    u8::try_from(value)
        .map(Operand::Literal)
        .map_err(|_| AsmError::OperandOutOfRange { line, value })
}

fn parse_number(raw: &str) -> Option<i128> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

// =============================================================================
// PASS 2: LABEL OFFSETS
// =============================================================================

fn collect_labels<'a>(items: &[Item<'a>]) -> Result<HashMap<&'a str, usize>, AsmError> {
    let mut labels = HashMap::new();
    let mut offset = 0usize;

    for item in items {
        if let Item::Label { line, name } = item {
            if labels.insert(*name, offset).is_some() {
                return Err(AsmError::DuplicateLabel {
                    line: *line,
                    label: (*name).to_string(),
                });
            }
        }
        offset += item.size();
    }

    Ok(labels)
}

// =============================================================================
// PASS 3: EMIT
// =============================================================================

fn emit(items: &[Item<'_>], labels: &HashMap<&str, usize>) -> Result<Vec<u8>, AsmError> {
    let mut code = Vec::with_capacity(items.iter().map(Item::size).sum());

    for item in items {
        match item {
            Item::Label { .. } => code.push(Opcode::JumpDest.byte()),
            Item::Op {
                line,
                opcode,
                operand,
            } => {
                code.push(opcode.byte());
                match operand {
                    None => {}
                    Some(Operand::Literal(value)) => code.push(*value),
                    Some(Operand::Label(name)) => {
                        let offset =
                            *labels.get(name).ok_or_else(|| AsmError::UndefinedLabel {
                                line: *line,
                                label: (*name).to_string(),
                            })?;
                        let byte =
                            u8::try_from(offset).map_err(|_| AsmError::LabelOutOfRange {
                                line: *line,
                                label: (*name).to_string(),
                                offset,
                            })?;
                        code.push(byte);
                    }
                }
            }
        }
    }

    Ok(code)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_program() {
        let code = assemble("PUSH1 2\nPUSH1 3\nADD\nSTOP").unwrap();
        assert_eq!(code, vec![0x60, 0x02, 0x60, 0x03, 0x01, 0x00]);
    }

    #[test]
    fn test_case_and_alias() {
        let code = assemble("push 0x0A push1 0X0b add").unwrap();
        assert_eq!(code, vec![0x60, 0x0A, 0x60, 0x0B, 0x01]);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = "; header\n\n  PUSH1 1 # one\n\tPOP ; drop it\n";
        assert_eq!(assemble(source).unwrap(), vec![0x60, 0x01, 0x50]);
    }

    #[test]
    fn test_every_mnemonic() {
        for op in Opcode::ALL {
            let source = if op == Opcode::Push1 {
                "PUSH1 7".to_string()
            } else {
                op.mnemonic().to_string()
            };
            let code = assemble(&source).unwrap();
            assert_eq!(code[0], op.byte(), "{op}");
        }
    }

    #[test]
    fn test_labels_emit_jumpdest() {
        let source = "PUSH1 @end\nJUMP\nPUSH1 9\nend:\nSTOP";
        let code = assemble(source).unwrap();
        assert_eq!(code, vec![0x60, 0x05, 0x56, 0x60, 0x09, 0x5B, 0x00]);
    }

    #[test]
    fn test_backward_label_and_inline_label() {
        let code = assemble("start: PUSH1 @start JUMP").unwrap();
        assert_eq!(code, vec![0x5B, 0x60, 0x00, 0x56]);
    }

    #[test]
    fn test_unknown_mnemonic() {
        let err = assemble("PUSH1 1\nFOO").unwrap_err();
        assert_eq!(
            err,
            AsmError::UnknownMnemonic {
                line: 2,
                mnemonic: "FOO".into()
            }
        );
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            assemble("PUSH1").unwrap_err(),
            AsmError::MissingOperand {
                line: 1,
                mnemonic: "PUSH1".into()
            }
        );
        assert!(matches!(
            assemble("PUSH1 ADD").unwrap_err(),
            AsmError::MissingOperand { line: 1, .. }
        ));
    }

    #[test]
    fn test_unexpected_operand() {
        assert_eq!(
            assemble("ADD 5").unwrap_err(),
            AsmError::UnexpectedOperand {
                line: 1,
                mnemonic: "ADD".into()
            }
        );
    }

    #[test]
    fn test_invalid_operand() {
        assert!(matches!(
            assemble("PUSH1 0xZZ").unwrap_err(),
            AsmError::InvalidOperand { line: 1, .. }
        ));
        assert!(matches!(
            assemble("PUSH1 @1abc").unwrap_err(),
            AsmError::InvalidOperand { .. }
        ));
    }

    #[test]
    fn test_operand_out_of_range() {
        assert_eq!(
            assemble("PUSH1 256").unwrap_err(),
            AsmError::OperandOutOfRange {
                line: 1,
                value: 256
            }
        );
        assert_eq!(
            assemble("\nPUSH1 -1").unwrap_err(),
            AsmError::OperandOutOfRange { line: 2, value: -1 }
        );
        assert_eq!(assemble("PUSH1 255").unwrap(), vec![0x60, 0xFF]);
    }

    #[test]
    fn test_duplicate_label() {
        assert_eq!(
            assemble("a:\nSTOP\na:").unwrap_err(),
            AsmError::DuplicateLabel {
                line: 3,
                label: "a".into()
            }
        );
    }

    #[test]
    fn test_undefined_label() {
        assert_eq!(
            assemble("PUSH1 @nowhere").unwrap_err(),
            AsmError::UndefinedLabel {
                line: 1,
                label: "nowhere".into()
            }
        );
    }

    #[test]
    fn test_label_out_of_range() {
        let mut source = "PUSH1 @far\n".to_string();
        for _ in 0..300 {
            source.push_str("POP\n");
        }
        source.push_str("far:\n");
        let err = assemble(&source).unwrap_err();
        assert_eq!(
            err,
            AsmError::LabelOutOfRange {
                line: 1,
                label: "far".into(),
                offset: 302
            }
        );
    }

    #[test]
    fn test_empty_source() {
        assert!(assemble("").unwrap().is_empty());
        assert!(assemble("  ; nothing here\n").unwrap().is_empty());
    }
}
