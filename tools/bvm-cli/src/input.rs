//! Reading bytecode and storage from command-line input.

use anyhow::{bail, Context, Result};
use bvm_core::asm::assemble;
use bvm_core::domain::Word;
use bvm_core::lang::compile;
use std::path::Path;
use tracing::debug;

/// Extension of assembly source files.
pub const ASM_EXTENSION: &str = "basm";
/// Extension of contract source files.
pub const JAVA_EXTENSION: &str = "java";
/// Extension of hex text files.
pub const HEX_EXTENSION: &str = "hex";

/// Decode a hex string, tolerating a `0x` prefix and whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    hex::decode(digits).with_context(|| format!("invalid hex bytecode: {text:?}"))
}

/// Load bytecode from `path`.
///
/// `.basm` files are assembled, `.java` files compiled, `.hex` files decoded
/// as hex text and anything else is taken as raw bytes.
pub fn load_code(path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some(ASM_EXTENSION) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            assemble(&source).with_context(|| format!("failed to assemble {}", path.display()))
        }
        Some(JAVA_EXTENSION) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let contract = compile(&source)
                .with_context(|| format!("failed to compile {}", path.display()))?;
            debug!(path = %path.display(), slots = ?contract.slots, "Compiled contract");
            Ok(contract.code)
        }
        Some(HEX_EXTENSION) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_hex(&text)
        }
        _ => std::fs::read(path).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Bytecode from either an inline hex argument or a file.
pub fn code_from(inline: Option<&str>, file: Option<&Path>) -> Result<Vec<u8>> {
    match (inline, file) {
        (Some(hex), None) => parse_hex(hex),
        (None, Some(path)) => load_code(path),
        (Some(_), Some(_)) => bail!("pass bytecode inline or with --file, not both"),
        (None, None) => bail!("no bytecode given: pass a hex string or --file <path>"),
    }
}

/// Parse a `key=value` storage slot.
pub fn parse_slot(text: &str) -> std::result::Result<(Word, Word), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {text:?}"))?;
    let key = key
        .trim()
        .parse()
        .map_err(|e| format!("invalid storage key {key:?}: {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid storage value {value:?}: {e}"))?;
    Ok((key, value))
}
