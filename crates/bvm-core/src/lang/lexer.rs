//! # Lexer
//!
//! Splits contract source into tokens. `//` and `/* */` comments are skipped.

use crate::domain::value_objects::Word;
use crate::errors::CompileError;
use std::fmt;

/// Token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident(String),
    /// Non-negative integer literal.
    Int(Word),
    /// Punctuation or operator.
    Punct(&'static str),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Int(value) => write!(f, "{value}"),
            Self::Punct(p) => f.write_str(p),
        }
    }
}

/// A token and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Source line (1-based).
    pub line: usize,
}

impl Token {
    /// True if this is the punctuation `p`.
    #[must_use]
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(q) if *q == p)
    }

    /// True if this is the identifier or keyword `word`.
    #[must_use]
    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name == word)
    }
}

/// Longest operators first so `<=` wins over `<`.
const PUNCTUATION: [&str; 31] = [
    "<=", ">=", "==", "!=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "++", "--", "{", "}", "(",
    ")", "[", "]", ";", ",", ".", "=", "+", "-", "*", "/", "%", "<", ">", "!",
];

/// Tokenize `source`.
///
/// # Errors
///
/// Returns [`CompileError::UnexpectedChar`] for characters outside the
/// language, [`CompileError::UnterminatedComment`] for an open `/*`, and
/// [`CompileError::LiteralOutOfRange`] for integers above `i64::MAX`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut rest = source;

    while let Some(ch) = rest.chars().next() {
        if ch == '\n' {
            line += 1;
            rest = &rest[1..];
        } else if ch.is_whitespace() {
            rest = &rest[ch.len_utf8()..];
        } else if rest.starts_with("//") {
            let end = rest.find('\n').unwrap_or(rest.len());
            rest = &rest[end..];
        } else if rest.starts_with("/*") {
            let end = rest[2..]
                .find("*/")
                .ok_or(CompileError::UnterminatedComment { line })?;
            let comment = &rest[..end + 4];
            line += comment.matches('\n').count();
            rest = &rest[comment.len()..];
        } else if ch.is_ascii_digit() {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            let literal = &rest[..end];
            let value = literal
                .replace('_', "")
                .parse::<Word>()
                .map_err(|_| CompileError::LiteralOutOfRange {
                    line,
                    literal: literal.to_string(),
                })?;
            tokens.push(Token {
                kind: TokenKind::Int(value),
                line,
            });
            rest = &rest[end..];
        } else if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '$')
                .unwrap_or(rest.len());
            tokens.push(Token {
                kind: TokenKind::Ident(rest[..end].to_string()),
                line,
            });
            rest = &rest[end..];
        } else if let Some(&p) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            tokens.push(Token {
                kind: TokenKind::Punct(p),
                line,
            });
            rest = &rest[p.len()..];
        } else {
            return Err(CompileError::UnexpectedChar { line, ch });
        }
    }

    Ok(tokens)
}
