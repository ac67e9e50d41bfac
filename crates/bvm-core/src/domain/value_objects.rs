//! # Value Objects
//!
//! Primitive machine values shared by the stack, storage and results.

/// Machine word.
///
/// Signed 64-bit, two's complement. Arithmetic wraps on overflow.
pub type Word = i64;

/// Width of a [`Word`] in bits.
pub const WORD_BITS: u32 = Word::BITS;

/// Canonical truth value pushed by comparisons.
pub const TRUE: Word = 1;

/// Canonical false value pushed by comparisons.
pub const FALSE: Word = 0;

/// Convert a boolean into the word comparisons push.
#[inline]
#[must_use]
pub fn bool_word(value: bool) -> Word {
    if value {
        TRUE
    } else {
        FALSE
    }
}
