//! # BVM Stack
//!
//! Bounded LIFO holding machine words.
//! Maximum 1024 elements.

use crate::domain::value_objects::Word;
use crate::errors::VmError;

/// Maximum stack depth.
pub const MAX_STACK_DEPTH: usize = 1024;

/// BVM stack implementation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    data: Vec<Word>,
}

impl Stack {
    /// Creates a new empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(64),
        }
    }

    /// Returns the number of elements on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Push a value onto the stack.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the stack already holds `MAX_STACK_DEPTH` values.
    pub fn push(&mut self, value: Word) -> Result<(), VmError> {
        if self.data.len() >= MAX_STACK_DEPTH {
            return Err(VmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` if the stack is empty.
    pub fn pop(&mut self) -> Result<Word, VmError> {
        self.data.pop().ok_or(VmError::StackUnderflow)
    }

    /// Peek at the top value without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Word> {
        self.data.last().copied()
    }

    /// Clear the stack.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Contents from bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }

    /// Consume the stack, returning its contents bottom to top.
    #[must_use]
    pub fn into_vec(self) -> Vec<Word> {
        self.data
    }
}

// =============================================================================
// TESTS
// =============================================================================
