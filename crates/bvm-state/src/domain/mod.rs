//! # Domain Layer
//!
//! World state entities: addresses and the accounts stored under them.

pub mod entities;

pub use entities::*;
