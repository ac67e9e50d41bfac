//! # Domain Layer
//!
//! Plain data describing an execution: machine words, configuration,
//! results and the invariants results must satisfy.
//! No I/O, no async.

pub mod entities;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use value_objects::*;
