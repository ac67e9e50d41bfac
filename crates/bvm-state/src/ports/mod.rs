//! # Ports
//!
//! Interfaces the contract service depends on. Adapters implement them.

pub mod outbound;

pub use outbound::StateAccess;
