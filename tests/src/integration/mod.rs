//! # Integration Tests
//!
//! Cross-crate flows: the interpreter checked against its invariants over
//! generated input, and the contract service driven end to end over
//! file-backed state.

pub mod service_flows;
pub mod vm_properties;
