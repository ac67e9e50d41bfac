//! # BVM Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs         # Reusable assembly programs and bytecode generators
//! │   └── integration/
//! │       ├── vm_properties.rs    # Property tests over the interpreter
//! │       └── service_flows.rs    # Assemble -> deploy -> call against world state
//! │
//! └── benches/
//!     └── interpreter_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bvm-tests
//!
//! # By category
//! cargo test -p bvm-tests integration::vm_properties
//! cargo test -p bvm-tests integration::service_flows
//!
//! # Benchmarks
//! cargo bench -p bvm-tests
//! ```

pub mod fixtures;
pub mod integration;
