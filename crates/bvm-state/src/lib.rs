//! # BVM State - World State and Contract Service
//!
//! Persists contract accounts (bytecode plus storage) and runs the BVM
//! interpreter against them.
//!
//! ## Layers
//!
//! | Layer | Location | Purpose |
//! |-------|----------|---------|
//! | Domain | `domain/` | `ContractAddress`, `Account` |
//! | Ports | `ports/outbound.rs` | `StateAccess` trait |
//! | Adapters | `adapters/` | In-memory and JSON file state |
//! | Service | `service.rs` | Deploy, call, stateless execution |
//!
//! ## Execution Safety Limits
//!
//! | Limit | Default | Purpose |
//! |-------|---------|---------|
//! | `max_code_size` | 24 KB | Limit contract size |
//! | `execution_timeout_ms` | 5 seconds | Hard wall-clock timeout |
//! | `default_gas_limit` | 1 000 000 | Gas for calls without an explicit limit |
//!
//! ## Usage Example
//!
//! ```ignore
//! use bvm_state::prelude::*;
//!
//! let service = create_test_service();
//! let counter = ContractAddress::new("counter")?;
//! service.deploy(&counter, code).await?;
//!
//! let result = service.call(&counter, None).await?;
//! if result.is_success() {
//!     println!("Gas used: {}", result.gas_used());
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::{Account, ContractAddress};

    // Ports
    pub use crate::ports::outbound::StateAccess;

    // Adapters
    pub use crate::adapters::{InMemoryState, JsonFileState};

    // Errors
    pub use crate::errors::{ServiceError, StateError};

    // Service
    pub use crate::service::{create_test_service, ContractService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
