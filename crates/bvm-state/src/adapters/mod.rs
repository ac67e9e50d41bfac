//! # Adapters
//!
//! Implementations of the state access port.
//!
//! - `in_memory.rs` - process-local maps, for tests and one-shot runs
//! - `json_file.rs` - a JSON document on disk, rewritten atomically

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryState;
pub use json_file::JsonFileState;
