//! # Driven Ports (SPI - Outbound)
//!
//! World state the contract service reads from and commits to.

use crate::domain::{Account, ContractAddress};
use crate::errors::StateError;
use async_trait::async_trait;
use bvm_core::vm::Storage;

// =============================================================================
// STATE ACCESS
// =============================================================================

/// Interface for accessing contract accounts.
///
/// Storage is handed out as a whole mapping before execution and written back
/// as a whole after a successful one. Implementations must make
/// `commit_storage` all-or-nothing.
#[async_trait]
pub trait StateAccess: Send + Sync {
    /// Create an account holding `code` with empty storage.
    ///
    /// # Errors
    ///
    /// * `StateError::AlreadyExists` - an account already lives at `address`
    async fn deploy(&self, address: &ContractAddress, code: Vec<u8>) -> Result<(), StateError>;

    /// Full account, or `None` if nothing is deployed at `address`.
    async fn get_account(&self, address: &ContractAddress) -> Result<Option<Account>, StateError>;

    /// Contract bytecode.
    ///
    /// # Errors
    ///
    /// * `StateError::NotFound` - no account at `address`
    async fn get_code(&self, address: &ContractAddress) -> Result<Vec<u8>, StateError> {
        self.get_account(address)
            .await?
            .map(|account| account.code)
            .ok_or_else(|| StateError::NotFound(address.clone()))
    }

    /// Snapshot of the contract's storage.
    ///
    /// # Errors
    ///
    /// * `StateError::NotFound` - no account at `address`
    async fn load_storage(&self, address: &ContractAddress) -> Result<Storage, StateError> {
        self.get_account(address)
            .await?
            .map(|account| account.storage)
            .ok_or_else(|| StateError::NotFound(address.clone()))
    }

    /// Replace the contract's storage.
    ///
    /// # Errors
    ///
    /// * `StateError::NotFound` - no account at `address`
    async fn commit_storage(
        &self,
        address: &ContractAddress,
        storage: Storage,
    ) -> Result<(), StateError>;

    /// Returns true if an account lives at `address`.
    async fn account_exists(&self, address: &ContractAddress) -> Result<bool, StateError> {
        Ok(self.get_account(address).await?.is_some())
    }

    /// All deployed addresses in ascending order.
    async fn addresses(&self) -> Result<Vec<ContractAddress>, StateError>;
}
