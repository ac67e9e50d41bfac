//! # In-Memory State Adapter
//!
//! Process-local world state. Nothing survives the process.

use crate::domain::{Account, ContractAddress};
use crate::errors::StateError;
use crate::ports::outbound::StateAccess;
use async_trait::async_trait;
use bvm_core::vm::Storage;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory world state.
#[derive(Debug, Default)]
pub struct InMemoryState {
    accounts: RwLock<BTreeMap<ContractAddress, Account>>,
}

impl InMemoryState {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state pre-populated with `accounts`.
    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = (ContractAddress, Account)>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().collect()),
        }
    }

    /// Number of accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns true if no account has been deployed.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl StateAccess for InMemoryState {
    async fn deploy(&self, address: &ContractAddress, code: Vec<u8>) -> Result<(), StateError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(address) {
            return Err(StateError::AlreadyExists(address.clone()));
        }
        accounts.insert(address.clone(), Account::new(code));
        Ok(())
    }

    async fn get_account(&self, address: &ContractAddress) -> Result<Option<Account>, StateError> {
        Ok(self.accounts.read().await.get(address).cloned())
    }

    async fn commit_storage(
        &self,
        address: &ContractAddress,
        storage: Storage,
    ) -> Result<(), StateError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| StateError::NotFound(address.clone()))?;
        account.storage = storage;
        Ok(())
    }

    async fn addresses(&self) -> Result<Vec<ContractAddress>, StateError> {
        Ok(self.accounts.read().await.keys().cloned().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
