//! # JSON File State Adapter
//!
//! World state persisted as a single JSON document:
//!
//! ```json
//! {
//!   "accounts": {
//!     "counter": { "code": "600160005401600055", "storage": { "0": 3 } }
//!   }
//! }
//! ```
//!
//! The whole document is loaded on open and rewritten after every mutation.
//! Writes go to a sibling temp file first and are renamed over the original,
//! so a crash leaves either the old or the new document on disk.

use crate::domain::{Account, ContractAddress};
use crate::errors::StateError;
use crate::ports::outbound::StateAccess;
use async_trait::async_trait;
use bvm_core::vm::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    accounts: BTreeMap<ContractAddress, Account>,
}

/// File-backed world state.
#[derive(Debug)]
pub struct JsonFileState {
    path: PathBuf,
    accounts: RwLock<BTreeMap<ContractAddress, Account>>,
}

impl JsonFileState {
    /// Open the document at `path`, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Io` if the file exists but cannot be read and
    /// `StateError::Serialization` if it is not a valid state document.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();

        let accounts = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice::<StateDocument>(&bytes)?.accounts,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), accounts = accounts.len(), "state opened");

        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
        })
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `accounts` to disk via temp file + rename.
    async fn persist(&self, accounts: &BTreeMap<ContractAddress, Account>) -> Result<(), StateError> {
        #[derive(Serialize)]
        struct DocumentRef<'a> {
            accounts: &'a BTreeMap<ContractAddress, Account>,
        }

        let bytes = serde_json::to_vec_pretty(&DocumentRef { accounts })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "state persisted");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl StateAccess for JsonFileState {
    async fn deploy(&self, address: &ContractAddress, code: Vec<u8>) -> Result<(), StateError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(address) {
            return Err(StateError::AlreadyExists(address.clone()));
        }

        accounts.insert(address.clone(), Account::new(code));
        if let Err(e) = self.persist(&accounts).await {
            accounts.remove(address);
            return Err(e);
        }
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
        let previous = std::mem::replace(&mut account.storage, storage);

        if let Err(e) = self.persist(&accounts).await {
            if let Some(account) = accounts.get_mut(address) {
                account.storage = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    async fn addresses(&self) -> Result<Vec<ContractAddress>, StateError> {
        Ok(self.accounts.read().await.keys().cloned().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
