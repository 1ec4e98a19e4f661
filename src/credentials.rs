//! Registered accounts and password checks.
//!
//! Passwords are stored as an unsalted SHA-256 hex digest. That keeps cleartext
//! out of the data directory but is not a defence against anyone who can read it:
//! identical passwords produce identical digests across accounts.

use crate::errors::{AuthError, StorageError};
use crate::storage::{Storage, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info, warn};

/// Identity key of an account: the trimmed, lowercased username.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn normalize(username: &str) -> Self {
        Self(username.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted shape of one account, keyed by [`AccountId`] in the account collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    #[serde(rename = "password")]
    pub credential_digest: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: AccountId,
    pub display_name: String,
    pub credential_digest: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    fn from_entry(account_id: AccountId, entry: &AccountEntry) -> Self {
        Self {
            account_id,
            display_name: entry.display_name.clone(),
            credential_digest: entry.credential_digest.clone(),
            created_at: entry.created_at,
        }
    }
}

pub fn digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub struct CredentialStore {
    storage: Storage,
    accounts: BTreeMap<AccountId, AccountEntry>,
    // False when the accounts file exists but could not be read or moved aside;
    // writing would then replace accounts we never saw.
    writable: bool,
}

impl CredentialStore {
    /// Loads the account collection. An unparsable file is moved to
    /// `accounts.json.corrupt` rather than overwritten later.
    pub async fn open(storage: Storage) -> Self {
        let (accounts, writable) = match storage.load(&StorageKey::Accounts).await {
            Ok(accounts) => (accounts.unwrap_or_default(), true),
            Err(StorageError::Serialization(err)) => {
                error!("accounts file is corrupt: {err}");
                match storage.quarantine(&StorageKey::Accounts).await {
                    Ok(moved) => {
                        warn!("moved corrupt accounts file to {}", moved.display());
                        (BTreeMap::new(), true)
                    }
                    Err(err) => {
                        error!("failed to move corrupt accounts file aside, new accounts will not be saved: {err}");
                        (BTreeMap::new(), false)
                    }
                }
            }
            Err(err) => {
                error!("failed to read accounts file, new accounts will not be saved: {err}");
                (BTreeMap::new(), false)
            }
        };
        Self {
            storage,
            accounts,
            writable,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.accounts.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, account_id: &AccountId) -> Option<Account> {
        self.accounts
            .get(account_id)
            .map(|entry| Account::from_entry(account_id.clone(), entry))
    }

    pub async fn create_account(&mut self, username: &str, password: &str) -> Result<Account, AuthError> {
        let account_id = AccountId::normalize(username);
        if self.accounts.contains_key(&account_id) {
            return Err(AuthError::DuplicateAccount);
        }

        let entry = AccountEntry {
            credential_digest: digest(password),
            display_name: username.trim().to_string(),
            created_at: Utc::now(),
        };
        let account = Account::from_entry(account_id.clone(), &entry);
        self.accounts.insert(account_id, entry);
        if self.writable {
            self.storage.persist(&StorageKey::Accounts, &self.accounts).await;
        } else {
            warn!(account = %account.account_id, "account kept in memory only");
        }

        info!(account = %account.account_id, "account created");
        Ok(account)
    }

    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let account_id = AccountId::normalize(username);
        // Digest before the lookup so unknown and known accounts cost the same.
        let candidate = digest(password);
        let entry = self.accounts.get(&account_id).ok_or(AuthError::AccountNotFound)?;
        if entry.credential_digest != candidate {
            return Err(AuthError::InvalidCredential);
        }
        Ok(Account::from_entry(account_id, entry))
    }
}
