//! Who is logged in, plus the on-disk session marker that lets a restart resume it.

use crate::credentials::{Account, AccountId, CredentialStore};
use crate::errors::AuthError;
use crate::storage::{Storage, StorageKey};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Persisted evidence that a login happened. The token is not validated against anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: AccountId,
    pub token: String,
}

impl Session {
    fn start(account_id: AccountId) -> Self {
        Self {
            account_id,
            token: Uuid::new_v4().to_string(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.account_id.as_str().is_empty() && !self.token.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

impl SessionContext {
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            SessionContext::LoggedOut => None,
            SessionContext::LoggedIn(session) => Some(&session.account_id),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionContext::LoggedIn(_))
    }
}

pub struct SessionManager {
    storage: Storage,
    credentials: CredentialStore,
    context: SessionContext,
}

impl SessionManager {
    pub fn new(storage: Storage, credentials: CredentialStore) -> Self {
        Self {
            storage,
            credentials,
            context: SessionContext::LoggedOut,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn current_account(&self) -> Option<Account> {
        self.context
            .account_id()
            .and_then(|account_id| self.credentials.get(account_id))
    }

    pub async fn signup(&mut self, username: &str, password: &str) -> Result<AccountId, AuthError> {
        validate(username, password)?;
        let account = self.credentials.create_account(username, password).await?;
        self.establish(account.account_id).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<AccountId, AuthError> {
        validate(username, password)?;
        let account = self.credentials.verify_credentials(username, password)?;
        self.establish(account.account_id).await
    }

    pub async fn logout(&mut self) {
        if let Err(err) = self.storage.remove(&StorageKey::Session).await {
            warn!("failed to clear session marker: {err}");
        }
        if let SessionContext::LoggedIn(session) = &self.context {
            info!(account = %session.account_id, "logged out");
        }
        self.context = SessionContext::LoggedOut;
    }

    /// Resumes a session from a marker left by a previous run, without asking for
    /// credentials again. Returns the resumed account, if any.
    pub async fn restore(&mut self) -> Option<AccountId> {
        let session: Session = self.storage.read(&StorageKey::Session).await?;
        if !session.is_complete() {
            warn!("ignoring incomplete session marker");
            return None;
        }
        let account_id = session.account_id.clone();
        info!(account = %account_id, "session restored");
        self.context = SessionContext::LoggedIn(session);
        Some(account_id)
    }

    async fn establish(&mut self, account_id: AccountId) -> Result<AccountId, AuthError> {
        let session = Session::start(account_id.clone());
        self.storage.persist(&StorageKey::Session, &session).await;
        info!(account = %account_id, "session started");
        self.context = SessionContext::LoggedIn(session);
        Ok(account_id)
    }
}

fn validate(username: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(AuthError::Validation);
    }
    Ok(())
}
