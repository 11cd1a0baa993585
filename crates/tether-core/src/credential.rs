//! Per-user bearer tokens for the remote store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Result;

/// Tracing target for credential operations.
pub const TRACING_TARGET: &str = "tether_core::credential";

/// Identity of a host user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Deref, Display)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Tokens captured for one user.
///
/// Either token may be absent; the bridge declines the operations that
/// need a missing one.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    /// Bearer token for the transfer API.
    pub transfer_token: Option<String>,
    /// Bearer token for the HTTPS data plane.
    pub data_plane_token: Option<String>,
}

impl UserCredential {
    pub fn new(transfer_token: Option<String>, data_plane_token: Option<String>) -> Self {
        Self {
            transfer_token,
            data_plane_token,
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("UserCredential")
            .field("transfer_token", &redact(&self.transfer_token))
            .field("data_plane_token", &redact(&self.data_plane_token))
            .finish()
    }
}

/// Key-value store of user credentials.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credential of a user, if any was captured.
    async fn get(&self, user: &UserId) -> Result<Option<UserCredential>>;

    /// Replaces the credential of a user.
    async fn put(&self, user: &UserId, credential: UserCredential) -> Result<()>;
}

/// Process-local credential store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    entries: Arc<RwLock<HashMap<UserId, UserCredential>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, user: &UserId) -> Result<Option<UserCredential>> {
        Ok(self.entries.read().await.get(user).cloned())
    }

    async fn put(&self, user: &UserId, credential: UserCredential) -> Result<()> {
        self.entries.write().await.insert(user.clone(), credential);
        Ok(())
    }
}

/// Credential store wrapper shared across the bridge.
#[derive(Clone)]
pub struct CredentialService {
    inner: Arc<dyn CredentialStore>,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService").finish_non_exhaustive()
    }
}

impl CredentialService {
    /// Creates a new credential service wrapper.
    pub fn new<S>(store: S) -> Self
    where
        S: CredentialStore + 'static,
    {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Returns the credential of a user, or an empty one.
    pub async fn get(&self, user: &UserId) -> Result<UserCredential> {
        Ok(self.inner.get(user).await?.unwrap_or_default())
    }

    /// Replaces the credential of a user.
    pub async fn put(&self, user: &UserId, credential: UserCredential) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            user = %user,
            has_transfer_token = credential.transfer_token.is_some(),
            has_data_plane_token = credential.data_plane_token.is_some(),
            "Storing user credential"
        );

        self.inner.put(user, credential).await
    }
}
