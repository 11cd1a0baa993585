//! Persistence of remote-store tokens after the OAuth flow completes.

use super::TRACING_TARGET;
use crate::Result;
use crate::credential::{CredentialService, UserCredential};
use crate::hooks::{AuthCompleted, TokenSet};

/// Picks the transfer and data-plane tokens out of a token set.
#[derive(Debug, Clone)]
pub struct CredentialCapture {
    provider: String,
    transfer_resource_server: String,
    data_plane_resource_server: String,
    credentials: CredentialService,
}

impl CredentialCapture {
    pub fn new(
        provider: impl Into<String>,
        transfer_resource_server: impl Into<String>,
        data_plane_resource_server: impl Into<String>,
        credentials: CredentialService,
    ) -> Self {
        Self {
            provider: provider.into(),
            transfer_resource_server: transfer_resource_server.into(),
            data_plane_resource_server: data_plane_resource_server.into(),
            credentials,
        }
    }

    /// Returns `true` if the event comes from the remote store's provider.
    pub fn matches(&self, event: &AuthCompleted) -> bool {
        event.provider == self.provider
    }

    /// Extracts the credential pair from a token set.
    ///
    /// When several tokens name the same resource server the last one wins.
    pub fn extract(&self, token: &TokenSet) -> UserCredential {
        let mut credential = UserCredential::default();

        for scoped in token.iter() {
            let server = scoped.resource_server.as_str();
            if server == self.transfer_resource_server {
                credential.transfer_token = scoped.access_token.clone();
            } else if server == self.data_plane_resource_server {
                credential.data_plane_token = scoped.access_token.clone();
            }
        }

        credential
    }

    /// Stores the tokens carried by the event on the user's record.
    ///
    /// Both tokens are written unconditionally, so a token missing from
    /// the event clears a previously captured one.
    pub async fn capture(&self, event: &AuthCompleted) -> Result<UserCredential> {
        let credential = self.extract(&event.token);

        tracing::info!(
            target: TRACING_TARGET,
            user = %event.user,
            provider = %event.provider,
            has_transfer_token = credential.transfer_token.is_some(),
            has_data_plane_token = credential.data_plane_token.is_some(),
            "Captured remote-store credential"
        );

        self.credentials.put(&event.user, credential.clone()).await?;
        Ok(credential)
    }
}
