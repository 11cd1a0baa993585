//! Interception points the host dispatches through before answering
//! from its own resource model.
//!
//! Every hook returns an [`Outcome`]. A hook that does not recognize the
//! request returns [`Outcome::Decline`] and the host falls through to the
//! next hook, and finally to native handling.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::Result;
use crate::credential::UserId;
use crate::download::{Disposition, Download};
use crate::view::{FileView, FolderDetails, FolderView, ItemDetail, ItemView};

/// Answer of a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The hook owns the request and this is the full answer.
    Claim(T),
    /// The hook contributes results appended after the native answer.
    Extend(T),
    /// The hook does not handle the request.
    Decline,
}

impl<T> Outcome<T> {
    /// Returns `true` if the hook declined.
    pub fn is_decline(&self) -> bool {
        matches!(self, Self::Decline)
    }

    /// Maps the carried value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Claim(value) => Outcome::Claim(f(value)),
            Self::Extend(value) => Outcome::Extend(f(value)),
            Self::Decline => Outcome::Decline,
        }
    }
}

/// Kind of the parent a folder listing is requested for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParentType {
    #[default]
    Folder,
    User,
    Collection,
}

/// Caller information passed to every hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookContext {
    /// Authenticated host user, if any.
    pub user: Option<UserId>,
}

impl HookContext {
    /// Context of an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context of an authenticated caller.
    pub fn user(user: impl Into<UserId>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }
}

/// A bearer token together with the resource server it is valid for.
///
/// Field names follow the provider's token response. Fields other than
/// these two (`scope`, `expires_in`, `token_type`, ...) are ignored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedToken {
    #[serde(default)]
    pub access_token: Option<String>,
    pub resource_server: String,
}

impl std::fmt::Debug for ScopedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedToken")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("resource_server", &self.resource_server)
            .finish()
    }
}

/// Token set delivered by the remote store's auth flow.
///
/// The primary token is flattened into the top level; additional tokens
/// for other resource servers follow in `other_tokens`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(flatten)]
    pub primary: ScopedToken,
    #[serde(default)]
    pub other_tokens: Vec<ScopedToken>,
}

impl TokenSet {
    /// Iterates over the primary token and every other token.
    pub fn iter(&self) -> impl Iterator<Item = &ScopedToken> {
        std::iter::once(&self.primary).chain(&self.other_tokens)
    }
}

/// Event emitted once an OAuth flow completes for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCompleted {
    pub provider: String,
    pub user: UserId,
    pub token: TokenSet,
}

/// Hooks a bridge registers with the host.
///
/// Every method declines by default.
#[async_trait::async_trait]
pub trait Hooks: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Children folders of a folder, user or collection.
    async fn list_folder_children(
        &self,
        _ctx: &HookContext,
        _parent_id: &str,
        _parent_type: ParentType,
    ) -> Result<Outcome<Vec<FolderView>>> {
        Ok(Outcome::Decline)
    }

    /// Items of a folder.
    async fn list_item_children(
        &self,
        _ctx: &HookContext,
        _folder_id: &str,
    ) -> Result<Outcome<Vec<ItemView>>> {
        Ok(Outcome::Decline)
    }

    /// A single folder.
    async fn folder_detail(&self, _ctx: &HookContext, _id: &str) -> Result<Outcome<FolderView>> {
        Ok(Outcome::Decline)
    }

    /// A single item with its parent.
    async fn item_detail(&self, _ctx: &HookContext, _id: &str) -> Result<Outcome<ItemDetail>> {
        Ok(Outcome::Decline)
    }

    /// Files of an item.
    async fn item_files(&self, _ctx: &HookContext, _id: &str) -> Result<Outcome<Vec<FileView>>> {
        Ok(Outcome::Decline)
    }

    /// Child counts of a folder.
    async fn folder_aggregate(
        &self,
        _ctx: &HookContext,
        _id: &str,
    ) -> Result<Outcome<FolderDetails>> {
        Ok(Outcome::Decline)
    }

    /// Content of an item.
    async fn download(
        &self,
        _ctx: &HookContext,
        _id: &str,
        _disposition: Disposition,
    ) -> Result<Outcome<Download>> {
        Ok(Outcome::Decline)
    }

    /// Completion of an OAuth flow.
    async fn auth_completed(&self, _event: &AuthCompleted) -> Result<Outcome<()>> {
        Ok(Outcome::Decline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_map() {
        assert_eq!(Outcome::Claim(2).map(|v| v * 2), Outcome::Claim(4));
        assert_eq!(Outcome::Extend(2).map(|v| v + 1), Outcome::Extend(3));
        assert!(Outcome::<u8>::Decline.map(|v| v + 1).is_decline());
    }

    #[test]
    fn token_set_deserializes() {
        let token: TokenSet = serde_json::from_str(
            r#"{
                "access_token": "primary",
                "resource_server": "auth.globus.org",
                "scope": "openid profile email",
                "expires_in": 172800,
                "token_type": "Bearer",
                "other_tokens": [
                    {"access_token": "t", "resource_server": "transfer.api.globus.org"},
                    {"resource_server": "petrel_https_server"}
                ]
            }"#,
        )
        .unwrap();

        let servers: Vec<_> = token.iter().map(|t| t.resource_server.as_str()).collect();
        assert_eq!(
            servers,
            ["auth.globus.org", "transfer.api.globus.org", "petrel_https_server"]
        );
        assert!(token.other_tokens[1].access_token.is_none());
    }

    #[test]
    fn token_set_requires_provider_field_names() {
        let camel_case = r#"{"accessToken": "t", "resourceServer": "auth.globus.org"}"#;
        assert!(serde_json::from_str::<TokenSet>(camel_case).is_err());

        let missing_server = r#"{"access_token": "t", "other_tokens": []}"#;
        assert!(serde_json::from_str::<TokenSet>(missing_server).is_err());

        let nested_without_server = r#"{
            "resource_server": "auth.globus.org",
            "other_tokens": [{"access_token": "t"}]
        }"#;
        assert!(serde_json::from_str::<TokenSet>(nested_without_server).is_err());
    }

    #[test]
    fn parent_type_names() {
        assert_eq!(ParentType::User.as_ref(), "user");
        assert_eq!("collection".parse::<ParentType>().unwrap(), ParentType::Collection);
    }
}
