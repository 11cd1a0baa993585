//! The remote-store bridge: hooks that answer for identifiers carrying
//! the bridge's namespace prefix and decline everything else.

mod capture;
mod download;
mod nodes;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

pub use self::capture::CredentialCapture;
pub use self::download::DownloadProxy;
pub use self::nodes::NodeFactory;
use crate::Result;
use crate::credential::{CredentialService, UserId};
use crate::download::{DataPlaneService, Disposition, Download};
use crate::hooks::{AuthCompleted, HookContext, Hooks, Outcome, ParentType};
use crate::id::{VirtualId, decode_owned};
use crate::transfer::{EndpointScope, TransferService};
use crate::view::{FileView, FolderDetails, FolderView, ItemDetail, ItemView};

/// Tracing target for bridge operations.
pub const TRACING_TARGET: &str = "tether_core::bridge";

/// OAuth scope granting access to the transfer API.
pub const TRANSFER_SCOPE: &str = "urn:globus:auth:scope:transfer.api.globus.org:all";

/// Default OAuth provider name of the remote store.
pub const DEFAULT_AUTH_PROVIDER: &str = "globus";

/// Default resource server of transfer API tokens.
pub const DEFAULT_TRANSFER_RESOURCE_SERVER: &str = "transfer.api.globus.org";

/// Default resource server of data-plane tokens.
pub const DEFAULT_DATA_PLANE_RESOURCE_SERVER: &str = "petrel_https_server";

/// Default OAuth scope granting access to the data plane.
pub const DEFAULT_DATA_PLANE_SCOPE: &str =
    "https://auth.globus.org/scopes/56ceac29-e98a-440a-a594-b41e7a084b62/all";

/// Configuration of the remote-store bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct BridgeConfig {
    /// OAuth provider name whose completions carry remote-store tokens
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-provider", env = "AUTH_PROVIDER", default_value = DEFAULT_AUTH_PROVIDER)
    )]
    #[serde(default = "default_auth_provider")]
    pub auth_provider: String,

    /// Resource server that transfer API tokens are issued for
    #[cfg_attr(
        feature = "config",
        arg(
            long = "transfer-resource-server",
            env = "TRANSFER_RESOURCE_SERVER",
            default_value = DEFAULT_TRANSFER_RESOURCE_SERVER
        )
    )]
    #[serde(default = "default_transfer_resource_server")]
    pub transfer_resource_server: String,

    /// Resource server that data-plane tokens are issued for
    #[cfg_attr(
        feature = "config",
        arg(
            long = "data-plane-resource-server",
            env = "DATA_PLANE_RESOURCE_SERVER",
            default_value = DEFAULT_DATA_PLANE_RESOURCE_SERVER
        )
    )]
    #[serde(default = "default_data_plane_resource_server")]
    pub data_plane_resource_server: String,

    /// OAuth scope requested for the data plane
    #[cfg_attr(
        feature = "config",
        arg(long = "data-plane-scope", env = "DATA_PLANE_SCOPE", default_value = DEFAULT_DATA_PLANE_SCOPE)
    )]
    #[serde(default = "default_data_plane_scope")]
    pub data_plane_scope: String,

    /// Endpoint search filter used for the user root
    #[cfg_attr(
        feature = "config",
        arg(
            long = "root-endpoint-scope",
            env = "ROOT_ENDPOINT_SCOPE",
            value_enum,
            default_value_t = EndpointScope::SharedWithMe
        )
    )]
    #[serde(default)]
    pub root_endpoint_scope: EndpointScope,
}

fn default_auth_provider() -> String {
    DEFAULT_AUTH_PROVIDER.to_owned()
}

fn default_transfer_resource_server() -> String {
    DEFAULT_TRANSFER_RESOURCE_SERVER.to_owned()
}

fn default_data_plane_resource_server() -> String {
    DEFAULT_DATA_PLANE_RESOURCE_SERVER.to_owned()
}

fn default_data_plane_scope() -> String {
    DEFAULT_DATA_PLANE_SCOPE.to_owned()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            auth_provider: default_auth_provider(),
            transfer_resource_server: default_transfer_resource_server(),
            data_plane_resource_server: default_data_plane_resource_server(),
            data_plane_scope: default_data_plane_scope(),
            root_endpoint_scope: EndpointScope::default(),
        }
    }
}

impl BridgeConfig {
    /// OAuth scopes the host's provider must request for the bridge.
    pub fn oauth_scopes(&self) -> Vec<String> {
        vec![TRANSFER_SCOPE.to_owned(), self.data_plane_scope.clone()]
    }

    /// Set the data-plane resource server.
    #[must_use]
    pub fn with_data_plane_resource_server(mut self, server: impl Into<String>) -> Self {
        self.data_plane_resource_server = server.into();
        self
    }

    /// Set the endpoint search filter used for the user root.
    #[must_use]
    pub fn with_root_endpoint_scope(mut self, scope: EndpointScope) -> Self {
        self.root_endpoint_scope = scope;
        self
    }
}

/// Hooks exposing remote-store endpoints as host folders and items.
#[derive(Debug, Clone)]
pub struct RemoteBridge {
    config: BridgeConfig,
    nodes: NodeFactory,
    downloads: DownloadProxy,
    capture: CredentialCapture,
    credentials: CredentialService,
}

impl RemoteBridge {
    pub fn new(
        config: BridgeConfig,
        transfer: TransferService,
        data_plane: DataPlaneService,
        credentials: CredentialService,
    ) -> Self {
        let capture = CredentialCapture::new(
            config.auth_provider.clone(),
            config.transfer_resource_server.clone(),
            config.data_plane_resource_server.clone(),
            credentials.clone(),
        );

        Self {
            nodes: NodeFactory::new(transfer, config.root_endpoint_scope),
            downloads: DownloadProxy::new(data_plane),
            capture,
            credentials,
            config,
        }
    }

    /// Returns the bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    async fn transfer_token(&self, ctx: &HookContext) -> Result<Option<(UserId, String)>> {
        let Some(user) = ctx.user.as_ref() else {
            return Ok(None);
        };

        let credential = self.credentials.get(user).await?;
        Ok(credential.transfer_token.map(|token| (user.clone(), token)))
    }

    async fn data_plane_token(&self, ctx: &HookContext) -> Result<Option<String>> {
        let Some(user) = ctx.user.as_ref() else {
            return Ok(None);
        };

        Ok(self.credentials.get(user).await?.data_plane_token)
    }
}

#[async_trait::async_trait]
impl Hooks for RemoteBridge {
    fn name(&self) -> &str {
        "remote-bridge"
    }

    async fn list_folder_children(
        &self,
        ctx: &HookContext,
        parent_id: &str,
        parent_type: ParentType,
    ) -> Result<Outcome<Vec<FolderView>>> {
        let parent = decode_owned(parent_id)?;
        let Some((user, token)) = self.transfer_token(ctx).await? else {
            return Ok(Outcome::Decline);
        };

        if let Some(parent) = parent {
            return Ok(Outcome::Claim(self.nodes.folder_children(&token, &parent).await?));
        }

        if parent_id == user.as_str() {
            tracing::debug!(
                target: TRACING_TARGET,
                user = %user,
                parent_type = %parent_type,
                "Adding endpoint roots to user root"
            );
            return Ok(Outcome::Extend(self.nodes.root_folders(&token).await?));
        }

        Ok(Outcome::Decline)
    }

    async fn list_item_children(
        &self,
        ctx: &HookContext,
        folder_id: &str,
    ) -> Result<Outcome<Vec<ItemView>>> {
        let Some(parent) = decode_owned(folder_id)? else {
            return Ok(Outcome::Decline);
        };

        let Some((_, token)) = self.transfer_token(ctx).await? else {
            return Ok(Outcome::Decline);
        };

        Ok(Outcome::Claim(self.nodes.item_children(&token, &parent).await?))
    }

    async fn folder_detail(&self, _ctx: &HookContext, id: &str) -> Result<Outcome<FolderView>> {
        match decode_owned(id)? {
            Some(id) => Ok(Outcome::Claim(self.nodes.folder_view(&id)?)),
            None => Ok(Outcome::Decline),
        }
    }

    async fn item_detail(&self, ctx: &HookContext, id: &str) -> Result<Outcome<ItemDetail>> {
        match decode_owned(id)? {
            Some(id) => Ok(Outcome::Claim(self.nodes.item_detail(&id, ctx.user.as_ref())?)),
            None => Ok(Outcome::Decline),
        }
    }

    async fn item_files(&self, ctx: &HookContext, id: &str) -> Result<Outcome<Vec<FileView>>> {
        match decode_owned(id)? {
            Some(id) => Ok(Outcome::Claim(self.nodes.item_files(&id, ctx.user.as_ref())?)),
            None => Ok(Outcome::Decline),
        }
    }

    async fn folder_aggregate(
        &self,
        _ctx: &HookContext,
        id: &str,
    ) -> Result<Outcome<FolderDetails>> {
        match decode_owned(id)? {
            Some(id) => Ok(Outcome::Claim(self.nodes.folder_details(&id)?)),
            None => Ok(Outcome::Decline),
        }
    }

    async fn download(
        &self,
        ctx: &HookContext,
        id: &str,
        disposition: Disposition,
    ) -> Result<Outcome<Download>> {
        let Some(id) = decode_owned(id)? else {
            return Ok(Outcome::Decline);
        };

        let Some(token) = self.data_plane_token(ctx).await? else {
            tracing::debug!(
                target: TRACING_TARGET,
                endpoint_id = id.endpoint_id(),
                "No data-plane token, declining download"
            );
            return Ok(Outcome::Decline);
        };

        let download = self.downloads.stream_item(&id, &token, disposition).await?;
        Ok(Outcome::Claim(download))
    }

    async fn auth_completed(&self, event: &AuthCompleted) -> Result<Outcome<()>> {
        if !self.capture.matches(event) {
            return Ok(Outcome::Decline);
        }

        self.capture.capture(event).await?;
        Ok(Outcome::Claim(()))
    }
}

/// Returns the identifier of an endpoint root as the host sees it.
pub fn endpoint_root_id(endpoint_id: &str) -> String {
    VirtualId::endpoint_root(endpoint_id).encode()
}
