#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tether_core::{
    BridgeConfig, CredentialService, DataPlaneService, RemoteBridge, TransferService,
};
use tether_reqwest::{ReqwestClient, ReqwestConfig};

use crate::{Error, Result};

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Remote-store bridge configuration.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// HTTP client configuration for the transfer API and data plane.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub reqwest: ReqwestConfig,
}

impl ServiceConfig {
    /// Builds the HTTP client shared by the transfer API and data plane.
    pub fn connect_reqwest(&self) -> Result<ReqwestClient> {
        ReqwestClient::new(self.reqwest.clone()).map_err(|err| {
            Error::external("transfer api", "failed to create http client").with_source(err)
        })
    }

    /// Builds the remote-store bridge on top of the given providers.
    pub fn create_bridge(
        &self,
        transfer: TransferService,
        data_plane: DataPlaneService,
        credentials: CredentialService,
    ) -> RemoteBridge {
        RemoteBridge::new(self.bridge.clone(), transfer, data_plane, credentials)
    }
}
