use tether_core::{BridgeConfig, CredentialService, InMemoryCredentialStore};

use crate::Result;
use crate::service::{HookRegistry, InMemoryResources, NativeService, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    hooks: HookRegistry,
    native: NativeService,
    bridge_config: BridgeConfig,
}

impl ServiceState {
    /// Creates the state from already assembled services.
    pub fn new(hooks: HookRegistry, native: NativeService, bridge_config: BridgeConfig) -> Self {
        Self {
            hooks,
            native,
            bridge_config,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Credentials live in process memory, so users re-run the OAuth flow
    /// after a restart.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = config.connect_reqwest()?;
        let credentials = CredentialService::new(InMemoryCredentialStore::new());
        let bridge = config.create_bridge(
            client.clone().into_transfer_service(),
            client.into_data_plane_service(),
            credentials,
        );

        let hooks = HookRegistry::new().with_hook(bridge);
        let native = NativeService::new(InMemoryResources::new());

        Ok(Self::new(hooks, native, config.bridge.clone()))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(hooks: HookRegistry);
impl_di!(native: NativeService);
impl_di!(bridge_config: BridgeConfig);
