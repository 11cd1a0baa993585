#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Tether Core
//!
//! Bridges endpoints of a remote object-transfer service into a host's
//! folder and item hierarchy without persisting any remote structure.
//!
//! - [`id`] encodes remote locations into self-describing identifiers.
//! - [`transfer`] and [`download`] define the provider traits for the
//!   transfer API and the HTTPS data plane.
//! - [`bridge`] implements the [`hooks::Hooks`] the host dispatches
//!   through, answering only for identifiers it owns.

mod error;

pub mod bridge;
pub mod credential;
pub mod download;
pub mod hooks;
pub mod id;
pub mod transfer;
pub mod view;

#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

pub use bridge::{BridgeConfig, RemoteBridge};
pub use credential::{CredentialService, CredentialStore, InMemoryCredentialStore, UserId};
pub use download::{DataPlaneProvider, DataPlaneService, Disposition, Download};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use hooks::{HookContext, Hooks, Outcome};
pub use id::VirtualId;
pub use transfer::{EndpointScope, TransferProvider, TransferService};
