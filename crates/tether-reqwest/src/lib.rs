//! Reqwest-based implementations of the tether provider traits.
//!
//! [`ReqwestClient`] talks to both remote surfaces: the transfer API for
//! directory listings and endpoint search, and the per-endpoint HTTPS data
//! plane for file content.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let client = ReqwestClient::new(ReqwestConfig::default())?;
//! let transfer = client.clone().into_transfer_service();
//! let data_plane = client.into_data_plane_service();
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connect;
mod error;
mod service;

pub use crate::connect::{ReqwestClient, ReqwestConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};
