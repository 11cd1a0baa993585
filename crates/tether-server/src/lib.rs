#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Tether Server
//!
//! HTTP surface of a host resource model with remote-store endpoints
//! bridged in. Every folder and item request is first offered to the
//! registered [`Hooks`], in order, and only falls through to the host's
//! native resources when no hook claims it.
//!
//! [`Hooks`]: tether_core::Hooks

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
