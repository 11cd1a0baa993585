//! Reqwest client module.
//!
//! This module provides the shared HTTP client used for the transfer API
//! and the data plane.

mod client;
mod config;

pub use client::{ReqwestClient, TRACING_TARGET};
pub use config::ReqwestConfig;
