//! Provider trait implementations for [`ReqwestClient`].
//!
//! [`ReqwestClient`]: crate::ReqwestClient

mod data_plane;
mod transfer;
