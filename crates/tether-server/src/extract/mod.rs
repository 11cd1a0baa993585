//! Request extractors with [`Error`] rejections.
//!
//! [`Error`]: crate::handler::Error

mod host_user;
mod json;
mod query;

pub use host_user::{HOST_USER_HEADER, HostUser};
pub use json::Json;
pub use query::Query;
