//! Application state and dependency injection.

mod config;
mod native;
mod registry;
mod state;

pub use crate::service::config::ServiceConfig;
pub use crate::service::native::{InMemoryResources, NativeFile, NativeResources, NativeService};
pub use crate::service::registry::{Dispatch, HookRegistry};
pub use crate::service::state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
