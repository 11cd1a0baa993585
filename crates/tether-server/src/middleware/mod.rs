//! Middleware for `axum::Router`.
//!
//! Apply recovery outermost so timeouts and panics in any inner layer
//! become error responses:
//!
//! ```rust,ignore
//! let app = routes(state.clone())
//!     .with_state(state)
//!     .with_metrics()
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;

pub use observability::{RouteCategory, RouterObservabilityExt, track_categorized_metrics};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
