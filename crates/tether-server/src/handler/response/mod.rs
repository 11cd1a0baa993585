//! Response types for HTTP handlers.

mod error_response;
mod oauth;

pub use error_response::ErrorResponse;
pub use oauth::OAuthScopes;
