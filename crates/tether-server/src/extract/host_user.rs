use axum::extract::FromRequestParts;
use axum::http::HeaderName;
use axum::http::request::Parts;
use tether_core::{HookContext, UserId};

use crate::handler::{Error, ErrorKind};

/// Header carrying the authenticated host user.
///
/// The host's authentication layer sits in front of this server and
/// forwards the resolved user id; requests without it are anonymous.
pub const HOST_USER_HEADER: HeaderName = HeaderName::from_static("x-host-user");

/// Caller identity handed to every hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostUser(pub HookContext);

impl HostUser {
    /// Returns the hook context of the caller.
    #[inline]
    pub fn context(&self) -> &HookContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for HostUser
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(&HOST_USER_HEADER) else {
            return Ok(Self(HookContext::anonymous()));
        };

        let user = value.to_str().map_err(|_| {
            ErrorKind::BadRequest
                .with_message("Invalid host user header")
                .with_context("The x-host-user header must be visible ASCII")
        })?;

        match user.trim() {
            "" => Ok(Self(HookContext::anonymous())),
            user => Ok(Self(HookContext::user(UserId::new(user)))),
        }
    }
}
