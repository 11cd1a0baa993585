//! Conversion of bridge errors into HTTP errors.

use tether_core::{Error as CoreError, ErrorKind as CoreErrorKind};

use super::http_error::{Error, ErrorKind};

/// Tracing target for bridge error conversion.
const TRACING_TARGET: &str = "tether_server::handler::bridge_error";

impl From<CoreError> for Error<'static> {
    fn from(error: CoreError) -> Self {
        let kind = match error.kind {
            CoreErrorKind::MalformedIdentifier => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "malformed identifier");
                ErrorKind::MalformedIdentifier
            }
            CoreErrorKind::UnsupportedPath => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "unsupported remote path");
                ErrorKind::UnsupportedPath
            }
            CoreErrorKind::MissingCredential => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "missing credential");
                ErrorKind::Unauthorized
            }
            CoreErrorKind::RemoteUnavailable if error.status.is_some() => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    status = error.status,
                    "transfer api refused request"
                );
                ErrorKind::BadGateway
            }
            CoreErrorKind::RemoteUnavailable => {
                tracing::error!(target: TRACING_TARGET, error = %error, "transfer api unreachable");
                ErrorKind::ServiceUnavailable
            }
            CoreErrorKind::UpstreamDownload => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    status = error.status,
                    "data plane refused download"
                );
                ErrorKind::BadGateway
            }
            CoreErrorKind::Serialization
            | CoreErrorKind::Configuration
            | CoreErrorKind::InternalError => {
                tracing::error!(target: TRACING_TARGET, error = %error, "internal bridge error");
                ErrorKind::InternalServerError
            }
        };

        let mut http_error = Error::new(kind);
        if let Some(message) = error.message {
            http_error = http_error.with_message(message);
        }
        if kind.status_code().is_client_error()
            && let Some(context) = error.context
        {
            http_error = http_error.with_context(context);
        }
        if let Some(status) = error.status {
            http_error = http_error.with_upstream_status(status);
        }

        http_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_refusal_keeps_upstream_status() {
        let error: Error = CoreError::upstream_download(404)
            .with_message("Remote store refused the download")
            .into();

        assert_eq!(error.kind(), ErrorKind::BadGateway);
        assert_eq!(error.upstream_status(), Some(404));
    }

    #[test]
    fn unreachable_remote_is_unavailable() {
        let error: Error = CoreError::remote_unavailable().into();
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(error.upstream_status(), None);

        let error: Error = CoreError::remote_unavailable().with_status(403).into();
        assert_eq!(error.kind(), ErrorKind::BadGateway);
        assert_eq!(error.upstream_status(), Some(403));
    }

    #[test]
    fn client_errors_keep_context() {
        let error: Error = CoreError::malformed_identifier()
            .with_context("id: globus:???")
            .into();
        assert_eq!(error.kind(), ErrorKind::MalformedIdentifier);
        assert_eq!(error.context(), Some("id: globus:???"));

        let error: Error = CoreError::configuration()
            .with_context("base url: not a url")
            .into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.context(), None);
    }
}
