//! Internal error types for tether-reqwest.

use thiserror::Error;

/// Result type alias for tether-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for tether-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A configured or derived URL is invalid.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// A URL cannot carry path segments.
    #[error("URL cannot be a base: {0}")]
    CannotBeBase(String),
    /// Endpoint id is not usable as a host name label.
    #[error("Invalid endpoint id: {0:?}")]
    EndpointId(String),
    /// The transfer API answered with a non-success status.
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<Error> for tether_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let error = if e.is_timeout() {
                    tether_core::Error::remote_unavailable().with_message("Request timed out")
                } else if e.is_connect() {
                    tether_core::Error::remote_unavailable().with_message("Connection failed")
                } else {
                    tether_core::Error::remote_unavailable().with_message(e.to_string())
                };

                match e.status() {
                    Some(status) => error.with_status(status.as_u16()).with_source(e),
                    None => error.with_source(e),
                }
            }
            Error::Serde(e) => tether_core::Error::remote_unavailable()
                .with_message("Remote store returned an unreadable response")
                .with_source(e),
            Error::Url(e) => tether_core::Error::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::CannotBeBase(url) => tether_core::Error::configuration()
                .with_message("URL cannot carry path segments")
                .with_context(format!("url: {url}")),
            Error::EndpointId(id) => tether_core::Error::malformed_identifier()
                .with_message("Endpoint id is not a valid host name label")
                .with_context(format!("endpoint_id: {id}")),
            Error::Status { status, message } => tether_core::Error::remote_unavailable()
                .with_status(status)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use tether_core::ErrorKind;

    use super::*;

    #[test]
    fn status_maps_to_remote_unavailable() {
        let error = tether_core::Error::from(Error::Status {
            status: 404,
            message: "ClientError.NotFound".into(),
        });
        assert_eq!(error.kind, ErrorKind::RemoteUnavailable);
        assert_eq!(error.status, Some(404));
    }

    #[test]
    fn endpoint_id_maps_to_malformed_identifier() {
        let error = tether_core::Error::from(Error::EndpointId("a/b".into()));
        assert_eq!(error.kind, ErrorKind::MalformedIdentifier);
    }

    #[test]
    fn url_maps_to_configuration() {
        let parse = url::Url::parse("not a url").unwrap_err();
        let error = tether_core::Error::from(Error::Url(parse));
        assert_eq!(error.kind, ErrorKind::Configuration);
    }
}
