//! Structured error handling for bridge operations.

use std::borrow::Cow;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while bridging the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Identifier carries the namespace prefix but its payload is corrupt,
    /// or it names the wrong kind of node for the operation.
    MalformedIdentifier,
    /// Item path does not follow the data-plane path convention.
    UnsupportedPath,
    /// Listing or search call against the transfer API failed.
    RemoteUnavailable,
    /// The HTTPS data plane answered with a non-success status.
    UpstreamDownload,
    /// Caller lacks the bearer token required for the operation.
    MissingCredential,
    /// Serialization/deserialization error.
    Serialization,
    /// Configuration error.
    Configuration,
    /// Internal error.
    #[default]
    InternalError,
}

impl ErrorKind {
    /// Returns `true` for kinds caused by the request itself rather than
    /// by the remote store or this process.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedIdentifier | Self::UnsupportedPath)
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<Cow<'static, str>>,
    /// HTTP status reported by the remote store, if there was a response.
    pub status: Option<u16>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<Cow<'static, str>>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
            source: None,
            context: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self::new(kind).with_source(source)
    }

    /// Creates a malformed identifier error.
    pub fn malformed_identifier() -> Self {
        Self::new(ErrorKind::MalformedIdentifier)
    }

    /// Creates an unsupported path error.
    pub fn unsupported_path() -> Self {
        Self::new(ErrorKind::UnsupportedPath)
    }

    /// Creates a remote unavailable error.
    pub fn remote_unavailable() -> Self {
        Self::new(ErrorKind::RemoteUnavailable)
    }

    /// Creates an upstream download error carrying the upstream status.
    pub fn upstream_download(status: u16) -> Self {
        Self::new(ErrorKind::UpstreamDownload).with_status(status)
    }

    /// Creates a missing credential error.
    pub fn missing_credential() -> Self {
        Self::new(ErrorKind::MissingCredential)
    }

    /// Creates a serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Records the upstream HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("Invalid JSON payload")
    }
}
