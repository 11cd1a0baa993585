//! Self-describing identifiers for virtual folders and items.
//!
//! A [`VirtualId`] is encoded as the namespace prefix followed by the
//! URL-safe base64 form of a small JSON object:
//!
//! ```text
//! globus:eyJpZCI6ImVwLTEiLCJwYXRoIjoifi9kYXRhIn0
//!        └── {"id":"ep-1","path":"~/data"}
//! ```
//!
//! Items additionally carry `size`, so item metadata can be answered
//! without another remote call.

mod path;

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

pub use self::path::{ROOT_PATH, basename, data_plane_relative, dirname, join};
use crate::{Error, Result};

/// Prefix marking identifiers that belong to the remote-store bridge.
pub const NAMESPACE_PREFIX: &str = "globus:";

/// A location inside a remote endpoint.
///
/// Values built through [`VirtualId::folder`] are canonical: a folder at
/// [`ROOT_PATH`] is always represented as [`VirtualId::EndpointRoot`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualId {
    /// Root of an endpoint, at [`ROOT_PATH`].
    EndpointRoot { endpoint_id: String },
    /// Directory inside an endpoint.
    Folder { endpoint_id: String, path: String },
    /// File inside an endpoint with its size in bytes.
    Item {
        endpoint_id: String,
        path: String,
        size: u64,
    },
}

#[derive(Serialize)]
struct WireRef<'a> {
    id: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Wire {
    id: String,
    path: String,
    #[serde(default)]
    size: Option<u64>,
}

impl VirtualId {
    /// Creates the identifier of an endpoint root.
    pub fn endpoint_root(endpoint_id: impl Into<String>) -> Self {
        Self::EndpointRoot {
            endpoint_id: endpoint_id.into(),
        }
    }

    /// Creates the identifier of a folder, normalizing the base path to
    /// [`VirtualId::EndpointRoot`].
    pub fn folder(endpoint_id: impl Into<String>, path: impl Into<String>) -> Self {
        let endpoint_id = endpoint_id.into();
        let path = path.into();

        if path == ROOT_PATH {
            Self::EndpointRoot { endpoint_id }
        } else {
            Self::Folder { endpoint_id, path }
        }
    }

    /// Creates the identifier of an item.
    pub fn item(endpoint_id: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self::Item {
            endpoint_id: endpoint_id.into(),
            path: path.into(),
            size,
        }
    }

    /// Returns the endpoint this node lives in.
    pub fn endpoint_id(&self) -> &str {
        match self {
            Self::EndpointRoot { endpoint_id }
            | Self::Folder { endpoint_id, .. }
            | Self::Item { endpoint_id, .. } => endpoint_id,
        }
    }

    /// Returns the remote path of this node.
    pub fn path(&self) -> &str {
        match self {
            Self::EndpointRoot { .. } => ROOT_PATH,
            Self::Folder { path, .. } | Self::Item { path, .. } => path,
        }
    }

    /// Returns the cached size for items.
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Item { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Returns `true` for item identifiers.
    pub fn is_item(&self) -> bool {
        matches!(self, Self::Item { .. })
    }

    /// Returns the display name derived from the identifier alone.
    ///
    /// The endpoint root has no path component to show, so the endpoint id
    /// is used instead.
    pub fn name(&self) -> &str {
        match self {
            Self::EndpointRoot { endpoint_id } => endpoint_id,
            Self::Folder { path, .. } | Self::Item { path, .. } => basename(path),
        }
    }

    /// Returns the folder containing this node.
    pub fn parent(&self) -> Self {
        Self::folder(self.endpoint_id(), dirname(self.path()))
    }

    /// Returns the identifier of a child directory.
    pub fn child_folder(&self, name: &str) -> Self {
        Self::folder(self.endpoint_id(), join(self.path(), name))
    }

    /// Returns the identifier of a child file.
    pub fn child_item(&self, name: &str, size: u64) -> Self {
        Self::item(self.endpoint_id(), join(self.path(), name), size)
    }

    /// Encodes this identifier into its opaque string form.
    pub fn encode(&self) -> String {
        let wire = WireRef {
            id: self.endpoint_id(),
            path: self.path(),
            size: self.size(),
        };

        // Serializing two strings and an integer cannot fail.
        let json = serde_json::to_vec(&wire).unwrap_or_default();
        format!("{NAMESPACE_PREFIX}{}", URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes an identifier produced by [`VirtualId::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MalformedIdentifier`] when the prefix is absent
    /// or when the payload cannot be decoded.
    ///
    /// [`ErrorKind::MalformedIdentifier`]: crate::ErrorKind::MalformedIdentifier
    pub fn decode(value: &str) -> Result<Self> {
        let payload = value.strip_prefix(NAMESPACE_PREFIX).ok_or_else(|| {
            Error::malformed_identifier().with_message("Identifier is not a remote-store identifier")
        })?;

        let json = URL_SAFE_NO_PAD.decode(payload).map_err(|err| {
            Error::malformed_identifier()
                .with_message("Identifier payload is not valid base64")
                .with_source(err)
        })?;

        let wire: Wire = serde_json::from_slice(&json).map_err(|err| {
            Error::malformed_identifier()
                .with_message("Identifier payload is not a valid node description")
                .with_source(err)
        })?;

        if wire.id.is_empty() || wire.path.is_empty() {
            return Err(Error::malformed_identifier()
                .with_message("Identifier has an empty endpoint id or path"));
        }

        match wire.size {
            Some(_) if wire.path == ROOT_PATH => Err(Error::malformed_identifier()
                .with_message("Endpoint root cannot be an item")),
            Some(size) => Ok(Self::item(wire.id, wire.path, size)),
            None => Ok(Self::folder(wire.id, wire.path)),
        }
    }
}

impl fmt::Display for VirtualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for VirtualId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

/// Encodes an identifier. See [`VirtualId::encode`].
pub fn encode(id: &VirtualId) -> String {
    id.encode()
}

/// Decodes an identifier. See [`VirtualId::decode`].
pub fn decode(value: &str) -> Result<VirtualId> {
    VirtualId::decode(value)
}

/// Returns `true` if the identifier carries the bridge's namespace prefix.
pub fn is_owned(value: &str) -> bool {
    value.starts_with(NAMESPACE_PREFIX)
}

/// Decodes owned identifiers and passes over foreign ones.
///
/// Returns `Ok(None)` for identifiers without the namespace prefix and an
/// error for owned identifiers with a corrupt payload.
pub fn decode_owned(value: &str) -> Result<Option<VirtualId>> {
    if is_owned(value) {
        VirtualId::decode(value).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn samples() -> Vec<VirtualId> {
        vec![
            VirtualId::endpoint_root("ddb59aef-6d04-11e5-ba46-22000b92c6ec"),
            VirtualId::folder("ep-1", "~/data"),
            VirtualId::folder("ep-1", "~/data/with space/ünïcode"),
            VirtualId::folder("ep-1", "/absolute/path"),
            VirtualId::item("ep-1", "~/data/a.txt", 0),
            VirtualId::item("ep-1", "~/data/quote\"d.bin", u64::MAX),
            VirtualId::item("ep:with:colons", "~/x+y/z?.csv", 1024),
        ]
    }

    #[test]
    fn round_trip() {
        for id in samples() {
            let encoded = id.encode();
            assert_eq!(VirtualId::decode(&encoded).unwrap(), id, "encoded: {encoded}");
        }
    }

    #[test]
    fn encoding_is_injective() {
        let encoded: Vec<_> = samples().iter().map(VirtualId::encode).collect();
        for (i, a) in encoded.iter().enumerate() {
            for b in &encoded[i + 1..] {
                assert_ne!(a, b);
            }
        }

        // Same endpoint and path, folder versus item.
        assert_ne!(
            VirtualId::folder("ep", "~/a").encode(),
            VirtualId::item("ep", "~/a", 0).encode()
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let id = VirtualId::item("ep-1", "~/a.txt", 12);
        assert_eq!(id.encode(), id.encode());
        assert_eq!(id.to_string(), id.encode());
    }

    #[test]
    fn folder_at_root_is_endpoint_root() {
        let folder = VirtualId::folder("ep-1", ROOT_PATH);
        assert_eq!(folder, VirtualId::endpoint_root("ep-1"));
        assert_eq!(folder.encode(), VirtualId::endpoint_root("ep-1").encode());
    }

    #[test]
    fn ownership_discrimination() {
        for id in samples() {
            assert!(is_owned(&id.encode()));
        }

        for foreign in ["", "5f2b1c9e8a7d6e5f4a3b2c1d", "globus", "GLOBUS:abc", " globus:abc"] {
            assert!(!is_owned(foreign), "foreign: {foreign:?}");
            assert!(decode_owned(foreign).unwrap().is_none());
        }
    }

    #[test]
    fn decode_rejects_missing_prefix() {
        let error = VirtualId::decode("5f2b1c9e8a7d6e5f4a3b2c1d").unwrap_err();
        assert_eq!(error.kind, ErrorKind::MalformedIdentifier);
    }

    #[test]
    fn decode_rejects_corrupt_payloads() {
        let not_json = format!("{NAMESPACE_PREFIX}{}", URL_SAFE_NO_PAD.encode("not json"));
        let wrong_shape = format!("{NAMESPACE_PREFIX}{}", URL_SAFE_NO_PAD.encode(r#"{"id":1}"#));
        let extra_field = format!(
            "{NAMESPACE_PREFIX}{}",
            URL_SAFE_NO_PAD.encode(r#"{"id":"a","path":"~/b","name":"c"}"#)
        );
        let empty_path = format!(
            "{NAMESPACE_PREFIX}{}",
            URL_SAFE_NO_PAD.encode(r#"{"id":"a","path":""}"#)
        );
        let root_item = format!(
            "{NAMESPACE_PREFIX}{}",
            URL_SAFE_NO_PAD.encode(r#"{"id":"a","path":"~","size":3}"#)
        );

        for corrupt in [
            format!("{NAMESPACE_PREFIX}"),
            format!("{NAMESPACE_PREFIX}!!!not-base64!!!"),
            not_json,
            wrong_shape,
            extra_field,
            empty_path,
            root_item,
        ] {
            let error = decode_owned(&corrupt).unwrap_err();
            assert_eq!(error.kind, ErrorKind::MalformedIdentifier, "corrupt: {corrupt}");
        }
    }

    #[test]
    fn derived_identifiers() {
        let root = VirtualId::endpoint_root("ep-1");
        let folder = root.child_folder("data");
        let item = folder.child_item("a.txt", 42);

        assert_eq!(folder, VirtualId::folder("ep-1", "~/data"));
        assert_eq!(item, VirtualId::item("ep-1", "~/data/a.txt", 42));
        assert_eq!(item.parent(), folder);
        assert_eq!(folder.parent(), root);
        assert_eq!(item.name(), "a.txt");
        assert_eq!(root.name(), "ep-1");
        assert_eq!(item.size(), Some(42));
        assert_eq!(folder.size(), None);
    }
}
