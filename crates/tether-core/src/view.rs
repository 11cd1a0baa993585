//! Folder and item shapes of the host's resource model.
//!
//! Views are transient: they are built per request from a decoded
//! identifier and at most one remote listing, and are never persisted.
//! Host-native nodes use the same shapes with the remote marker unset.

use jiff::Timestamp;
use serde::{Serialize, Serializer};

use crate::credential::UserId;
use crate::id::VirtualId;

/// Model type tag of a host resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Folder,
    Item,
    File,
}

/// Access level granted to the caller on a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessLevel {
    #[default]
    Read = 0,
    Write = 1,
    Admin = 2,
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A folder as presented to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_modelType")]
    pub model_type: ModelType,
    #[serde(rename = "_accessLevel")]
    pub access_level: AccessLevel,
    pub name: String,
    /// Marks folders synthesized from the remote store.
    #[serde(rename = "remoteFolder", skip_serializing_if = "std::ops::Not::not")]
    pub remote: bool,
    /// Raw remote path for client-side display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

impl FolderView {
    /// Creates a host-native folder view.
    pub fn native(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_type: ModelType::Folder,
            access_level: AccessLevel::Admin,
            name: name.into(),
            remote: false,
            remote_path: None,
        }
    }

    /// Creates a read-only view of a remote folder.
    pub fn remote(id: &VirtualId, name: impl Into<String>) -> Self {
        Self {
            id: id.encode(),
            model_type: ModelType::Folder,
            access_level: AccessLevel::Read,
            name: name.into(),
            remote: true,
            remote_path: Some(id.path().to_owned()),
        }
    }
}

/// An item as presented to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_modelType")]
    pub model_type: ModelType,
    #[serde(rename = "_accessLevel")]
    pub access_level: AccessLevel,
    pub name: String,
    pub size: u64,
    /// Marks items synthesized from the remote store.
    #[serde(rename = "remoteFile", skip_serializing_if = "std::ops::Not::not")]
    pub remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

impl ItemView {
    /// Creates a host-native item view.
    pub fn native(id: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            model_type: ModelType::Item,
            access_level: AccessLevel::Admin,
            name: name.into(),
            size,
            remote: false,
            remote_path: None,
        }
    }

    /// Creates a read-only view of a remote file.
    pub fn remote(id: &VirtualId) -> Self {
        Self {
            id: id.encode(),
            model_type: ModelType::Item,
            access_level: AccessLevel::Read,
            name: id.name().to_owned(),
            size: id.size().unwrap_or_default(),
            remote: true,
            remote_path: Some(id.path().to_owned()),
        }
    }
}

/// Full item metadata, including its parent folder.
///
/// The remote store does not report creation or modification times in
/// this flow, so `created` and `updated` are request-time values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: ItemView,
    pub folder_id: String,
    pub creator_id: Option<UserId>,
    pub base_parent_id: Option<UserId>,
    pub base_parent_type: Option<&'static str>,
    pub created: Timestamp,
    pub updated: Timestamp,
}

/// Description of the single downloadable file behind an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_modelType")]
    pub model_type: ModelType,
    pub name: String,
    pub size: u64,
    pub creator_id: Option<UserId>,
    pub exts: Vec<String>,
    pub created: Timestamp,
    pub item_id: String,
    #[serde(rename = "remoteFile", skip_serializing_if = "std::ops::Not::not")]
    pub remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

/// Returns the lower-cased extensions of a file name, e.g. `["tar", "gz"]`.
pub fn extensions(name: &str) -> Vec<String> {
    name.trim_start_matches('.')
        .split('.')
        .skip(1)
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Child counts of a folder.
///
/// `None` means unknown and is serialized as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetails {
    pub n_folders: Option<u64>,
    pub n_items: Option<u64>,
}

impl FolderDetails {
    /// Counts that the remote store cannot report cheaply.
    pub const fn unknown() -> Self {
        Self {
            n_folders: None,
            n_items: None,
        }
    }

    /// Known counts.
    pub const fn counted(n_folders: u64, n_items: u64) -> Self {
        Self {
            n_folders: Some(n_folders),
            n_items: Some(n_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_folder_serialization() {
        let id = VirtualId::folder("ep-1", "~/data");
        let json = serde_json::to_value(FolderView::remote(&id, "data")).unwrap();

        assert_eq!(json["_id"], id.encode());
        assert_eq!(json["_modelType"], "folder");
        assert_eq!(json["_accessLevel"], 0);
        assert_eq!(json["name"], "data");
        assert_eq!(json["remoteFolder"], true);
        assert_eq!(json["remotePath"], "~/data");
    }

    #[test]
    fn native_folder_omits_remote_fields() {
        let json = serde_json::to_value(FolderView::native("abc", "Private")).unwrap();
        assert!(json.get("remoteFolder").is_none());
        assert!(json.get("remotePath").is_none());
        assert_eq!(json["_accessLevel"], 2);
    }

    #[test]
    fn remote_item_carries_size() {
        let id = VirtualId::item("ep-1", "~/data/a.txt", 42);
        let view = ItemView::remote(&id);
        assert_eq!(view.name, "a.txt");
        assert_eq!(view.size, 42);

        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["remoteFile"], true);
        assert_eq!(json["_modelType"], "item");
    }

    #[test]
    fn unknown_details_serialize_as_null() {
        let json = serde_json::to_value(FolderDetails::unknown()).unwrap();
        assert!(json["nFolders"].is_null());
        assert!(json["nItems"].is_null());
    }

    #[test]
    fn file_extensions() {
        assert_eq!(extensions("archive.TAR.gz"), vec!["tar", "gz"]);
        assert_eq!(extensions("README"), Vec::<String>::new());
        assert_eq!(extensions(".bashrc"), Vec::<String>::new());
        assert_eq!(extensions("a..b"), vec!["b"]);
    }
}
