//! Request types for HTTP handlers.

use serde::Deserialize;
use tether_core::Disposition;
use tether_core::hooks::ParentType;

/// Query of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListQuery {
    pub parent_id: String,
    #[serde(default)]
    pub parent_type: ParentType,
}

/// Query of an item listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    pub folder_id: String,
}

/// Query of a download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    /// `inline` to display in the browser; anything else downloads.
    #[serde(default)]
    pub content_disposition: Option<String>,
}

impl DownloadQuery {
    pub fn disposition(&self) -> Disposition {
        Disposition::from_query(self.content_disposition.as_deref())
    }
}

/// Path of a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourcePath {
    pub id: String,
}
