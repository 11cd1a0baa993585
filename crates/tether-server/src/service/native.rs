//! The host's own folders and items.
//!
//! Requests no hook claims are answered here. The in-memory store keeps
//! folders and single-file items keyed by 24-digit hex ids, which never
//! collide with namespaced remote identifiers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use derive_more::Deref;
use jiff::Timestamp;
use tether_core::hooks::ParentType;
use tether_core::view::{FileView, FolderDetails, FolderView, ItemDetail, ItemView, ModelType};
use tether_core::{Result, UserId};
use tokio::sync::RwLock;

/// Content of a native file.
#[derive(Clone, PartialEq, Eq)]
pub struct NativeFile {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl fmt::Debug for NativeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// The host's resource model.
#[async_trait::async_trait]
pub trait NativeResources: Send + Sync {
    /// Folders directly below a folder, user or collection.
    async fn list_folders(&self, parent_id: &str, parent_type: ParentType)
    -> Result<Vec<FolderView>>;

    /// Items of a folder.
    async fn list_items(&self, folder_id: &str) -> Result<Vec<ItemView>>;

    async fn folder(&self, id: &str) -> Result<Option<FolderView>>;

    async fn item(&self, id: &str) -> Result<Option<ItemDetail>>;

    async fn item_files(&self, id: &str) -> Result<Option<Vec<FileView>>>;

    async fn folder_details(&self, id: &str) -> Result<Option<FolderDetails>>;

    /// Content of an item's file.
    async fn file(&self, id: &str) -> Result<Option<NativeFile>>;
}

/// Shared handle to the host's resource model.
#[derive(Clone, Deref)]
pub struct NativeService(Arc<dyn NativeResources>);

impl NativeService {
    pub fn new<R>(resources: R) -> Self
    where
        R: NativeResources + 'static,
    {
        Self(Arc::new(resources))
    }
}

impl fmt::Debug for NativeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeService").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct NativeFolder {
    view: FolderView,
    parent_id: String,
    parent_type: ParentType,
}

#[derive(Debug, Clone)]
struct NativeItem {
    view: ItemView,
    folder_id: String,
    file: NativeFile,
    created: Timestamp,
}

#[derive(Debug, Default)]
struct Resources {
    folders: HashMap<String, NativeFolder>,
    items: HashMap<String, NativeItem>,
}

impl Resources {
    /// Walks up to the user or collection the folder lives in.
    fn base_parent(&self, folder_id: &str) -> Option<(String, ParentType)> {
        let mut current = self.folders.get(folder_id)?;
        loop {
            match current.parent_type {
                ParentType::Folder => current = self.folders.get(&current.parent_id)?,
                parent_type => return Some((current.parent_id.clone(), parent_type)),
            }
        }
    }
}

/// Process-local resource model.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResources {
    inner: Arc<RwLock<Resources>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Creates a folder below a folder, user or collection.
    pub async fn create_folder(
        &self,
        parent_id: impl Into<String>,
        parent_type: ParentType,
        name: impl Into<String>,
    ) -> FolderView {
        let view = FolderView::native(self.next_id(), name);
        let folder = NativeFolder {
            view: view.clone(),
            parent_id: parent_id.into(),
            parent_type,
        };

        self.inner
            .write()
            .await
            .folders
            .insert(view.id.clone(), folder);
        view
    }

    /// Creates an item holding a single file.
    pub async fn create_item(
        &self,
        folder_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> ItemView {
        let name = name.into();
        let content = content.into();
        let view = ItemView::native(self.next_id(), name.clone(), content.len() as u64);
        let item = NativeItem {
            view: view.clone(),
            folder_id: folder_id.into(),
            file: NativeFile {
                name,
                content_type: content_type.map(str::to_owned),
                content,
            },
            created: Timestamp::now(),
        };

        self.inner.write().await.items.insert(view.id.clone(), item);
        view
    }
}

#[async_trait::async_trait]
impl NativeResources for InMemoryResources {
    async fn list_folders(
        &self,
        parent_id: &str,
        parent_type: ParentType,
    ) -> Result<Vec<FolderView>> {
        let resources = self.inner.read().await;
        let mut folders: Vec<_> = resources
            .folders
            .values()
            .filter(|f| f.parent_id == parent_id && f.parent_type == parent_type)
            .map(|f| f.view.clone())
            .collect();

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }

    async fn list_items(&self, folder_id: &str) -> Result<Vec<ItemView>> {
        let resources = self.inner.read().await;
        let mut items: Vec<_> = resources
            .items
            .values()
            .filter(|i| i.folder_id == folder_id)
            .map(|i| i.view.clone())
            .collect();

        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn folder(&self, id: &str) -> Result<Option<FolderView>> {
        let resources = self.inner.read().await;
        Ok(resources.folders.get(id).map(|f| f.view.clone()))
    }

    async fn item(&self, id: &str) -> Result<Option<ItemDetail>> {
        let resources = self.inner.read().await;
        let Some(item) = resources.items.get(id) else {
            return Ok(None);
        };

        let base_parent = resources.base_parent(&item.folder_id);
        let creator_id = base_parent
            .as_ref()
            .filter(|(_, parent_type)| *parent_type == ParentType::User)
            .map(|(id, _)| UserId::new(id.as_str()));

        Ok(Some(ItemDetail {
            item: item.view.clone(),
            folder_id: item.folder_id.clone(),
            creator_id,
            base_parent_id: base_parent.as_ref().map(|(id, _)| UserId::new(id.as_str())),
            base_parent_type: base_parent.map(|(_, parent_type)| match parent_type {
                ParentType::User => "user",
                ParentType::Collection => "collection",
                ParentType::Folder => "folder",
            }),
            created: item.created,
            updated: item.created,
        }))
    }

    async fn item_files(&self, id: &str) -> Result<Option<Vec<FileView>>> {
        let resources = self.inner.read().await;
        let Some(item) = resources.items.get(id) else {
            return Ok(None);
        };

        let file = FileView {
            id: item.view.id.clone(),
            model_type: ModelType::File,
            name: item.file.name.clone(),
            size: item.view.size,
            creator_id: None,
            exts: tether_core::view::extensions(&item.file.name),
            created: item.created,
            item_id: item.view.id.clone(),
            remote: false,
            remote_path: None,
        };

        Ok(Some(vec![file]))
    }

    async fn folder_details(&self, id: &str) -> Result<Option<FolderDetails>> {
        let resources = self.inner.read().await;
        if !resources.folders.contains_key(id) {
            return Ok(None);
        }

        let n_folders = resources
            .folders
            .values()
            .filter(|f| f.parent_id == id && f.parent_type == ParentType::Folder)
            .count();
        let n_items = resources.items.values().filter(|i| i.folder_id == id).count();

        Ok(Some(FolderDetails::counted(n_folders as u64, n_items as u64)))
    }

    async fn file(&self, id: &str) -> Result<Option<NativeFile>> {
        let resources = self.inner.read().await;
        Ok(resources.items.get(id).map(|i| i.file.clone()))
    }
}
