//! Translation of remote listings into host folder and item views.

use jiff::Timestamp;

use crate::credential::UserId;
use crate::id::{VirtualId, join};
use crate::transfer::{EndpointScope, EntryKind, TransferService};
use crate::view::{
    FileView, FolderDetails, FolderView, ItemDetail, ItemView, ModelType, extensions,
};
use crate::{Error, Result};

/// Builds virtual folder and item views from identifiers and listings.
#[derive(Debug, Clone)]
pub struct NodeFactory {
    transfer: TransferService,
    root_scope: EndpointScope,
}

impl NodeFactory {
    pub fn new(transfer: TransferService, root_scope: EndpointScope) -> Self {
        Self {
            transfer,
            root_scope,
        }
    }

    /// Endpoint roots shown under the caller's own root.
    pub async fn root_folders(&self, token: &str) -> Result<Vec<FolderView>> {
        let endpoints = self.transfer.list_endpoints(token, self.root_scope).await?;

        Ok(endpoints
            .into_iter()
            .map(|endpoint| {
                let id = VirtualId::endpoint_root(endpoint.id);
                FolderView::remote(&id, endpoint.display_name)
            })
            .collect())
    }

    /// Directories inside a remote folder, in remote order.
    pub async fn folder_children(&self, token: &str, parent: &VirtualId) -> Result<Vec<FolderView>> {
        ensure_folder(parent)?;

        let entries = self
            .transfer
            .list_children(token, parent.endpoint_id(), parent.path())
            .await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Dir)
            .map(|entry| {
                let id = VirtualId::folder(parent.endpoint_id(), join(parent.path(), &entry.name));
                FolderView::remote(&id, entry.name)
            })
            .collect())
    }

    /// Files inside a remote folder, in remote order.
    pub async fn item_children(&self, token: &str, parent: &VirtualId) -> Result<Vec<ItemView>> {
        ensure_folder(parent)?;

        let entries = self
            .transfer
            .list_children(token, parent.endpoint_id(), parent.path())
            .await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .map(|entry| ItemView::remote(&parent.child_item(&entry.name, entry.size)))
            .collect())
    }

    /// Folder view synthesized from the identifier alone.
    pub fn folder_view(&self, id: &VirtualId) -> Result<FolderView> {
        ensure_folder(id)?;
        Ok(FolderView::remote(id, id.name()))
    }

    /// Item metadata synthesized from the identifier alone.
    pub fn item_detail(&self, id: &VirtualId, user: Option<&UserId>) -> Result<ItemDetail> {
        ensure_item(id)?;
        let now = Timestamp::now();

        Ok(ItemDetail {
            item: ItemView::remote(id),
            folder_id: id.parent().encode(),
            creator_id: user.cloned(),
            base_parent_id: user.cloned(),
            base_parent_type: user.map(|_| "user"),
            created: now,
            updated: now,
        })
    }

    /// The single file behind an item.
    pub fn item_files(&self, id: &VirtualId, user: Option<&UserId>) -> Result<Vec<FileView>> {
        ensure_item(id)?;
        let item_id = id.encode();
        let name = id.name().to_owned();

        Ok(vec![FileView {
            id: item_id.clone(),
            model_type: ModelType::File,
            exts: extensions(&name),
            name,
            size: id.size().unwrap_or_default(),
            creator_id: user.cloned(),
            created: Timestamp::now(),
            item_id,
            remote: true,
            remote_path: Some(id.path().to_owned()),
        }])
    }

    /// Child counts of a remote folder, which are never computed.
    pub fn folder_details(&self, id: &VirtualId) -> Result<FolderDetails> {
        ensure_folder(id)?;
        Ok(FolderDetails::unknown())
    }
}

fn ensure_folder(id: &VirtualId) -> Result<()> {
    if id.is_item() {
        return Err(Error::malformed_identifier()
            .with_message("Identifier names an item where a folder is expected")
            .with_context(format!("path: {}", id.path())));
    }

    Ok(())
}

fn ensure_item(id: &VirtualId) -> Result<()> {
    if !id.is_item() {
        return Err(Error::malformed_identifier()
            .with_message("Identifier names a folder where an item is expected")
            .with_context(format!("path: {}", id.path())));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::mock::MockTransfer;
    use crate::transfer::{EndpointSummary, RemoteEntry};

    fn factory(transfer: MockTransfer) -> NodeFactory {
        NodeFactory::new(TransferService::new(transfer), EndpointScope::default())
    }

    fn mixed_listing() -> Vec<RemoteEntry> {
        vec![
            RemoteEntry::file("z.txt", 3),
            RemoteEntry::dir("beta"),
            RemoteEntry {
                name: "link".into(),
                kind: EntryKind::Other,
                size: 0,
            },
            RemoteEntry::dir("alpha"),
            RemoteEntry::file("a.bin", 70_000),
        ]
    }

    #[tokio::test]
    async fn listing_splits_folders_and_items() {
        let transfer = MockTransfer::new().with_listing("ep-1", "~/data", mixed_listing());
        let factory = factory(transfer);
        let parent = VirtualId::folder("ep-1", "~/data");

        let folders = factory.folder_children("token", &parent).await.unwrap();
        let names: Vec<_> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["beta", "alpha"]);
        assert_eq!(
            VirtualId::decode(&folders[0].id).unwrap(),
            VirtualId::folder("ep-1", "~/data/beta")
        );

        let items = factory.item_children("token", &parent).await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["z.txt", "a.bin"]);
        assert_eq!(
            VirtualId::decode(&items[1].id).unwrap(),
            VirtualId::item("ep-1", "~/data/a.bin", 70_000)
        );
    }

    #[tokio::test]
    async fn endpoint_root_listing_uses_base_path() {
        let transfer = MockTransfer::new().with_listing("ep-1", "~", vec![RemoteEntry::dir("home")]);
        let factory = factory(transfer);

        let folders = factory
            .folder_children("token", &VirtualId::endpoint_root("ep-1"))
            .await
            .unwrap();
        assert_eq!(folders[0].remote_path.as_deref(), Some("~/home"));
    }

    #[tokio::test]
    async fn root_folders_are_endpoint_roots() {
        let transfer = MockTransfer::new().with_endpoints(vec![
            EndpointSummary::new("ep-1", "Shared data"),
            EndpointSummary::new("ep-2", "Archive"),
        ]);
        let factory = factory(transfer);

        let roots = factory.root_folders("token").await.unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].name, "Shared data");
        assert_eq!(
            VirtualId::decode(&roots[1].id).unwrap(),
            VirtualId::endpoint_root("ep-2")
        );
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let factory = factory(MockTransfer::new());
        let error = factory
            .folder_children("token", &VirtualId::folder("ep-1", "~/missing"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::RemoteUnavailable);
    }

    #[test]
    fn item_detail_parent() {
        let factory = factory(MockTransfer::new());
        let user = UserId::new("u-1");

        let nested = factory
            .item_detail(&VirtualId::item("ep-1", "~/data/a.txt", 5), Some(&user))
            .unwrap();
        assert_eq!(nested.folder_id, VirtualId::folder("ep-1", "~/data").encode());
        assert_eq!(nested.creator_id, Some(user.clone()));
        assert_eq!(nested.base_parent_type, Some("user"));
        assert_eq!(nested.item.size, 5);

        let top = factory
            .item_detail(&VirtualId::item("ep-1", "~/a.txt", 5), None)
            .unwrap();
        assert_eq!(top.folder_id, VirtualId::endpoint_root("ep-1").encode());
        assert!(top.creator_id.is_none());
    }

    #[test]
    fn item_files_is_singleton() {
        let factory = factory(MockTransfer::new());
        let id = VirtualId::item("ep-1", "~/data/report.PDF", 9);

        let files = factory.item_files(&id, None).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].item_id, id.encode());
        assert_eq!(files[0].exts, vec!["pdf"]);
        assert_eq!(files[0].size, 9);
    }

    #[test]
    fn folder_details_are_unknown() {
        let factory = factory(MockTransfer::new());
        let details = factory
            .folder_details(&VirtualId::folder("ep-1", "~/data"))
            .unwrap();
        assert_eq!(details, FolderDetails::unknown());
    }

    #[test]
    fn wrong_variant_is_malformed() {
        let factory = factory(MockTransfer::new());

        let error = factory
            .folder_view(&VirtualId::item("ep-1", "~/a", 1))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MalformedIdentifier);

        let error = factory
            .item_detail(&VirtualId::folder("ep-1", "~/a"), None)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MalformedIdentifier);
    }

    #[test]
    fn folder_view_names() {
        let factory = factory(MockTransfer::new());
        let root = factory.folder_view(&VirtualId::endpoint_root("ep-1")).unwrap();
        assert_eq!(root.name, "ep-1");

        let nested = factory
            .folder_view(&VirtualId::folder("ep-1", "~/data/raw"))
            .unwrap();
        assert_eq!(nested.name, "raw");
        assert!(nested.remote);
    }
}
