//! Ordered dispatch of requests through the registered hooks.
//!
//! Hooks are consulted in registration order. The first [`Outcome::Claim`]
//! answers the request and stops dispatch; [`Outcome::Extend`] results
//! are collected and handed back so the caller can append them to the
//! native answer; [`Outcome::Decline`] falls through.

use std::fmt;
use std::sync::Arc;

use tether_core::Result;
use tether_core::download::{Disposition, Download};
use tether_core::hooks::{AuthCompleted, HookContext, Hooks, Outcome, ParentType};
use tether_core::view::{FileView, FolderDetails, FolderView, ItemDetail, ItemView};

/// Tracing target for hook dispatch.
pub const TRACING_TARGET: &str = "tether_server::service::registry";

/// Result of dispatching a request through the hooks.
#[derive(Debug)]
pub enum Dispatch<T> {
    /// A hook owns the request.
    Claimed(T),
    /// No hook owns the request; the values extend the native answer.
    Unclaimed(Vec<T>),
}

impl<T> Dispatch<T> {
    /// Returns the claimed value, discarding extensions.
    pub fn claimed(self) -> Option<T> {
        match self {
            Self::Claimed(value) => Some(value),
            Self::Unclaimed(_) => None,
        }
    }
}

macro_rules! dispatch {
    ($registry:expr, $operation:literal, |$hook:ident| $call:expr) => {{
        let mut extensions = Vec::new();
        for $hook in $registry.hooks.iter() {
            match $call.await? {
                Outcome::Claim(value) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        hook = $hook.name(),
                        operation = $operation,
                        "Hook claimed request"
                    );
                    return Ok(Dispatch::Claimed(value));
                }
                Outcome::Extend(value) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        hook = $hook.name(),
                        operation = $operation,
                        "Hook extended native answer"
                    );
                    extensions.push(value);
                }
                Outcome::Decline => {}
            }
        }
        Ok(Dispatch::Unclaimed(extensions))
    }};
}

/// The hooks registered with the host, in dispatch order.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<Vec<Arc<dyn Hooks>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook after the already registered ones.
    #[must_use]
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Hooks + 'static,
    {
        Arc::make_mut(&mut self.hooks).push(Arc::new(hook));
        self
    }

    /// Names of the registered hooks, in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn list_folder_children(
        &self,
        ctx: &HookContext,
        parent_id: &str,
        parent_type: ParentType,
    ) -> Result<Dispatch<Vec<FolderView>>> {
        dispatch!(self, "list_folder_children", |hook| hook
            .list_folder_children(ctx, parent_id, parent_type))
    }

    pub async fn list_item_children(
        &self,
        ctx: &HookContext,
        folder_id: &str,
    ) -> Result<Dispatch<Vec<ItemView>>> {
        dispatch!(self, "list_item_children", |hook| hook
            .list_item_children(ctx, folder_id))
    }

    pub async fn folder_detail(
        &self,
        ctx: &HookContext,
        id: &str,
    ) -> Result<Dispatch<FolderView>> {
        dispatch!(self, "folder_detail", |hook| hook.folder_detail(ctx, id))
    }

    pub async fn item_detail(&self, ctx: &HookContext, id: &str) -> Result<Dispatch<ItemDetail>> {
        dispatch!(self, "item_detail", |hook| hook.item_detail(ctx, id))
    }

    pub async fn item_files(
        &self,
        ctx: &HookContext,
        id: &str,
    ) -> Result<Dispatch<Vec<FileView>>> {
        dispatch!(self, "item_files", |hook| hook.item_files(ctx, id))
    }

    pub async fn folder_aggregate(
        &self,
        ctx: &HookContext,
        id: &str,
    ) -> Result<Dispatch<FolderDetails>> {
        dispatch!(self, "folder_aggregate", |hook| hook.folder_aggregate(ctx, id))
    }

    pub async fn download(
        &self,
        ctx: &HookContext,
        id: &str,
        disposition: Disposition,
    ) -> Result<Dispatch<Download>> {
        dispatch!(self, "download", |hook| hook.download(ctx, id, disposition))
    }

    pub async fn auth_completed(&self, event: &AuthCompleted) -> Result<Dispatch<()>> {
        dispatch!(self, "auth_completed", |hook| hook.auth_completed(event))
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}
