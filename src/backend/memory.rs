//! Simple in-memory ID-addressed backend for testing and development

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    backend::client::{BackendClient, MetaPatch, NewFile, Page},
    common::{Error, Result},
    core::{
        file_record::{Credential, RawRecord, ScopeId, FOLDER_MIME_TYPE},
        file_system::ByteStream,
    },
    resolve::{mime::ConverterTable, query::Query},
};

/// Parent of items explicitly shared with the caller; not reachable from root.
const FOREIGN_ROOT: &str = "foreign-root";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
struct Node {
    record: RawRecord,
    parents: Vec<ScopeId>,
    shared_with_me: bool,
    trashed: bool,
    content: Bytes,
}

#[derive(Debug, Default)]
struct CallCounters {
    query: AtomicUsize,
    create_folder: AtomicUsize,
    create_file: AtomicUsize,
    upload_content: AtomicUsize,
    patch_meta: AtomicUsize,
    delete_item: AtomicUsize,
    copy_and_convert: AtomicUsize,
}

/// Snapshot of how many times each backend call was made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub query: usize,
    pub create_folder: usize,
    pub create_file: usize,
    pub upload_content: usize,
    pub patch_meta: usize,
    pub delete_item: usize,
    pub copy_and_convert: usize,
}

/// In-memory backend
///
/// Items keep insertion order, so "first result" is deterministic. Page
/// tokens are stringified offsets.
pub struct MemoryBackend {
    nodes: Arc<RwLock<Vec<Node>>>,
    folder_creations: Arc<RwLock<Vec<(String, ScopeId)>>>,
    calls: CallCounters,
    required_token: Option<String>,
    converters: ConverterTable,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(RwLock::new(Vec::new())),
            folder_creations: Arc::new(RwLock::new(Vec::new())),
            calls: CallCounters::default(),
            required_token: None,
            converters: ConverterTable::default(),
        }
    }

    /// Reject every credential except `token`.
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.calls;
        CallCounts {
            query: c.query.load(Ordering::SeqCst),
            create_folder: c.create_folder.load(Ordering::SeqCst),
            create_file: c.create_file.load(Ordering::SeqCst),
            upload_content: c.upload_content.load(Ordering::SeqCst),
            patch_meta: c.patch_meta.load(Ordering::SeqCst),
            delete_item: c.delete_item.load(Ordering::SeqCst),
            copy_and_convert: c.copy_and_convert.load(Ordering::SeqCst),
        }
    }

    /// `(name, parent)` of every folder created through `create_folder`.
    pub async fn folder_creations(&self) -> Vec<(String, ScopeId)> {
        self.folder_creations.read().await.clone()
    }

    /// Seed a folder. Shared folders hang off a foreign root.
    pub async fn insert_folder(&self, name: &str, parent: &ScopeId, shared: bool) -> ScopeId {
        let record = self.new_record(name, FOLDER_MIME_TYPE);
        self.insert_node(record, parent, shared, Bytes::new()).await
    }

    /// Seed a file with content.
    pub async fn insert_file(
        &self,
        name: &str,
        parent: &ScopeId,
        mime_type: &str,
        content: &[u8],
        shared: bool,
    ) -> ScopeId {
        let mut record = self.new_record(name, mime_type);
        record.size = Some(content.len() as u64);
        self.insert_node(record, parent, shared, Bytes::copy_from_slice(content))
            .await
    }

    /// Seed an arbitrary record; its ID is kept as given.
    pub async fn insert_record(&self, record: RawRecord, parent: &ScopeId, shared: bool) -> ScopeId {
        self.insert_node(record, parent, shared, Bytes::new()).await
    }

    /// Move an item to the trash; trashed items never match a query.
    pub async fn trash(&self, id: &ScopeId) {
        let mut nodes = self.nodes.write().await;
        for node in nodes.iter_mut().filter(|n| &n.record.id == id) {
            node.trashed = true;
        }
    }

    /// Current record for an ID, trashed or not.
    pub async fn get(&self, id: &ScopeId) -> Option<RawRecord> {
        let nodes = self.nodes.read().await;
        nodes.iter().find(|n| &n.record.id == id).map(|n| n.record.clone())
    }

    pub async fn parents_of(&self, id: &ScopeId) -> Vec<ScopeId> {
        let nodes = self.nodes.read().await;
        nodes
            .iter()
            .find(|n| &n.record.id == id)
            .map(|n| n.parents.clone())
            .unwrap_or_default()
    }

    pub async fn content_of(&self, id: &ScopeId) -> Option<Bytes> {
        let nodes = self.nodes.read().await;
        nodes.iter().find(|n| &n.record.id == id).map(|n| n.content.clone())
    }

    /// Number of live (non-trashed) items.
    pub async fn len(&self) -> usize {
        let nodes = self.nodes.read().await;
        nodes.iter().filter(|n| !n.trashed).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn new_record(&self, name: &str, mime_type: &str) -> RawRecord {
        let id = ScopeId::new(Uuid::new_v4().to_string());
        let now = Utc::now();
        let mut record = RawRecord {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: None,
            created_at: Some(now),
            modified_at: Some(now),
            download_uri: None,
            export_links: HashMap::new(),
        };
        self.fill_links(&mut record);
        record
    }

    /// Folders get no links, native documents get export links, everything
    /// else a download link.
    fn fill_links(&self, record: &mut RawRecord) {
        record.download_uri = None;
        record.export_links.clear();
        if record.is_folder() {
            return;
        }
        match self.converters.export_type(&record.mime_type) {
            Some(export) => {
                for target in [export, "application/pdf"] {
                    record.export_links.insert(
                        target.to_string(),
                        format!("memory://export/{}?mimeType={}", record.id, target),
                    );
                }
            }
            None => {
                record.download_uri = Some(format!("memory://download/{}", record.id));
            }
        }
    }

    async fn insert_node(
        &self,
        record: RawRecord,
        parent: &ScopeId,
        shared: bool,
        content: Bytes,
    ) -> ScopeId {
        let id = record.id.clone();
        let parent = if shared {
            ScopeId::new(FOREIGN_ROOT)
        } else {
            parent.clone()
        };
        let mut nodes = self.nodes.write().await;
        nodes.push(Node {
            record,
            parents: vec![parent],
            shared_with_me: shared,
            trashed: false,
            content,
        });
        id
    }

    fn authorize(&self, credential: &Credential) -> Result<()> {
        if credential.is_empty() {
            return Err(Error::Unauthorized("No access token specified".to_string()));
        }
        match &self.required_token {
            Some(token) if credential.authorization() != Credential::new(token.as_str()).authorization() => {
                Err(Error::Unauthorized("Invalid access token".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn matches(node: &Node, query: &Query) -> bool {
        let filter = &query.filter;
        if node.trashed {
            return false;
        }
        if filter.shared_with_me {
            if !node.shared_with_me {
                return false;
            }
        } else if let Some(parent) = &filter.parent {
            if !node.parents.contains(parent) {
                return false;
            }
        }
        if let Some(name) = &filter.name {
            if &node.record.name != name {
                return false;
            }
        }
        if filter.folders_only && !node.record.is_folder() {
            return false;
        }
        true
    }

    async fn update_node<F>(&self, id: &ScopeId, f: F) -> Result<RawRecord>
    where
        F: FnOnce(&mut Node),
    {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .iter_mut()
            .find(|n| &n.record.id == id && !n.trashed)
            .ok_or_else(|| Error::NotFound(format!("No item with ID {}", id)))?;
        f(node);
        Ok(node.record.clone())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendClient for MemoryBackend {
    async fn query(
        &self,
        credential: &Credential,
        query: &Query,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<Page> {
        self.calls.query.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::Upstream(format!("Invalid page token: {}", token)))?,
            None => 0,
        };
        let nodes = self.nodes.read().await;
        let matching: Vec<RawRecord> = nodes
            .iter()
            .filter(|n| Self::matches(n, query))
            .map(|n| n.record.clone())
            .collect();
        let limit = page_size.map(|s| s as usize).unwrap_or(matching.len()).max(1);
        let items: Vec<RawRecord> = matching.iter().skip(offset).take(limit).cloned().collect();
        let next = offset + items.len();
        let next_page_token = if next < matching.len() {
            Some(next.to_string())
        } else {
            None
        };
        Ok(Page {
            items,
            next_page_token,
        })
    }

    async fn create_folder(
        &self,
        credential: &Credential,
        name: &str,
        parent: &ScopeId,
    ) -> Result<Option<ScopeId>> {
        self.calls.create_folder.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let id = self.insert_folder(name, parent, false).await;
        self.folder_creations
            .write()
            .await
            .push((name.to_string(), parent.clone()));
        Ok(Some(id))
    }

    async fn create_file(&self, credential: &Credential, meta: &NewFile) -> Result<RawRecord> {
        self.calls.create_file.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let mime = meta.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
        let mut record = self.new_record(&meta.name, mime);
        record.size = Some(0);
        if let Some(modified) = meta.modified_at {
            record.modified_at = Some(modified);
        }
        let id = self
            .insert_node(record, &meta.parent, false, Bytes::new())
            .await;
        self.get(&id)
            .await
            .ok_or_else(|| Error::Internal(format!("Created item {} vanished", id)))
    }

    async fn upload_content(
        &self,
        credential: &Credential,
        id: &ScopeId,
        mut content: ByteStream,
    ) -> Result<RawRecord> {
        self.calls.upload_content.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let mut buf = BytesMut::new();
        while let Some(chunk) = content.next().await {
            buf.extend_from_slice(&chunk?);
        }
        let data = buf.freeze();
        self.update_node(id, |node| {
            node.record.size = Some(data.len() as u64);
            node.record.modified_at = Some(Utc::now());
            node.content = data;
        })
        .await
    }

    async fn patch_meta(
        &self,
        credential: &Credential,
        id: &ScopeId,
        patch: &MetaPatch,
    ) -> Result<RawRecord> {
        self.calls.patch_meta.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        self.update_node(id, |node| {
            if let Some(name) = &patch.name {
                node.record.name = name.clone();
            }
            if let Some(parent) = &patch.parent {
                node.parents = vec![parent.clone()];
            }
            node.record.modified_at = Some(patch.modified_at.unwrap_or_else(Utc::now));
        })
        .await
    }

    async fn delete_item(&self, credential: &Credential, id: &ScopeId) -> Result<()> {
        self.calls.delete_item.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let mut nodes = self.nodes.write().await;
        let before = nodes.len();
        nodes.retain(|n| &n.record.id != id);
        if nodes.len() == before {
            return Err(Error::NotFound(format!("No item with ID {}", id)));
        }
        Ok(())
    }

    async fn copy_and_convert(&self, credential: &Credential, id: &ScopeId) -> Result<RawRecord> {
        self.calls.copy_and_convert.fetch_add(1, Ordering::SeqCst);
        self.authorize(credential)?;
        let source = {
            let nodes = self.nodes.read().await;
            nodes
                .iter()
                .find(|n| &n.record.id == id && !n.trashed)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("No item with ID {}", id)))?
        };
        let native = self
            .converters
            .import_type(&source.record.mime_type)
            .unwrap_or(source.record.mime_type.as_str())
            .to_string();
        let mut record = self.new_record(&source.record.name, &native);
        if record.mime_type == source.record.mime_type {
            record.size = source.record.size;
        }
        let copy_id = record.id.clone();
        let mut nodes = self.nodes.write().await;
        nodes.push(Node {
            record: record.clone(),
            parents: source.parents.clone(),
            shared_with_me: source.shared_with_me,
            trashed: false,
            content: source.content.clone(),
        });
        tracing::debug!("Converted {} into {} ({})", id, copy_id, native);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_record::FileKind;
    use crate::resolve::query::{build_listing, build_query, build_shared_listing};

    fn cred() -> Credential {
        Credential::new("token")
    }

    #[tokio::test]
    async fn test_query_by_parent_and_name() {
        let backend = MemoryBackend::new();
        let docs = backend.insert_folder("docs", &ScopeId::root(), false).await;
        backend
            .insert_file("a.txt", &docs, "text/plain", b"abc", false)
            .await;

        let q = build_query(FileKind::Folder, "docs", &ScopeId::root(), false);
        let page = backend.query(&cred(), &q, None, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, docs);

        let q = build_query(FileKind::Folder, "a.txt", &docs, false);
        let page = backend.query(&cred(), &q, None, None).await.unwrap();
        assert!(page.items.is_empty(), "files never match folder lookups");
    }

    #[tokio::test]
    async fn test_shared_items_are_not_under_root() {
        let backend = MemoryBackend::new();
        backend.insert_folder("team", &ScopeId::root(), true).await;

        let q = build_listing(&ScopeId::root());
        assert!(backend.query(&cred(), &q, None, None).await.unwrap().items.is_empty());

        let q = build_shared_listing();
        assert_eq!(backend.query(&cred(), &q, None, None).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_pagination_tokens() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend
                .insert_file(&format!("f{}", i), &ScopeId::root(), "text/plain", b"", false)
                .await;
        }
        let q = build_listing(&ScopeId::root());
        let first = backend.query(&cred(), &q, Some(2), None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("2"));
        let last = backend.query(&cred(), &q, Some(2), Some("4")).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_trashed_items_never_match() {
        let backend = MemoryBackend::new();
        let id = backend.insert_folder("old", &ScopeId::root(), false).await;
        backend.trash(&id).await;
        let q = build_query(FileKind::Folder, "old", &ScopeId::root(), false);
        assert!(backend.query(&cred(), &q, None, None).await.unwrap().items.is_empty());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_required_token() {
        let backend = MemoryBackend::new().with_required_token("good");
        let q = build_listing(&ScopeId::root());
        let err = backend
            .query(&Credential::new("bad"), &q, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(backend
            .query(&Credential::new("Bearer good"), &q, None, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_copy_and_convert_office_document() {
        let backend = MemoryBackend::new();
        let id = backend
            .insert_file(
                "report.docx",
                &ScopeId::root(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                b"PK",
                false,
            )
            .await;
        let copy = backend.copy_and_convert(&cred(), &id).await.unwrap();
        assert_eq!(copy.mime_type, "application/vnd.google-apps.document");
        assert_eq!(copy.size, None);
        assert!(copy.download_uri.is_none());
        assert!(copy.export_links.contains_key("application/pdf"));
        assert_eq!(backend.parents_of(&copy.id).await, vec![ScopeId::root()]);
    }
}
