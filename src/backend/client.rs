//! Backend client seam
//!
//! Every call is authenticated with the credential passed to it; clients
//! hold no per-caller state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    common::Result,
    core::{
        file_record::{Credential, RawRecord, ScopeId},
        file_system::ByteStream,
    },
    resolve::query::Query,
};

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<RawRecord>,
    pub next_page_token: Option<String>,
}

/// Metadata for a file about to be uploaded.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub parent: ScopeId,
    pub mime_type: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Metadata changes; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MetaPatch {
    pub name: Option<String>,
    /// Replaces the item's parents with this single folder.
    pub parent: Option<ScopeId>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl MetaPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent.is_none() && self.modified_at.is_none()
    }
}

/// Trait for ID-addressed backend operations
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Run a filter query and return one page of results
    async fn query(
        &self,
        credential: &Credential,
        query: &Query,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<Page>;

    /// Create a folder; `None` when the backend acknowledged without an ID
    async fn create_folder(
        &self,
        credential: &Credential,
        name: &str,
        parent: &ScopeId,
    ) -> Result<Option<ScopeId>>;

    /// Create an empty file from metadata
    async fn create_file(&self, credential: &Credential, meta: &NewFile) -> Result<RawRecord>;

    /// Replace an item's content
    async fn upload_content(
        &self,
        credential: &Credential,
        id: &ScopeId,
        content: ByteStream,
    ) -> Result<RawRecord>;

    /// Patch an item's metadata
    async fn patch_meta(
        &self,
        credential: &Credential,
        id: &ScopeId,
        patch: &MetaPatch,
    ) -> Result<RawRecord>;

    /// Delete an item
    async fn delete_item(&self, credential: &Credential, id: &ScopeId) -> Result<()>;

    /// Copy an item into the backend's native document format
    async fn copy_and_convert(&self, credential: &Credential, id: &ScopeId) -> Result<RawRecord>;
}
