//! Path-based file operations
//!
//! This module provides the uniform, path-addressed surface that sits on top
//! of an ID-addressed backend:
//! - list: List a folder
//! - read: Get one file record
//! - create: Upload a new file, creating missing parent folders
//! - update: Replace content, rename, move or touch a file
//! - delete: Remove a file or folder
//! - mkdir: Resolve a folder path, creating missing segments

use crate::common::Result;
use crate::core::file_record::{Credential, FileRecord, ScopeId};
use crate::core::options::{CreateOptions, ListOptions, UpdateOptions};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Upload payload.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Trait for path-based filesystem operations
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// List the contents of a folder
    async fn list(
        &self,
        credential: &Credential,
        folder_path: &str,
        options: &ListOptions,
    ) -> Result<Vec<FileRecord>>;

    /// Read one file's record
    async fn read(
        &self,
        credential: &Credential,
        file_path: &str,
        export_type: Option<&str>,
    ) -> Result<FileRecord>;

    /// Create a file; fails if one already exists at the path
    async fn create(
        &self,
        credential: &Credential,
        file_path: &str,
        content: ByteStream,
        options: &CreateOptions,
    ) -> Result<FileRecord>;

    /// Update an existing file's content and/or metadata
    async fn update(
        &self,
        credential: &Credential,
        file_path: &str,
        content: Option<ByteStream>,
        options: &UpdateOptions,
    ) -> Result<FileRecord>;

    /// Delete a file (`is_file`) or a folder
    async fn delete(&self, credential: &Credential, path: &str, is_file: bool) -> Result<()>;

    /// Create a folder chain, returning the deepest folder's ID
    async fn mkdir(&self, credential: &Credential, folder_path: &str) -> Result<ScopeId>;
}
