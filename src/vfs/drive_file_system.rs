//! Path-based file system over an ID-addressed backend

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    backend::{
        client::{BackendClient, MetaPatch, NewFile},
        store::BackendStore,
    },
    common::{
        config::AmbiguityPolicy,
        path::{context_path, split_file_path, split_shared},
        DriveConfig, Error, Result,
    },
    core::{
        file_record::{Credential, FileRecord, ScopeId},
        file_system::{ByteStream, FileSystem},
        options::{CreateOptions, ListOptions, UpdateOptions},
    },
    resolve::{
        folder::Resolver,
        listing::list_all,
        normalize::Normalizer,
        query::{build_listing, build_shared_listing},
    },
    vfs::sort::sort_files,
};

/// A parsed file path: `(shared, folder segments, file name)`.
type FilePath = (bool, Vec<String>, String);

pub struct DriveFileSystem {
    client: Arc<dyn BackendClient>,
    normalizer: Normalizer,
    shared_prefix: String,
    page_size: u32,
    max_pages: usize,
    ambiguity: AmbiguityPolicy,
}

impl DriveFileSystem {
    pub fn new(client: Arc<dyn BackendClient>, config: &DriveConfig) -> Self {
        Self {
            client,
            normalizer: Normalizer::from_config(config),
            shared_prefix: config.shared_prefix.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            ambiguity: config.ambiguity,
        }
    }

    /// Build the backend named by the configuration
    pub fn from_config(config: &DriveConfig) -> Result<Self> {
        let client = BackendStore::from_config(&config.backend)?;
        Ok(Self::new(client, config))
    }

    fn resolver<'a>(&'a self, credential: &'a Credential) -> Result<Resolver<'a>> {
        if credential.is_empty() {
            return Err(Error::Unauthorized("No access token specified".to_string()));
        }
        Ok(Resolver::new(self.client.as_ref(), credential, self.ambiguity))
    }

    fn parse_file_path(&self, path: &str) -> Result<FilePath> {
        let (folders, name) = split_file_path(path)?;
        let mut full = folders;
        full.push(name);
        let (shared, mut segments) = if full.first().map(String::as_str) == Some(self.shared_prefix.as_str()) {
            full.remove(0);
            (true, full)
        } else {
            (false, full)
        };
        match segments.pop() {
            Some(name) => Ok((shared, segments, name)),
            None => Err(Error::InvalidPath(format!(
                "{} is a folder, not a file",
                path
            ))),
        }
    }

    fn context(&self, shared: bool, folders: &[String]) -> String {
        context_path(shared, folders, &self.shared_prefix)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(Error::InvalidPath(format!("Invalid file name: {:?}", name)));
    }
    Ok(())
}

#[async_trait]
impl FileSystem for DriveFileSystem {
    async fn list(
        &self,
        credential: &Credential,
        folder_path: &str,
        options: &ListOptions,
    ) -> Result<Vec<FileRecord>> {
        let resolver = self.resolver(credential)?;
        let (shared, segments) = split_shared(folder_path, &self.shared_prefix)?;

        let query = if shared && segments.is_empty() {
            build_shared_listing()
        } else {
            let folder = resolver.resolve_folder(&segments, shared, false).await?;
            build_listing(&folder.id)
        };
        let raws = list_all(
            self.client.as_ref(),
            credential,
            &query,
            self.page_size,
            self.max_pages,
        )
        .await?;

        let context = self.context(shared, &segments);
        let export_type = options.export_type.as_deref();
        let records = raws
            .iter()
            .map(|raw| self.normalizer.normalize(raw, &context, export_type))
            .collect();
        let records = sort_files(records, options.filter.as_ref(), options.order.as_ref())?;
        tracing::info!("Listed {} items in {}", records.len(), context);
        Ok(records)
    }

    async fn read(
        &self,
        credential: &Credential,
        file_path: &str,
        export_type: Option<&str>,
    ) -> Result<FileRecord> {
        let resolver = self.resolver(credential)?;
        let (shared, folders, name) = self.parse_file_path(file_path)?;
        let raw = resolver.read_file(&folders, &name, shared).await?;
        Ok(self
            .normalizer
            .normalize(&raw, &self.context(shared, &folders), export_type))
    }

    async fn create(
        &self,
        credential: &Credential,
        file_path: &str,
        content: ByteStream,
        options: &CreateOptions,
    ) -> Result<FileRecord> {
        let resolver = self.resolver(credential)?;
        let (shared, folders, name) = self.parse_file_path(file_path)?;
        if shared && folders.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Cannot create files directly in /{}",
                self.shared_prefix
            )));
        }

        let parent = resolver.assert_file_absent(&folders, &name, shared).await?;
        let mime_type = options
            .mime_type
            .clone()
            .or_else(|| mime_guess::from_path(&name).first_raw().map(str::to_string));
        let meta = NewFile {
            name: name.clone(),
            parent,
            mime_type,
            modified_at: options.last_modified_time,
        };

        let created = self.client.create_file(credential, &meta).await?;
        let mut uploaded = self
            .client
            .upload_content(credential, &created.id, content)
            .await?;

        if let Some(native) = self.normalizer.converters().import_type(&uploaded.mime_type) {
            tracing::warn!(
                "Converting {} from {} to {}",
                file_path,
                uploaded.mime_type,
                native
            );
            let converted = self
                .client
                .copy_and_convert(credential, &uploaded.id)
                .await?;
            self.client.delete_item(credential, &uploaded.id).await?;
            uploaded = converted;
        }

        tracing::info!("Created {} ({})", file_path, uploaded.id);
        Ok(self.normalizer.normalize(
            &uploaded,
            &self.context(shared, &folders),
            options.export_type.as_deref(),
        ))
    }

    async fn update(
        &self,
        credential: &Credential,
        file_path: &str,
        content: Option<ByteStream>,
        options: &UpdateOptions,
    ) -> Result<FileRecord> {
        let resolver = self.resolver(credential)?;
        let (shared, folders, name) = self.parse_file_path(file_path)?;
        if let Some(new_name) = &options.name {
            validate_name(new_name)?;
        }
        let file = resolver.resolve_file(&folders, &name, shared).await?;

        let mut latest = None;
        if let Some(content) = content {
            latest = Some(self.client.upload_content(credential, &file.id, content).await?);
        }

        let mut patch = MetaPatch {
            name: options.name.clone(),
            parent: None,
            modified_at: options.last_modified_time,
        };

        let mut context = self.context(shared, &folders);
        if let Some(new_path) = &options.path {
            let (new_shared, new_segments) = split_shared(new_path, &self.shared_prefix)?;
            let folder = resolver
                .resolve_folder(&new_segments, new_shared, true)
                .await?;
            patch.parent = Some(folder.id);
            context = self.context(new_shared, &new_segments);
        }

        if !patch.is_empty() {
            latest = Some(self.client.patch_meta(credential, &file.id, &patch).await?);
        }

        let raw = match latest {
            Some(raw) => raw,
            None => resolver.read_file(&folders, &name, shared).await?,
        };
        tracing::info!("Updated {} ({})", file_path, raw.id);
        Ok(self
            .normalizer
            .normalize(&raw, &context, options.export_type.as_deref()))
    }

    async fn delete(&self, credential: &Credential, path: &str, is_file: bool) -> Result<()> {
        let resolver = self.resolver(credential)?;
        let id = if is_file {
            let (shared, folders, name) = self.parse_file_path(path)?;
            resolver.resolve_file(&folders, &name, shared).await?.id
        } else {
            let (shared, segments) = split_shared(path, &self.shared_prefix)?;
            if segments.is_empty() {
                return Err(Error::InvalidPath(format!("Cannot delete {}", path)));
            }
            resolver.resolve_folder(&segments, shared, false).await?.id
        };
        self.client.delete_item(credential, &id).await?;
        tracing::info!("Deleted {} ({})", path, id);
        Ok(())
    }

    async fn mkdir(&self, credential: &Credential, folder_path: &str) -> Result<ScopeId> {
        let resolver = self.resolver(credential)?;
        let (shared, segments) = split_shared(folder_path, &self.shared_prefix)?;
        if shared && segments.is_empty() {
            return Err(Error::InvalidPath(format!(
                "/{} is a virtual folder",
                self.shared_prefix
            )));
        }
        let folder = resolver.resolve_folder(&segments, shared, true).await?;
        Ok(folder.id)
    }
}
