//! Backend record to provider-agnostic file record.

use crate::common::{config::UriTemplates, DriveConfig};
use crate::core::file_record::{FileKind, FileRecord, RawRecord};
use crate::resolve::mime::ConverterTable;

/// Export type requesting the direct binary content URI.
pub const EXPORT_MEDIA: &str = "media";
/// Export type requesting the interactive-open URI.
pub const EXPORT_VIEW: &str = "view";

#[derive(Debug, Clone)]
pub struct Normalizer {
    provider: String,
    uris: UriTemplates,
    converters: ConverterTable,
}

impl Normalizer {
    pub fn new(provider: impl Into<String>, uris: UriTemplates, converters: ConverterTable) -> Self {
        Self {
            provider: provider.into(),
            uris,
            converters,
        }
    }

    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(
            config.provider.clone(),
            config.uris.clone(),
            ConverterTable::default(),
        )
    }

    pub fn converters(&self) -> &ConverterTable {
        &self.converters
    }

    /// Pick the content URI for a record.
    ///
    /// `media` only yields the direct URI for records without a converter;
    /// convertible records fall through to their export links.
    pub fn content_uri(&self, raw: &RawRecord, export_type: Option<&str>) -> Option<String> {
        let default_export = self.converters.export_type(&raw.mime_type);
        match (export_type, default_export) {
            (Some(EXPORT_MEDIA), None) => Some(self.uris.media_uri(raw.id.as_str())),
            (Some(EXPORT_VIEW), _) => Some(self.uris.view_uri(raw.id.as_str())),
            (requested, Some(default_export)) => requested
                .and_then(|key| raw.export_links.get(key))
                .or_else(|| raw.export_links.get(default_export))
                .cloned(),
            (_, None) => raw.download_uri.clone(),
        }
    }

    /// Normalize `raw`, which lives in the virtual folder `context_path`.
    ///
    /// The record name is appended as one segment, even if it contains `/`.
    pub fn normalize(
        &self,
        raw: &RawRecord,
        context_path: &str,
        export_type: Option<&str>,
    ) -> FileRecord {
        FileRecord {
            name: raw.name.clone(),
            kind: if raw.is_folder() {
                FileKind::Folder
            } else {
                FileKind::File
            },
            provider: self.provider.clone(),
            path: format!("{}/{}", context_path.trim_end_matches('/'), raw.name),
            mime_type: raw.mime_type.clone(),
            size: raw.size,
            created_at_time: raw.created_at,
            last_modified_time: raw.modified_at,
            content_uri: self.content_uri(raw, export_type),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&DriveConfig::default())
    }
}
