use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::backend::config::BackendConfig;
use crate::common::path::SHARED_PREFIX;

/// What to do when more than one item shares a name under the same parent.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Take the first result the backend returned.
    #[default]
    First,
    /// Fail the resolution with `Error::Ambiguous`.
    Reject,
}

/// Content URI templates; `{id}` is replaced by the item ID.
#[derive(Debug, Deserialize, Clone)]
pub struct UriTemplates {
    #[serde(default = "default_media_uri")]
    pub media: String,
    #[serde(default = "default_view_uri")]
    pub view: String,
}

impl UriTemplates {
    pub fn media_uri(&self, id: &str) -> String {
        self.media.replace("{id}", id)
    }

    pub fn view_uri(&self, id: &str) -> String {
        self.view.replace("{id}", id)
    }
}

impl Default for UriTemplates {
    fn default() -> Self {
        Self {
            media: default_media_uri(),
            view: default_view_uri(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_shared_prefix")]
    pub shared_prefix: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Hard cap on pages fetched for a single listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub ambiguity: AmbiguityPolicy,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub uris: UriTemplates,
}

impl DriveConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: DriveConfig = toml::from_str(content)?;
        if cfg.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }
        if cfg.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than zero");
        }
        Ok(cfg)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            shared_prefix: default_shared_prefix(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            ambiguity: AmbiguityPolicy::default(),
            backend: BackendConfig::default(),
            uris: UriTemplates::default(),
        }
    }
}

fn default_provider() -> String {
    "google_drive".to_string()
}

fn default_shared_prefix() -> String {
    SHARED_PREFIX.to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> usize {
    1000
}

fn default_media_uri() -> String {
    "https://www.googleapis.com/drive/v3/files/{id}?alt=media".to_string()
}

fn default_view_uri() -> String {
    "https://drive.google.com/open?id={id}".to_string()
}
