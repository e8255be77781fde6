use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Backend ID of the top-level container.
pub const ROOT_ID: &str = "root";

/// Native mime type the backend reserves for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Opaque backend identifier for a folder or an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied credential, bound for the lifetime of one operation.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Authorization header value; bare tokens are sent as bearer tokens.
    pub fn authorization(&self) -> String {
        let token = self.0.trim();
        if token.contains(' ') {
            token.to_string()
        } else {
            format!("Bearer {}", token)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// One file or folder as the backend describes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: ScopeId,
    pub name: String,
    pub mime_type: String,
    /// Absent for virtual documents, which have no stored bytes.
    pub size: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Plain web download link.
    pub download_uri: Option<String>,
    /// Export links keyed by target mime type.
    pub export_links: HashMap<String, String>,
}

impl RawRecord {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Folder => "folder",
        }
    }
}

/// Provider-agnostic file record returned at the operation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub kind: FileKind,
    pub provider: String,
    /// Fully-qualified virtual path, `/Shared`-prefixed iff reached through
    /// the shared namespace.
    pub path: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub created_at_time: Option<DateTime<Utc>>,
    pub last_modified_time: Option<DateTime<Utc>>,
    #[serde(rename = "contentURI")]
    pub content_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_id_root() {
        assert!(ScopeId::root().is_root());
        assert!(!ScopeId::new("abc").is_root());
        assert_eq!(ScopeId::new("abc").to_string(), "abc");
    }

    #[test]
    fn test_credential_authorization() {
        assert_eq!(Credential::new("tok").authorization(), "Bearer tok");
        assert_eq!(Credential::new("Bearer tok").authorization(), "Bearer tok");
        assert!(Credential::new("  ").is_empty());
        assert_eq!(format!("{:?}", Credential::new("secret")), "Credential(<redacted>)");
    }

    #[test]
    fn test_file_record_wire_names() {
        let record = FileRecord {
            name: "a.txt".to_string(),
            kind: FileKind::File,
            provider: "google_drive".to_string(),
            path: "/a.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: Some(3),
            created_at_time: None,
            last_modified_time: None,
            content_uri: Some("https://x".to_string()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["mimeType"], "text/plain");
        assert_eq!(json["contentURI"], "https://x");
        assert!(json.get("lastModifiedTime").is_some());
    }
}
