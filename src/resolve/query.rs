//! Backend lookup queries.

use std::fmt;

use crate::core::file_record::{FileKind, ScopeId, FOLDER_MIME_TYPE};

/// Field projection requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    /// ID and name only; enough for path resolution.
    Identity,
    /// Metadata for a listing page, including the continuation token.
    Listing,
    /// Metadata for a single read.
    Full,
}

impl Fields {
    pub fn projection(&self) -> &'static str {
        match self {
            Fields::Identity => "items(id, title)",
            Fields::Listing => "nextPageToken, items(id, title, mimeType, fileSize, createdDate, modifiedDate, webContentLink, exportLinks)",
            Fields::Full => "items(id, title, mimeType, fileSize, createdDate, modifiedDate, webContentLink, exportLinks)",
        }
    }
}

/// Structured filter. `Display` renders it in the backend filter language;
/// non-trashed items are always implied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    /// Containing parent. Ignored when `shared_with_me` is set.
    pub parent: Option<ScopeId>,
    pub name: Option<String>,
    pub folders_only: bool,
    pub shared_with_me: bool,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses = Vec::new();
        if !self.shared_with_me {
            if let Some(parent) = &self.parent {
                clauses.push(format!("'{}' in parents", escape_literal(parent.as_str())));
            }
        }
        if let Some(name) = &self.name {
            clauses.push(format!("title = '{}'", escape_literal(name)));
        }
        if self.folders_only {
            clauses.push(format!("mimeType = '{}'", FOLDER_MIME_TYPE));
        }
        clauses.push("trashed = false".to_string());
        if self.shared_with_me {
            clauses.push("sharedWithMe = true".to_string());
        }
        f.write_str(&clauses.join(" and "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    pub fields: Fields,
}

impl Query {
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Rendered filter string.
    pub fn q(&self) -> String {
        self.filter.to_string()
    }
}

/// Escape a string literal for interpolation into a filter.
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Lookup of one named item under `parent`, or in the flat shared view.
pub fn build_query(kind: FileKind, name: &str, parent: &ScopeId, shared: bool) -> Query {
    Query {
        filter: Filter {
            parent: if shared { None } else { Some(parent.clone()) },
            name: Some(name.to_string()),
            folders_only: kind == FileKind::Folder,
            shared_with_me: shared,
        },
        fields: Fields::Identity,
    }
}

/// All children of `parent`.
pub fn build_listing(parent: &ScopeId) -> Query {
    Query {
        filter: Filter {
            parent: Some(parent.clone()),
            ..Filter::default()
        },
        fields: Fields::Listing,
    }
}

/// Everything explicitly shared with the caller.
pub fn build_shared_listing() -> Query {
    Query {
        filter: Filter {
            shared_with_me: true,
            ..Filter::default()
        },
        fields: Fields::Listing,
    }
}
