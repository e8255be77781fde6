//! Per-operation options accepted by the `FileSystem` trait.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::common::{Error, Result};

/// Record field usable for filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Kind,
    MimeType,
    Size,
    CreatedAtTime,
    LastModifiedTime,
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(RecordField::Name),
            "kind" => Ok(RecordField::Kind),
            "mimeType" => Ok(RecordField::MimeType),
            "size" => Ok(RecordField::Size),
            "createdAtTime" => Ok(RecordField::CreatedAtTime),
            "lastModifiedTime" => Ok(RecordField::LastModifiedTime),
            other => Err(Error::InvalidArgument(format!("Unknown field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            other => Err(Error::InvalidArgument(format!("Unknown operator: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(Error::InvalidArgument(format!("Unknown direction: {}", other))),
        }
    }
}

/// Keep only records whose `field` compares to `value` under `operator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: RecordField,
    pub operator: CompareOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortOrder {
    pub field: RecordField,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub export_type: Option<String>,
    pub filter: Option<Comparison>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Native mime type of the upload; guessed from the name when absent.
    pub mime_type: Option<String>,
    pub last_modified_time: Option<DateTime<Utc>>,
    pub export_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// New file name.
    pub name: Option<String>,
    /// New parent folder path; missing folders are created.
    pub path: Option<String>,
    pub last_modified_time: Option<DateTime<Utc>>,
    pub export_type: Option<String>,
}

impl UpdateOptions {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.path.is_none() && self.last_modified_time.is_none()
    }
}
