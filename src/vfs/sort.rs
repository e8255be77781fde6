//! Filtering and ordering of normalized listings.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::common::{Error, Result};
use crate::core::{
    file_record::FileRecord,
    options::{CompareOp, Comparison, Direction, RecordField, SortOrder},
};

fn compare_field(a: &FileRecord, b: &FileRecord, field: RecordField) -> Ordering {
    match field {
        RecordField::Name => a.name.cmp(&b.name),
        RecordField::Kind => a.kind.as_str().cmp(b.kind.as_str()),
        RecordField::MimeType => a.mime_type.cmp(&b.mime_type),
        RecordField::Size => a.size.cmp(&b.size),
        RecordField::CreatedAtTime => a.created_at_time.cmp(&b.created_at_time),
        RecordField::LastModifiedTime => a.last_modified_time.cmp(&b.last_modified_time),
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidArgument(format!("Invalid timestamp '{}': {}", value, e)))
}

/// How `record` compares to the filter value; `None` if the record has no
/// value for the field.
fn compare_value(record: &FileRecord, field: RecordField, value: &str) -> Result<Option<Ordering>> {
    let ordering = match field {
        RecordField::Name => Some(record.name.as_str().cmp(value)),
        RecordField::Kind => Some(record.kind.as_str().cmp(value)),
        RecordField::MimeType => Some(record.mime_type.as_str().cmp(value)),
        RecordField::Size => {
            let wanted = value
                .parse::<u64>()
                .map_err(|_| Error::InvalidArgument(format!("Invalid size '{}'", value)))?;
            record.size.map(|size| size.cmp(&wanted))
        }
        RecordField::CreatedAtTime => {
            let wanted = parse_time(value)?;
            record.created_at_time.map(|t| t.cmp(&wanted))
        }
        RecordField::LastModifiedTime => {
            let wanted = parse_time(value)?;
            record.last_modified_time.map(|t| t.cmp(&wanted))
        }
    };
    Ok(ordering)
}

fn satisfies(ordering: Ordering, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

/// Keep the records matching `filter`, then stable-sort them by `order`.
pub fn sort_files(
    records: Vec<FileRecord>,
    filter: Option<&Comparison>,
    order: Option<&SortOrder>,
) -> Result<Vec<FileRecord>> {
    let mut records = match filter {
        Some(cmp) => {
            let mut kept = Vec::with_capacity(records.len());
            for record in records {
                if let Some(ordering) = compare_value(&record, cmp.field, &cmp.value)? {
                    if satisfies(ordering, cmp.operator) {
                        kept.push(record);
                    }
                }
            }
            kept
        }
        None => records,
    };

    if let Some(order) = order {
        records.sort_by(|a, b| {
            let ordering = compare_field(a, b, order.field);
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
    }
    Ok(records)
}
