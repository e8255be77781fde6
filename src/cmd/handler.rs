use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;

use crate::{
    cmd::fs_command::FsCommands,
    common::Error,
    core::{
        file_record::Credential,
        file_system::{ByteStream, FileSystem},
        options::{Comparison, CreateOptions, Direction, ListOptions, SortOrder, UpdateOptions},
    },
};

pub async fn handle_fs_command(
    command: FsCommands,
    fs: &dyn FileSystem,
    credential: &Credential,
) -> anyhow::Result<()> {
    match command {
        FsCommands::Ls {
            path,
            export_type,
            filter,
            sort,
        } => {
            let options = ListOptions {
                export_type,
                filter: filter.as_deref().map(parse_filter).transpose()?,
                order: sort.as_deref().map(parse_sort).transpose()?,
            };
            let records = fs.list(credential, &path, &options).await?;
            print_json(&records)?;
        }
        FsCommands::Read { path, export_type } => {
            let record = fs.read(credential, &path, export_type.as_deref()).await?;
            print_json(&record)?;
        }
        FsCommands::Create {
            local_path,
            remote_path,
            mime_type,
            modified,
        } => {
            let content = read_local(&local_path).await?;
            let options = CreateOptions {
                mime_type,
                last_modified_time: modified.as_deref().map(parse_time).transpose()?,
                export_type: None,
            };
            let record = fs.create(credential, &remote_path, content, &options).await?;
            print_json(&record)?;
        }
        FsCommands::Update {
            path,
            content,
            name,
            move_to,
            modified,
        } => {
            let content = match content {
                Some(local_path) => Some(read_local(&local_path).await?),
                None => None,
            };
            let options = UpdateOptions {
                name,
                path: move_to,
                last_modified_time: modified.as_deref().map(parse_time).transpose()?,
                export_type: None,
            };
            if content.is_none() && options.is_empty() {
                anyhow::bail!("Nothing to update: pass --content, --name, --move-to or --modified");
            }
            let record = fs.update(credential, &path, content, &options).await?;
            print_json(&record)?;
        }
        FsCommands::Rm { path, folder } => {
            fs.delete(credential, &path, !folder).await?;
            println!("Deleted {}", path);
        }
        FsCommands::Mkdir { path } => {
            let id = fs.mkdir(credential, &path).await?;
            println!("{}", id);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn read_local(path: &str) -> anyhow::Result<ByteStream> {
    let data = tokio::fs::read(path).await?;
    tracing::debug!("Read {} bytes from {}", data.len(), path);
    Ok(futures::stream::once(async move { Ok::<_, Error>(Bytes::from(data)) }).boxed())
}

fn parse_time(value: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Parse `FIELD:OP:VALUE`; the value may itself contain colons.
pub fn parse_filter(input: &str) -> anyhow::Result<Comparison> {
    let mut parts = input.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(operator), Some(value)) => Ok(Comparison {
            field: field.parse()?,
            operator: operator.parse()?,
            value: value.to_string(),
        }),
        _ => anyhow::bail!("Invalid filter format: {}. Expected FIELD:OP:VALUE", input),
    }
}

/// Parse `FIELD` or `FIELD:asc|desc`.
pub fn parse_sort(input: &str) -> anyhow::Result<SortOrder> {
    let (field, direction) = match input.split_once(':') {
        Some((field, direction)) => (field, direction.parse::<Direction>()?),
        None => (input, Direction::default()),
    };
    Ok(SortOrder {
        field: field.parse()?,
        direction,
    })
}
