//! Drive v2 REST client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Body, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::{
    backend::client::{BackendClient, MetaPatch, NewFile, Page},
    common::{Error, Result},
    core::{
        file_record::{Credential, RawRecord, ScopeId, FOLDER_MIME_TYPE},
        file_system::ByteStream,
    },
    resolve::query::Query,
};

/// Longest response body excerpt carried in an upstream error.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    mime_type: String,
    file_size: Option<String>,
    created_date: Option<DateTime<Utc>>,
    modified_date: Option<DateTime<Utc>>,
    web_content_link: Option<String>,
    #[serde(default)]
    export_links: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    items: Vec<DriveFile>,
    next_page_token: Option<String>,
}

impl TryFrom<DriveFile> for RawRecord {
    type Error = Error;

    fn try_from(file: DriveFile) -> Result<Self> {
        let id = file
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Upstream(format!("Item {} has no ID", file.title)))?;
        let size = match file.file_size {
            Some(s) => Some(s.parse::<u64>().map_err(|e| {
                Error::Serialization(format!("Invalid fileSize '{}' for {}: {}", s, id, e))
            })?),
            None => None,
        };
        Ok(RawRecord {
            id: ScopeId::new(id),
            name: file.title,
            mime_type: file.mime_type,
            size,
            created_at: file.created_date,
            modified_at: file.modified_date,
            download_uri: file.web_content_link,
            export_links: file.export_links,
        })
    }
}

pub struct DriveClient {
    client: reqwest::Client,
    api_base: String,
}

impl DriveClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, api_base))
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn files_url(&self, id: &ScopeId) -> String {
        self.url(&format!("/drive/v2/files/{}", id))
    }

    async fn send(&self, request: RequestBuilder, credential: &Credential, what: &str) -> Result<Response> {
        let response = request
            .header(AUTHORIZATION, credential.authorization())
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to {}: {}", what, e)))?;
        check_status(response, what).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: &Credential,
        what: &str,
    ) -> Result<T> {
        let response = self.send(request, credential, what).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to read response to {}: {}", what, e)))?;
        if body.is_empty() {
            return Err(Error::Upstream(format!("Empty response to {}", what)));
        }
        serde_json::from_slice(&body)
            .map_err(|e| Error::Serialization(format!("Invalid response to {}: {}", what, e)))
    }

    async fn send_record(
        &self,
        request: RequestBuilder,
        credential: &Credential,
        what: &str,
    ) -> Result<RawRecord> {
        let file: DriveFile = self.send_json(request, credential, what).await?;
        RawRecord::try_from(file)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    tracing::debug!("Backend rejected request to {}: {} {}", what, status, excerpt);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized(format!(
            "Backend rejected credential while trying to {}",
            what
        ))),
        StatusCode::NOT_FOUND => Err(Error::NotFound(format!("Backend could not {}", what))),
        _ => Err(Error::Upstream(format!(
            "Failed to {}: {} {}",
            what, status, excerpt
        ))),
    }
}

#[async_trait]
impl BackendClient for DriveClient {
    async fn query(
        &self,
        credential: &Credential,
        query: &Query,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<Page> {
        let q = query.q();
        tracing::debug!("Drive query: q={} page_token={:?}", q, page_token);
        let mut params: Vec<(&str, String)> = vec![
            ("q", q),
            ("fields", query.fields.projection().to_string()),
        ];
        if let Some(size) = page_size {
            params.push(("maxResults", size.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let request = self.client.get(self.url("/drive/v2/files")).query(&params);
        let list: DriveFileList = self.send_json(request, credential, "query files").await?;
        let items = list
            .items
            .into_iter()
            .map(RawRecord::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            next_page_token: list.next_page_token,
        })
    }

    async fn create_folder(
        &self,
        credential: &Credential,
        name: &str,
        parent: &ScopeId,
    ) -> Result<Option<ScopeId>> {
        let body = json!({
            "title": name,
            "parents": [{ "id": parent.as_str() }],
            "mimeType": FOLDER_MIME_TYPE,
        });
        let request = self.client.post(self.url("/drive/v2/files")).json(&body);
        let file: DriveFile = self.send_json(request, credential, "create folder").await?;
        Ok(file.id.filter(|id| !id.is_empty()).map(ScopeId::new))
    }

    async fn create_file(&self, credential: &Credential, meta: &NewFile) -> Result<RawRecord> {
        let mut body = Map::new();
        body.insert("title".to_string(), Value::from(meta.name.clone()));
        body.insert(
            "parents".to_string(),
            json!([{ "id": meta.parent.as_str() }]),
        );
        if let Some(mime) = &meta.mime_type {
            body.insert("mimeType".to_string(), Value::from(mime.clone()));
        }
        if let Some(modified) = meta.modified_at {
            body.insert("modifiedDate".to_string(), Value::from(modified.to_rfc3339()));
        }
        let request = self.client.post(self.url("/drive/v2/files")).json(&body);
        self.send_record(request, credential, "create file").await
    }

    async fn upload_content(
        &self,
        credential: &Credential,
        id: &ScopeId,
        content: ByteStream,
    ) -> Result<RawRecord> {
        let request = self
            .client
            .put(self.url(&format!("/upload/drive/v2/files/{}", id)))
            .query(&[("uploadType", "media")])
            .body(Body::wrap_stream(content));
        self.send_record(request, credential, "upload file content").await
    }

    async fn patch_meta(
        &self,
        credential: &Credential,
        id: &ScopeId,
        patch: &MetaPatch,
    ) -> Result<RawRecord> {
        let mut body = Map::new();
        if let Some(name) = &patch.name {
            body.insert("title".to_string(), Value::from(name.clone()));
        }
        if let Some(parent) = &patch.parent {
            body.insert("parents".to_string(), json!([{ "id": parent.as_str() }]));
        }
        let mut request = self.client.patch(self.files_url(id));
        if let Some(modified) = patch.modified_at {
            body.insert("modifiedDate".to_string(), Value::from(modified.to_rfc3339()));
            request = request.query(&[("modifiedDateBehavior", "fromBody")]);
        }
        self.send_record(request.json(&body), credential, "update file metadata")
            .await
    }

    async fn delete_item(&self, credential: &Credential, id: &ScopeId) -> Result<()> {
        let request = self.client.delete(self.files_url(id));
        self.send(request, credential, "delete item").await?;
        Ok(())
    }

    async fn copy_and_convert(&self, credential: &Credential, id: &ScopeId) -> Result<RawRecord> {
        let request = self
            .client
            .post(self.url(&format!("/drive/v2/files/{}/copy", id)))
            .query(&[("convert", "true")])
            .json(&json!({}));
        self.send_record(request, credential, "convert file").await
    }
}
