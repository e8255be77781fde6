//! Exhaustive paginated listing.
//!
//! `pages` produces one backend page per item and stops after the first
//! page without a continuation token; `drain` concatenates any page
//! producer in arrival order.

use async_stream::try_stream;
use futures::{
    stream::{BoxStream, Stream, StreamExt},
    TryStreamExt,
};

use crate::{
    backend::client::{BackendClient, Page},
    common::{Error, Result},
    core::file_record::{Credential, RawRecord},
    resolve::query::Query,
};

/// Stream pages of `query`, failing once more than `max_pages` pages would be needed.
pub fn pages<'a>(
    client: &'a dyn BackendClient,
    credential: &'a Credential,
    query: &'a Query,
    page_size: u32,
    max_pages: usize,
) -> BoxStream<'a, Result<Page>> {
    try_stream! {
        let mut token: Option<String> = None;
        let mut fetched: usize = 0;
        loop {
            if fetched >= max_pages {
                Err::<(), _>(Error::Upstream(format!(
                    "Listing did not finish after {} pages; last page token {:?}",
                    max_pages, token
                )))?;
            }
            let page = client
                .query(credential, query, Some(page_size), token.as_deref())
                .await?;
            fetched += 1;
            let next = page.next_page_token.clone().filter(|t| !t.is_empty());
            tracing::debug!(
                "Fetched page {} with {} items (more: {})",
                fetched,
                page.items.len(),
                next.is_some()
            );
            yield page;
            match next {
                Some(t) => token = Some(t),
                None => break,
            }
        }
    }
    .boxed()
}

/// Drain a page producer into one record sequence.
pub async fn drain<S>(pages: S) -> Result<Vec<RawRecord>>
where
    S: Stream<Item = Result<Page>>,
{
    pages
        .try_fold(Vec::new(), |mut all, page| async move {
            all.extend(page.items);
            Ok::<_, Error>(all)
        })
        .await
}

pub async fn list_all(
    client: &dyn BackendClient,
    credential: &Credential,
    query: &Query,
    page_size: u32,
    max_pages: usize,
) -> Result<Vec<RawRecord>> {
    drain(pages(client, credential, query, page_size, max_pages)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::{MetaPatch, NewFile};
    use crate::backend::memory::MemoryBackend;
    use crate::core::file_record::ScopeId;
    use crate::core::file_system::ByteStream;
    use crate::resolve::query::build_listing;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    fn record(id: &str) -> RawRecord {
        RawRecord {
            id: ScopeId::new(id),
            name: id.to_string(),
            ..RawRecord::default()
        }
    }

    fn page(ids: &[&str], token: Option<&str>) -> Page {
        Page {
            items: ids.iter().map(|id| record(id)).collect(),
            next_page_token: token.map(str::to_string),
        }
    }

    /// Replays scripted pages and records the tokens it was asked for.
    struct ScriptedBackend {
        pages: Vec<Page>,
        cycle: bool,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedBackend {
        fn new(pages: Vec<Page>, cycle: bool) -> Self {
            Self {
                pages,
                cycle,
                seen_tokens: Mutex::new(Vec::new()),
            }
        }
    }

    fn unsupported<T>() -> Result<T> {
        Err(Error::Internal("not scripted".to_string()))
    }

    #[async_trait]
    impl BackendClient for ScriptedBackend {
        async fn query(
            &self,
            _credential: &Credential,
            _query: &Query,
            _page_size: Option<u32>,
            page_token: Option<&str>,
        ) -> Result<Page> {
            let mut seen = self.seen_tokens.lock().unwrap();
            let index = seen.len();
            seen.push(page_token.map(str::to_string));
            let index = if self.cycle { index % self.pages.len() } else { index };
            self.pages
                .get(index)
                .cloned()
                .ok_or_else(|| Error::Internal("script exhausted".to_string()))
        }

        async fn create_folder(&self, _: &Credential, _: &str, _: &ScopeId) -> Result<Option<ScopeId>> {
            unsupported()
        }

        async fn create_file(&self, _: &Credential, _: &NewFile) -> Result<RawRecord> {
            unsupported()
        }

        async fn upload_content(&self, _: &Credential, _: &ScopeId, _: ByteStream) -> Result<RawRecord> {
            unsupported()
        }

        async fn patch_meta(&self, _: &Credential, _: &ScopeId, _: &MetaPatch) -> Result<RawRecord> {
            unsupported()
        }

        async fn delete_item(&self, _: &Credential, _: &ScopeId) -> Result<()> {
            unsupported()
        }

        async fn copy_and_convert(&self, _: &Credential, _: &ScopeId) -> Result<RawRecord> {
            unsupported()
        }
    }

    #[tokio::test]
    async fn test_drain_concatenates_in_page_order() {
        let producer = stream::iter(vec![
            Ok(page(&["a", "b"], Some("T1"))),
            Ok(page(&["c"], Some("T2"))),
            Ok(page(&["d", "e", "f"], None)),
        ]);
        let all = drain(producer).await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[tokio::test]
    async fn test_drain_stops_at_first_error() {
        let producer = stream::iter(vec![
            Ok(page(&["a"], Some("T1"))),
            Err(Error::Unauthorized("expired".to_string())),
            Ok(page(&["b"], None)),
        ]);
        assert!(matches!(drain(producer).await, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_three_page_listing_follows_tokens() {
        let backend = ScriptedBackend::new(
            vec![
                page(&["a", "b"], Some("T1")),
                page(&["c", "d"], Some("T2")),
                page(&["e"], Some("T3")),
                page(&["f"], None),
            ],
            false,
        );
        let cred = Credential::new("t");
        let q = build_listing(&ScopeId::root());
        let all = list_all(&backend, &cred, &q, 2, 10).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[4].name, "e");
        let seen = backend.seen_tokens.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                None,
                Some("T1".to_string()),
                Some("T2".to_string()),
                Some("T3".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_token_ends_listing() {
        let backend = ScriptedBackend::new(vec![page(&["a"], Some(""))], false);
        let cred = Credential::new("t");
        let q = build_listing(&ScopeId::root());
        let all = list_all(&backend, &cred, &q, 100, 10).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_oscillating_tokens_hit_the_cap() {
        let backend = ScriptedBackend::new(
            vec![page(&["a"], Some("T1")), page(&["b"], Some("T2"))],
            true,
        );
        let cred = Credential::new("t");
        let q = build_listing(&ScopeId::root());
        let err = list_all(&backend, &cred, &q, 1, 5).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(backend.seen_tokens.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_page_producer_yields_each_page() {
        let backend = MemoryBackend::new();
        for i in 0..7 {
            backend
                .insert_file(&format!("f{}", i), &ScopeId::root(), "text/plain", b"", false)
                .await;
        }
        let cred = Credential::new("t");
        let q = build_listing(&ScopeId::root());
        let sizes: Vec<usize> = pages(&backend, &cred, &q, 3, 10)
            .map_ok(|p| p.items.len())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(backend.calls().query, 3);
    }
}
