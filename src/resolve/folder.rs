//! Segment-by-segment folder resolution.

use crate::{
    backend::client::BackendClient,
    common::{config::AmbiguityPolicy, path::join_path, Error, Result},
    core::file_record::{Credential, FileKind, RawRecord, ScopeId},
    resolve::query::{build_query, Query},
};

/// Outcome of resolving a path to an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: ScopeId,
    /// Number of items that matched the final segment.
    pub candidates: usize,
    /// Paths, along the resolved chain, that matched more than one item.
    pub ambiguous: Vec<String>,
}

impl Resolved {
    pub fn root() -> Self {
        Self {
            id: ScopeId::root(),
            candidates: 1,
            ambiguous: Vec::new(),
        }
    }

    /// True if any segment on the way was resolved by taking the first of
    /// several matches.
    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguous.is_empty()
    }
}

/// Resolves virtual paths against one backend with one credential.
///
/// Holds no cache; every call goes to the backend.
pub struct Resolver<'a> {
    client: &'a dyn BackendClient,
    credential: &'a Credential,
    ambiguity: AmbiguityPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(
        client: &'a dyn BackendClient,
        credential: &'a Credential,
        ambiguity: AmbiguityPolicy,
    ) -> Self {
        Self {
            client,
            credential,
            ambiguity,
        }
    }

    /// Run a single-item lookup; returns the first match and the match count.
    pub(crate) async fn lookup(
        &self,
        query: &Query,
        path: &str,
    ) -> Result<Option<(RawRecord, usize)>> {
        let page = self.client.query(self.credential, query, None, None).await?;
        let candidates = page.items.len();
        let first = match page.items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        };
        if candidates > 1 {
            tracing::warn!(
                "{} matched {} items under the same parent; using {}",
                path,
                candidates,
                first.id
            );
            if self.ambiguity == AmbiguityPolicy::Reject {
                return Err(Error::Ambiguous {
                    path: path.to_string(),
                    candidates,
                });
            }
        }
        Ok(Some((first, candidates)))
    }

    /// Resolve the deepest folder of `segments`.
    ///
    /// Only the first segment is looked up in the shared view when `shared`
    /// is set; deeper segments are children of the resolved parent. Missing
    /// segments are created when `create_missing` is set, except a missing
    /// shared top-level entry, which cannot be created on the caller's behalf.
    pub async fn resolve_folder(
        &self,
        segments: &[String],
        shared: bool,
        create_missing: bool,
    ) -> Result<Resolved> {
        let mut resolved = Resolved::root();
        for (i, name) in segments.iter().enumerate() {
            let shared_segment = shared && i == 0;
            let path = join_path(&segments[..=i]);
            let query = build_query(FileKind::Folder, name, &resolved.id, shared_segment);

            match self.lookup(&query, &path).await? {
                Some((record, candidates)) => {
                    tracing::debug!("Resolved folder {} to {}", path, record.id);
                    if candidates > 1 {
                        resolved.ambiguous.push(path);
                    }
                    resolved.id = record.id;
                    resolved.candidates = candidates;
                }
                None if create_missing && !shared_segment => {
                    let id = self
                        .client
                        .create_folder(self.credential, name, &resolved.id)
                        .await?
                        .ok_or_else(|| {
                            Error::Upstream(format!(
                                "No response from backend. Could not create folder {}",
                                path
                            ))
                        })?;
                    tracing::info!("Created folder {} ({}) under {}", path, id, resolved.id);
                    resolved.id = id;
                    resolved.candidates = 1;
                }
                None => {
                    return Err(Error::NotFound(format!("Folder {} does not exist", path)));
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn segs(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_root_needs_no_round_trip() {
        let backend = MemoryBackend::new();
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);
        let resolved = resolver.resolve_folder(&[], true, true).await.unwrap();
        assert!(resolved.id.is_root());
        assert_eq!(backend.calls().query, 0);
    }

    #[tokio::test]
    async fn test_walks_each_segment() {
        let backend = MemoryBackend::new();
        let a = backend.insert_folder("a", &ScopeId::root(), false).await;
        let b = backend.insert_folder("b", &a, false).await;
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);

        let resolved = resolver.resolve_folder(&segs(&["a", "b"]), false, false).await.unwrap();
        assert_eq!(resolved.id, b);
        assert!(!resolved.is_ambiguous());
        assert_eq!(backend.calls().query, 2);
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found() {
        let backend = MemoryBackend::new();
        backend.insert_folder("a", &ScopeId::root(), false).await;
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);

        let err = resolver
            .resolve_folder(&segs(&["a", "missing"]), false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(backend.calls().create_folder, 0);
    }

    #[tokio::test]
    async fn test_creates_only_missing_suffix() {
        let backend = MemoryBackend::new();
        let a = backend.insert_folder("a", &ScopeId::root(), false).await;
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);

        let created = resolver
            .resolve_folder(&segs(&["a", "b", "c"]), false, true)
            .await
            .unwrap();
        assert_eq!(backend.calls().create_folder, 2);
        let creations = backend.folder_creations().await;
        assert_eq!(creations[0], ("b".to_string(), a.clone()));

        let again = resolver
            .resolve_folder(&segs(&["a", "b", "c"]), false, true)
            .await
            .unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(backend.calls().create_folder, 2);
    }

    #[tokio::test]
    async fn test_shared_applies_to_first_segment_only() {
        let backend = MemoryBackend::new();
        let team = backend.insert_folder("team", &ScopeId::root(), true).await;
        let docs = backend.insert_folder("docs", &team, false).await;
        // An owned folder with the same name must not be picked up.
        backend.insert_folder("team", &ScopeId::root(), false).await;
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);

        let resolved = resolver
            .resolve_folder(&segs(&["team", "docs"]), true, false)
            .await
            .unwrap();
        assert_eq!(resolved.id, docs);
    }

    #[tokio::test]
    async fn test_missing_shared_root_entry_is_never_created() {
        let backend = MemoryBackend::new();
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);

        let err = resolver
            .resolve_folder(&segs(&["team"]), true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(backend.calls().create_folder, 0);
    }

    #[tokio::test]
    async fn test_duplicate_names_take_first_and_are_flagged() {
        let backend = MemoryBackend::new();
        let first = backend.insert_folder("dup", &ScopeId::root(), false).await;
        backend.insert_folder("dup", &ScopeId::root(), false).await;
        let cred = Credential::new("t");

        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);
        let resolved = resolver.resolve_folder(&segs(&["dup"]), false, false).await.unwrap();
        assert_eq!(resolved.id, first);
        assert_eq!(resolved.candidates, 2);
        assert!(resolved.is_ambiguous());
        assert_eq!(resolved.ambiguous, vec!["/dup".to_string()]);

        let strict = Resolver::new(&backend, &cred, AmbiguityPolicy::Reject);
        let err = strict.resolve_folder(&segs(&["dup"]), false, false).await.unwrap_err();
        assert!(matches!(err, Error::Ambiguous { candidates: 2, .. }));
    }

    #[tokio::test]
    async fn test_create_without_id_is_upstream_error() {
        use crate::backend::client::{MetaPatch, NewFile, Page};
        use crate::core::file_system::ByteStream;
        use async_trait::async_trait;

        struct NoIdBackend;

        #[async_trait]
        impl BackendClient for NoIdBackend {
            async fn query(&self, _: &Credential, _: &Query, _: Option<u32>, _: Option<&str>) -> Result<Page> {
                Ok(Page::default())
            }
            async fn create_folder(&self, _: &Credential, _: &str, _: &ScopeId) -> Result<Option<ScopeId>> {
                Ok(None)
            }
            async fn create_file(&self, _: &Credential, _: &NewFile) -> Result<RawRecord> {
                Err(Error::Internal("unused".to_string()))
            }
            async fn upload_content(&self, _: &Credential, _: &ScopeId, _: ByteStream) -> Result<RawRecord> {
                Err(Error::Internal("unused".to_string()))
            }
            async fn patch_meta(&self, _: &Credential, _: &ScopeId, _: &MetaPatch) -> Result<RawRecord> {
                Err(Error::Internal("unused".to_string()))
            }
            async fn delete_item(&self, _: &Credential, _: &ScopeId) -> Result<()> {
                Err(Error::Internal("unused".to_string()))
            }
            async fn copy_and_convert(&self, _: &Credential, _: &ScopeId) -> Result<RawRecord> {
                Err(Error::Internal("unused".to_string()))
            }
        }

        let backend = NoIdBackend;
        let cred = Credential::new("t");
        let resolver = Resolver::new(&backend, &cred, AmbiguityPolicy::First);
        let err = resolver.resolve_folder(&segs(&["new"]), false, true).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
