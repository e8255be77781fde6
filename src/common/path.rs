use crate::common::error::{Error, Result};

/// Reserved top-level segment denoting the shared-with-me namespace.
pub const SHARED_PREFIX: &str = "Shared";

/// Normalize a path into its ordered, non-empty segments.
///
/// Empty segments are dropped, so `//a//b/` yields `["a", "b"]` and `/`
/// yields the empty (root) sequence. Relative traversal is rejected on the
/// raw string before splitting; `.` segments are rejected as well.
pub fn normalize_path(path: &str) -> Result<Vec<String>> {
    if path.starts_with("..") || path.contains("/..") {
        return Err(Error::InvalidPath(format!(
            "Paths must not contain relative traversal: {}",
            path
        )));
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." => {
                return Err(Error::InvalidPath(format!(
                    "Paths must not contain relative segments: {}",
                    path
                )))
            }
            s => segments.push(s.to_string()),
        }
    }
    Ok(segments)
}

/// True iff the first segment is exactly the shared prefix.
pub fn is_shared_root(segments: &[String], prefix: &str) -> bool {
    segments.first().map(|s| s == prefix).unwrap_or(false)
}

/// Normalize a path and strip the shared prefix if it leads.
///
/// Returns `(shared, segments)` where `segments` is relative to the
/// shared root when `shared` is true, and to the owned root otherwise.
pub fn split_shared(path: &str, prefix: &str) -> Result<(bool, Vec<String>)> {
    let mut segments = normalize_path(path)?;
    if is_shared_root(&segments, prefix) {
        segments.remove(0);
        Ok((true, segments))
    } else {
        Ok((false, segments))
    }
}

/// Split a file path into its folder segments and the final file name.
pub fn split_file_path(path: &str) -> Result<(Vec<String>, String)> {
    let mut segments = normalize_path(path)?;
    if path.ends_with('/') {
        return Err(Error::InvalidPath(format!(
            "File path must not end with a slash: {}",
            path
        )));
    }
    match segments.pop() {
        Some(name) => Ok((segments, name)),
        None => Err(Error::InvalidPath(format!(
            "File path has no file name: {}",
            path
        ))),
    }
}

/// Join path parts with single slashes into a rooted path.
///
/// Only used to build output paths; the result is never parsed back.
pub fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .flat_map(|p| p.as_ref().split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("/");
    format!("/{}", joined)
}

/// The virtual folder path a record is reached through.
pub fn context_path(shared: bool, segments: &[String], prefix: &str) -> String {
    if shared {
        let mut parts = vec![prefix.to_string()];
        parts.extend(segments.iter().cloned());
        join_path(&parts)
    } else {
        join_path(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/foo/bar").unwrap(), vec!["foo", "bar"]);
        assert_eq!(normalize_path("foo/bar/").unwrap(), vec!["foo", "bar"]);
        assert_eq!(normalize_path("//a//b/").unwrap(), vec!["a", "b"]);
        assert!(normalize_path("/").unwrap().is_empty());
        assert!(normalize_path("").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        for p in ["/a/../b", "/a/b/..", "../a", "/..", "/../.tests"] {
            assert!(
                matches!(normalize_path(p), Err(Error::InvalidPath(_))),
                "{} should be rejected",
                p
            );
        }
        assert!(matches!(normalize_path("/a/./b"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_normalize_keeps_dotted_names() {
        assert_eq!(
            normalize_path("/a/report.v2.docx").unwrap(),
            vec!["a", "report.v2.docx"]
        );
    }

    #[test]
    fn test_shared_root() {
        let (shared, segs) = split_shared("/Shared/team/docs", SHARED_PREFIX).unwrap();
        assert!(shared);
        assert_eq!(segs, vec!["team", "docs"]);

        let (shared, segs) = split_shared("/SharedStuff/docs", SHARED_PREFIX).unwrap();
        assert!(!shared);
        assert_eq!(segs, vec!["SharedStuff", "docs"]);

        let (shared, _) = split_shared("/shared/docs", SHARED_PREFIX).unwrap();
        assert!(!shared);

        let (shared, segs) = split_shared("Shared", SHARED_PREFIX).unwrap();
        assert!(shared);
        assert!(segs.is_empty());
    }

    #[test]
    fn test_split_file_path() {
        let (folders, name) = split_file_path("/docs/report.docx").unwrap();
        assert_eq!(folders, vec!["docs"]);
        assert_eq!(name, "report.docx");

        let (folders, name) = split_file_path("report.docx").unwrap();
        assert!(folders.is_empty());
        assert_eq!(name, "report.docx");

        assert!(matches!(split_file_path("/docs/"), Err(Error::InvalidPath(_))));
        assert!(matches!(split_file_path("/"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["/foo", "bar"]), "/foo/bar");
        assert_eq!(join_path(&["/", "foo"]), "/foo");
        assert_eq!(join_path::<&str>(&[]), "/");
        assert_eq!(join_path(&["a/", "/b//c"]), "/a/b/c");
        let once = join_path(&["a", "b"]);
        assert_eq!(join_path(&[once.as_str(), "c"]), join_path(&["a", "b", "c"]));
    }

    #[test]
    fn test_context_path() {
        let segs = vec!["team".to_string()];
        assert_eq!(context_path(true, &segs, SHARED_PREFIX), "/Shared/team");
        assert_eq!(context_path(false, &segs, SHARED_PREFIX), "/team");
        assert_eq!(context_path(true, &[], SHARED_PREFIX), "/Shared");
    }
}
