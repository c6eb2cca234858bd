//! Logical-path resolution against the configured root set.
//!
//! A request never carries a filesystem path, only a path relative to some
//! root. Resolution tries each configured root in declared order and returns
//! the first root that both contains the path and passes the containment
//! check. Containment compares canonical forms, so `..` segments and symlink
//! escapes are both rejected.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// The logical path does not exist under the candidate root.
    #[error("path not found under root")]
    NotFound,
    /// The path exists but its canonical form escapes the root.
    #[error("path escapes its root")]
    TraversalRejected,
}

/// A successful resolution: the absolute path, the path relative to the
/// owning root (the cache key), and the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub absolute: PathBuf,
    pub relative: PathBuf,
    pub root: PathBuf,
}

/// Resolve a logical path against a single root.
///
/// Returns [`ResolveError::NotFound`] if nothing exists at the joined path,
/// and [`ResolveError::TraversalRejected`] if the canonical form of the
/// joined path is not prefixed by the canonical root.
pub fn resolve_in_root(root: &Path, logical: &Path) -> Result<Resolved, ResolveError> {
    let candidate = root.join(logical);
    // Canonicalization fails on dangling paths, which doubles as the
    // existence check.
    let canonical = candidate
        .canonicalize()
        .map_err(|_| ResolveError::NotFound)?;
    let canonical_root = root.canonicalize().map_err(|_| ResolveError::NotFound)?;
    let relative = canonical
        .strip_prefix(&canonical_root)
        .map_err(|_| ResolveError::TraversalRejected)?
        .to_path_buf();
    Ok(Resolved {
        absolute: canonical,
        relative,
        root: root.to_path_buf(),
    })
}

/// Resolve a logical path against the full root set, first match wins.
///
/// Roots that reject the path (missing or escaping) are skipped; the
/// strongest failure seen is reported when no root matches, so a traversal
/// attempt is distinguishable from a plain miss.
pub fn resolve(roots: &[PathBuf], logical: &Path) -> Result<Resolved, ResolveError> {
    let mut rejected = false;
    for root in roots {
        match resolve_in_root(root, logical) {
            Ok(resolved) => return Ok(resolved),
            Err(ResolveError::TraversalRejected) => {
                tracing::debug!(
                    root = %root.display(),
                    path = %logical.display(),
                    "traversal rejected"
                );
                rejected = true;
            }
            Err(ResolveError::NotFound) => {}
        }
    }
    if rejected {
        Err(ResolveError::TraversalRejected)
    } else {
        Err(ResolveError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolves_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("photos")).unwrap();
        fs::write(tmp.path().join("photos/cat.jpg"), "x").unwrap();

        let resolved = resolve_in_root(tmp.path(), Path::new("photos/cat.jpg")).unwrap();
        assert!(resolved.absolute.ends_with("photos/cat.jpg"));
        assert_eq!(resolved.relative, Path::new("photos/cat.jpg"));
        assert_eq!(resolved.root, tmp.path());
    }

    #[test]
    fn missing_path_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            resolve_in_root(tmp.path(), Path::new("nope.jpg")),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn dotdot_escape_rejected() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), "x").unwrap();

        let result = resolve_in_root(&root, Path::new("../secret.txt"));
        assert_eq!(result, Err(ResolveError::TraversalRejected));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_rejected() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), "x").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt"))
            .unwrap();

        let result = resolve_in_root(&root, Path::new("link.txt"));
        assert_eq!(result, Err(ResolveError::TraversalRejected));
    }

    #[test]
    fn first_matching_root_wins() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::write(a.path().join("both.jpg"), "a").unwrap();
        fs::write(b.path().join("both.jpg"), "b").unwrap();
        fs::write(b.path().join("only-b.jpg"), "b").unwrap();

        let roots = vec![a.path().to_path_buf(), b.path().to_path_buf()];

        let hit = resolve(&roots, Path::new("both.jpg")).unwrap();
        assert_eq!(hit.root, a.path());

        let hit = resolve(&roots, Path::new("only-b.jpg")).unwrap();
        assert_eq!(hit.root, b.path());
    }

    #[test]
    fn no_root_matches_is_not_found() {
        let a = TempDir::new().unwrap();
        let roots = vec![a.path().to_path_buf()];
        assert_eq!(
            resolve(&roots, Path::new("ghost.jpg")),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn traversal_reported_over_not_found() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), "x").unwrap();

        let roots = vec![root];
        assert_eq!(
            resolve(&roots, Path::new("../secret.txt")),
            Err(ResolveError::TraversalRejected)
        );
    }

    #[test]
    fn empty_logical_path_resolves_to_root() {
        let tmp = TempDir::new().unwrap();
        let resolved = resolve_in_root(tmp.path(), Path::new("")).unwrap();
        assert_eq!(resolved.absolute, tmp.path().canonicalize().unwrap());
        assert_eq!(resolved.relative, Path::new(""));
    }
}
