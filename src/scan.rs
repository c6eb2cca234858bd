//! Directory scanning: one level of children, classified and pruned.
//!
//! The scanner produces transient [`Entry`] records for the immediate
//! children of a directory. Nothing here is persisted; every listing request
//! re-scans, and the thumbnail cache absorbs the only expensive work.
//!
//! Rules applied, in order:
//!
//! 1. **Ignore rules** — file-name globs and exact directory names drop an
//!    entry before anything else looks at it.
//! 2. **Directory pruning** — a subdirectory is listed only if its subtree
//!    contains at least one file with an allowed media extension. The walk
//!    short-circuits on the first hit, which also becomes the directory's
//!    `thumbnail_source`.
//! 3. **File admission** — a file is listed only if its extension is in the
//!    allowed set and it meets the configured minimum size.
//!
//! Scanning is best-effort aggregation: an entry whose metadata cannot be
//! read is dropped with a debug trace rather than failing the listing.

use crate::config::{ExtensionsConfig, IgnoreRules};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Directory child kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One directory child, derived per request.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    /// Path relative to `owning_root`.
    pub relative_path: PathBuf,
    pub owning_root: PathBuf,
    pub size: u64,
    /// Unix seconds. Falls back to `modified` on filesystems without a
    /// birth time.
    pub created: u64,
    pub modified: u64,
    pub is_image: bool,
    pub is_video: bool,
    pub is_folder: bool,
    /// Representative media file for directory entries, relative to the
    /// owning root. Always `None` for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_source: Option<PathBuf>,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Scan the immediate children of `dir` (an already-resolved absolute path
/// under `root`) into entries.
pub fn scan_children(
    root: &Path,
    dir: &Path,
    extensions: &ExtensionsConfig,
    ignore: &IgnoreRules,
    min_file_size: u64,
) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for child in fs::read_dir(dir)? {
        let child = match child {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable dir entry");
                continue;
            }
        };
        let path = child.path();
        let name = child.file_name().to_string_lossy().to_string();

        let entry = if path.is_dir() {
            if ignore.ignores_dir(&name) {
                continue;
            }
            directory_entry(root, &path, name, extensions)
        } else {
            if ignore.ignores_file(&name) {
                continue;
            }
            file_entry(root, &path, name, extensions, min_file_size)
        };

        if let Some(entry) = entry {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// First descendant file with an allowed media extension, in a depth-first
/// walk with deterministic name ordering. Doubles as the media-presence
/// check: `Some` means the subtree qualifies for listing.
pub fn first_media_file(dir: &Path, extensions: &ExtensionsConfig) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && extensions.path_allowed(e.path()))
        .map(|e| e.into_path())
}

fn directory_entry(
    root: &Path,
    path: &Path,
    name: String,
    extensions: &ExtensionsConfig,
) -> Option<Entry> {
    // Prune subtrees with no media at all
    let media = first_media_file(path, extensions)?;
    let thumbnail_source = media.strip_prefix(root).ok().map(Path::to_path_buf);

    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "dropping unreadable directory");
            return None;
        }
    };
    let (created, modified) = timestamps(&meta);

    Some(Entry {
        kind: EntryKind::Directory,
        name,
        relative_path: path.strip_prefix(root).ok()?.to_path_buf(),
        owning_root: root.to_path_buf(),
        size: meta.len(),
        created,
        modified,
        is_image: false,
        is_video: false,
        is_folder: true,
        thumbnail_source,
    })
}

fn file_entry(
    root: &Path,
    path: &Path,
    name: String,
    extensions: &ExtensionsConfig,
    min_file_size: u64,
) -> Option<Entry> {
    let ext = ExtensionsConfig::extension_of(path)?;
    if !extensions.is_allowed(&ext) {
        return None;
    }

    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "dropping unreadable file");
            return None;
        }
    };
    if meta.len() < min_file_size {
        return None;
    }
    let (created, modified) = timestamps(&meta);

    Some(Entry {
        kind: EntryKind::File,
        name,
        relative_path: path.strip_prefix(root).ok()?.to_path_buf(),
        owning_root: root.to_path_buf(),
        size: meta.len(),
        created,
        modified,
        is_image: extensions.is_image(&ext),
        is_video: extensions.is_video(&ext),
        is_folder: false,
        thumbnail_source: None,
    })
}

fn timestamps(meta: &fs::Metadata) -> (u64, u64) {
    let modified = meta.modified().map(unix_secs).unwrap_or(0);
    let created = meta.created().map(unix_secs).unwrap_or(modified);
    (created, modified)
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
