//! Content-based media classification.
//!
//! Extensions lie often enough that thumbnail and view requests sniff the
//! file's leading bytes instead of trusting the name. The extension
//! allow-lists in [`ExtensionsConfig`](crate::config::ExtensionsConfig) stay
//! in play as a cheap pre-filter during scanning, so only files that are
//! plausibly media get read at all.
//!
//! Classification is deliberately infallible: an unreadable, truncated or
//! unrecognized file is simply not media. Scanning drops such files
//! silently; direct lookups turn the `None` into a typed not-media outcome
//! at the gallery boundary.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What a file's content says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Bytes to read for sniffing. `infer` needs at most a few hundred bytes for
/// every signature it knows; 8 KiB leaves comfortable headroom for formats
/// with late magic (e.g. `ftyp` boxes preceded by wide size fields).
const SNIFF_LEN: usize = 8192;

/// Classify a file by its content.
///
/// Returns `None` for anything that is not readable media: missing files,
/// permission errors, unknown formats. Never panics, never returns an error.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let mut buf = [0u8; SNIFF_LEN];
    let mut file = File::open(path).ok()?;
    let n = file.read(&mut buf).ok()?;
    classify_bytes(&buf[..n])
}

/// Classify from an in-memory header. Split out for testability.
pub fn classify_bytes(header: &[u8]) -> Option<MediaKind> {
    let kind = infer::get(header)?;
    match kind.matcher_type() {
        infer::MatcherType::Image => Some(MediaKind::Image),
        infer::MatcherType::Video => Some(MediaKind::Video),
        _ => None,
    }
}
