//! # Medley
//!
//! A browsable-media gallery engine. Your filesystem is the data source:
//! a set of root directories is scanned per request, media files get lazily
//! generated JPEG previews, and a mirror-layout cache absorbs the expensive
//! work so it never repeats.
//!
//! # Architecture
//!
//! Every request carries a *logical path*, a path relative to some root.
//! The engine resolves it against the configured roots in order, scans or
//! serves the resolved target, and keys the preview cache by the
//! root-relative path:
//!
//! ```text
//! request  →  resolve (first matching root, containment enforced)
//!          →  scan    (one level, pruned and classified)   → listing
//!          →  thumbs  (cache hit, or generate into cache)  → preview path
//! ```
//!
//! Nothing about the source tree is persisted. Listings are recomputed per
//! request; only derived previews live on disk, and their cache-hit test is
//! path existence. This keeps the engine stateless across restarts and
//! tolerant of sources changing underneath it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `medley.toml` loading, validation, extension allow-lists, ignore rules |
//! | [`resolve`] | Logical-path resolution against the root set, with traversal containment |
//! | [`classify`] | Content sniffing: is this file really an image or a video? |
//! | [`scan`] | One-level directory scanning with media-presence pruning |
//! | [`listing`] | Filter, sort and pagination policy over scanned entries |
//! | [`thumbs`] | The on-disk preview cache and its generation paths |
//! | [`gallery`] | The boundary facade: list, thumbnail, serve |
//! | [`warm`] | Bulk parallel pre-generation of the preview cache |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Extension Gate, Content Truth
//!
//! Scanning admits files by extension alone, so a listing never opens file
//! contents. Preview generation then sniffs actual content and routes by
//! what the bytes say, not what the name claims. A `.txt` full of JPEG data
//! thumbnails fine; a text file named `.jpg` is rejected as unsupported.
//!
//! ## Lock-Free Cache Writes
//!
//! Concurrent requests for the same missing preview all generate it.
//! Generation is deterministic per source, so last-writer-wins yields an
//! equivalent file and the cost of occasional duplicate work is far below
//! the cost of cross-process locking.
//!
//! ## External Tools Where Rust Falls Short
//!
//! Image previews are pure Rust (`image` crate, Lanczos3, JPEG encode).
//! Video frame grabs shell out to `ffmpeg` and RAW conversion to
//! ImageMagick's `convert`; both are optional at runtime and their absence
//! degrades those media kinds only.

pub mod classify;
pub mod config;
pub mod gallery;
pub mod listing;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod thumbs;
pub mod warm;

#[cfg(test)]
pub(crate) mod test_helpers;
