//! Bulk cache warming.
//!
//! Walks every configured root, collects each media file that scanning
//! would admit (ignore rules and extension allow-lists apply; the listing
//! size floor does not, since a small file still gets a preview when
//! requested directly) and generates its thumbnail if missing. Files are
//! processed in parallel; thumbnail generation is independent per source,
//! so the work splits cleanly.
//!
//! Failures are counted, not fatal. A file that cannot be decoded today is
//! simply retried by the next warm run or by the first on-demand request.

use crate::gallery::Gallery;
use crate::thumbs::Thumbnailer;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Outcome counters for one warm run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmStats {
    /// Thumbnails generated by this run.
    pub generated: usize,
    /// Thumbnails that already existed.
    pub cached: usize,
    /// Sources whose generation failed.
    pub failed: usize,
}

impl WarmStats {
    pub fn total(&self) -> usize {
        self.generated + self.cached + self.failed
    }

    fn merge(self, other: Self) -> Self {
        Self {
            generated: self.generated + other.generated,
            cached: self.cached + other.cached,
            failed: self.failed + other.failed,
        }
    }
}

impl fmt::Display for WarmStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} generated, {} cached, {} failed",
            self.total(),
            self.generated,
            self.cached,
            self.failed
        )
    }
}

/// Generate every missing thumbnail under the configured roots.
pub fn warm_cache(gallery: &Gallery) -> WarmStats {
    let targets = collect_targets(gallery);
    tracing::info!(count = targets.len(), "warming thumbnail cache");

    let config = gallery.config();
    let cache = gallery.cache_root();

    targets
        .par_iter()
        .map(|(absolute, relative)| {
            if cache.thumbnail_path(relative).exists() {
                return WarmStats {
                    cached: 1,
                    ..WarmStats::default()
                };
            }
            let thumbnailer = Thumbnailer::new(&config.thumbnails, cache);
            match thumbnailer.thumbnail(absolute, relative) {
                Ok(_) => WarmStats {
                    generated: 1,
                    ..WarmStats::default()
                },
                Err(err) => {
                    tracing::warn!(path = %absolute.display(), %err, "warm failed");
                    WarmStats {
                        failed: 1,
                        ..WarmStats::default()
                    }
                }
            }
        })
        .reduce(WarmStats::default, WarmStats::merge)
}

/// Every (absolute, root-relative) media file under every root, with
/// ignore rules applied the same way the scanner applies them.
fn collect_targets(gallery: &Gallery) -> Vec<(PathBuf, PathBuf)> {
    let config = gallery.config();
    let ignore = gallery.ignore_rules();
    let mut targets = Vec::new();

    for root in &config.roots {
        let walk = WalkDir::new(root).sort_by_file_name().into_iter();
        let walk = walk.filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            !ignore.ignores_dir(&e.file_name().to_string_lossy())
        });

        for entry in walk.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if ignore.ignores_file(&name) {
                continue;
            }
            if !config.extensions.path_allowed(entry.path()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                targets.push((entry.path().to_path_buf(), relative.to_path_buf()));
            }
        }
    }
    targets
}
