//! The boundary the serving layer talks to.
//!
//! [`Gallery`] wires the resolver, scanner, listing policy and preview
//! cache together behind three operations:
//!
//! - [`Gallery::list_directory`] — a page of a logical directory,
//!   aggregated across every configured root.
//! - [`Gallery::thumbnail`] — absolute path of the JPEG preview for one
//!   media file, generated on miss.
//! - [`Gallery::viewable_file`] — absolute path of the servable full file,
//!   converting RAW formats on the way.
//!
//! Failure semantics differ by shape of the request. Listing is best-effort
//! aggregation: a root that is missing or rejects the subpath is skipped,
//! and only when *no* root resolves it does the request fail. Single-item
//! lookups surface every outcome of the error taxonomy so the caller can
//! answer precisely.

use crate::config::{ConfigError, ExtensionsConfig, GalleryConfig, IgnoreRules};
use crate::listing::{self, ListQuery, Listing, PageSize, SortKey, SortOrder};
use crate::resolve::{self, ResolveError};
use crate::scan;
use crate::thumbs::{CacheRoot, ThumbError, Thumbnailer};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    /// The logical subpath of a listing request resolves under no root.
    #[error("path resolves under no configured root")]
    InvalidPath,
    /// The requested file does not exist under any root.
    #[error("file not found")]
    NotFound,
    /// The requested path escapes its root.
    #[error("path escapes the gallery roots")]
    TraversalRejected,
    /// Content classification yielded neither image nor video, or the
    /// preview could not be produced.
    #[error("unsupported media")]
    UnsupportedMedia,
    /// Downloads are disabled.
    #[error("downloads are disabled")]
    Forbidden,
    /// The file exceeds the configured download cap.
    #[error("file size {size} exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    /// RAW conversion failed.
    #[error("external conversion failed: {0}")]
    ExternalTool(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ResolveError> for GalleryError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => Self::NotFound,
            ResolveError::TraversalRejected => Self::TraversalRejected,
        }
    }
}

/// The scan-and-cache engine, built once at startup from validated config.
pub struct Gallery {
    config: GalleryConfig,
    ignore: IgnoreRules,
    cache: CacheRoot,
}

impl Gallery {
    /// Validate the config, compile ignore rules and prepare the cache
    /// directory.
    pub fn new(config: GalleryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ignore = config.ignore.compile()?;
        let cache = CacheRoot::prepare(&config.cache_dir)?;
        Ok(Self {
            config,
            ignore,
            cache,
        })
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn cache_root(&self) -> &CacheRoot {
        &self.cache
    }

    pub(crate) fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// A query populated from the configured listing defaults.
    ///
    /// Unparseable defaults fall back to name/asc; `validate` does not
    /// gate them because older config files predate the `type` key.
    pub fn default_query(&self) -> ListQuery {
        ListQuery {
            filter: String::new(),
            sort: self
                .config
                .listing
                .default_sort
                .parse()
                .unwrap_or(SortKey::Name),
            order: self
                .config
                .listing
                .default_order
                .parse()
                .unwrap_or(SortOrder::Asc),
            page: 1,
            page_size: PageSize::from_config(self.config.listing.page_size),
        }
    }

    /// Scan the logical subpath in every root, then apply listing policy.
    ///
    /// Roots that do not contain the subpath (or reject it) contribute
    /// nothing; the request fails with [`GalleryError::InvalidPath`] only
    /// when every root refused it.
    pub fn list_directory(
        &self,
        subpath: &Path,
        query: &ListQuery,
    ) -> Result<Listing, GalleryError> {
        let mut entries = Vec::new();
        let mut resolved_any = false;

        for root in &self.config.roots {
            let resolved = match resolve::resolve_in_root(root, subpath) {
                Ok(r) => r,
                Err(err) => {
                    tracing::debug!(
                        root = %root.display(),
                        subpath = %subpath.display(),
                        %err,
                        "root skipped for listing"
                    );
                    continue;
                }
            };
            resolved_any = true;

            match scan::scan_children(
                root,
                &resolved.absolute,
                &self.config.extensions,
                &self.ignore,
                self.config.listing.min_file_size,
            ) {
                Ok(children) => entries.extend(children),
                Err(err) => {
                    tracing::warn!(root = %root.display(), %err, "scan failed, root skipped");
                }
            }
        }

        if !resolved_any {
            return Err(GalleryError::InvalidPath);
        }
        Ok(listing::build_listing(entries, query))
    }

    /// Absolute path of the JPEG preview for one media file.
    pub fn thumbnail(&self, subpath: &Path) -> Result<PathBuf, GalleryError> {
        let resolved = resolve::resolve(&self.config.roots, subpath)?;
        let thumbnailer = Thumbnailer::new(&self.config.thumbnails, &self.cache);
        thumbnailer
            .thumbnail(&resolved.absolute, &resolved.relative)
            .map_err(|err| {
                // The caller cannot act on the distinction between a decode
                // failure and a tool failure; both mean "no preview".
                tracing::warn!(path = %subpath.display(), %err, "thumbnail generation failed");
                GalleryError::UnsupportedMedia
            })
    }

    /// Absolute path of the file to serve for a view/download request.
    ///
    /// RAW formats are replaced by their cached full-size JPEG conversion.
    pub fn viewable_file(&self, subpath: &Path) -> Result<PathBuf, GalleryError> {
        let resolved = resolve::resolve(&self.config.roots, subpath)?;

        if !self.config.downloads.enabled {
            return Err(GalleryError::Forbidden);
        }
        let size = std::fs::metadata(&resolved.absolute)?.len();
        let max = self.config.downloads.max_size;
        if size > max {
            return Err(GalleryError::TooLarge { size, max });
        }

        let ext = ExtensionsConfig::extension_of(&resolved.absolute).unwrap_or_default();
        if self.config.extensions.is_raw(&ext) {
            let thumbnailer = Thumbnailer::new(&self.config.thumbnails, &self.cache);
            return thumbnailer
                .convert_original(&resolved.absolute, &resolved.relative)
                .map_err(|err| match err {
                    ThumbError::Tool { reason, .. } => GalleryError::ExternalTool(reason),
                    ThumbError::Io(e) => GalleryError::Io(e),
                    other => GalleryError::ExternalTool(other.to_string()),
                });
        }
        Ok(resolved.absolute)
    }
}
