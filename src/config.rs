//! Gallery configuration module.
//!
//! Handles loading and validating `medley.toml`. All options have stock
//! defaults; user config files need only override the values they care about.
//! Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Ordered list of gallery roots. A logical path is resolved against each
//! # root in turn; the first root that contains it wins.
//! roots = ["/srv/media"]
//!
//! # Where generated previews live. Created at startup if missing.
//! cache_dir = "/var/cache/medley"
//!
//! [extensions]
//! images = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "nef"]
//! videos = ["mp4", "mkv", "mov", "webm", "avi", "m4v"]
//! raw    = ["nef"]          # served via full-size JPEG conversion
//!
//! [listing]
//! default_sort = "name"     # name | size | created | modified | type | random
//! default_order = "asc"     # asc | desc
//! page_size = 50            # 0 = everything on one page
//! min_file_size = 1024      # files smaller than this are not listed (bytes)
//!
//! [thumbnails]
//! max_width = 400           # bounding box, aspect ratio preserved
//! max_height = 400
//! quality = 85              # JPEG quality (1-100)
//! video_position = 5.0      # frame-grab offset into the video (seconds)
//!
//! [downloads]
//! enabled = true
//! max_size = 524288000      # largest file servable in full (bytes)
//!
//! [ignore]
//! files = [".*", "*.tmp"]   # glob patterns matched against file names
//! dirs  = ["@eaDir", ".thumbnails"]  # exact directory names
//! ```

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `medley.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Ordered gallery root directories. First match wins on resolution.
    pub roots: Vec<PathBuf>,
    /// Directory the preview cache mirrors the roots into.
    pub cache_dir: PathBuf,
    /// Extension allow-lists for listing and classification pre-filtering.
    pub extensions: ExtensionsConfig,
    /// Sort, filter and pagination defaults.
    pub listing: ListingConfig,
    /// Preview generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Full-file serving policy.
    pub downloads: DownloadsConfig,
    /// Entries excluded from scanning before any other processing.
    pub ignore: IgnoreConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            cache_dir: PathBuf::from(".cache"),
            extensions: ExtensionsConfig::default(),
            listing: ListingConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            downloads: DownloadsConfig::default(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate startup invariants.
    ///
    /// Mirrors the checks the service performs before accepting requests:
    /// every root must exist, and neither roots nor the cache dir may carry
    /// a trailing separator (it would break relative-path derivation).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roots.is_empty() {
            return Err(ConfigError::Validation(
                "at least one gallery root is required".into(),
            ));
        }
        for root in &self.roots {
            if has_trailing_separator(root) {
                return Err(ConfigError::Validation(format!(
                    "root must not end in a path separator: {}",
                    root.display()
                )));
            }
            if !root.is_dir() {
                return Err(ConfigError::Validation(format!(
                    "gallery root does not exist: {}",
                    root.display()
                )));
            }
        }
        if has_trailing_separator(&self.cache_dir) {
            return Err(ConfigError::Validation(format!(
                "cache_dir must not end in a path separator: {}",
                self.cache_dir.display()
            )));
        }
        if self.thumbnails.quality == 0 || self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_width == 0 || self.thumbnails.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_width/max_height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.len() > 1 && s.ends_with(std::path::MAIN_SEPARATOR)
}

/// Extension allow-lists. All comparisons are lowercase, without the dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionsConfig {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    /// Formats browsers cannot render; served via one-time JPEG conversion.
    pub raw: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            images: ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "nef"]
                .map(String::from)
                .to_vec(),
            videos: ["mp4", "mkv", "mov", "webm", "avi", "m4v"]
                .map(String::from)
                .to_vec(),
            raw: vec!["nef".to_string()],
        }
    }
}

impl ExtensionsConfig {
    pub fn is_image(&self, ext: &str) -> bool {
        self.images.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_video(&self, ext: &str) -> bool {
        self.videos.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_raw(&self, ext: &str) -> bool {
        self.raw.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Extension is in either allow-list (the fast pre-filter used during
    /// scanning, before any content inspection).
    pub fn is_allowed(&self, ext: &str) -> bool {
        self.is_image(ext) || self.is_video(ext)
    }

    /// Lowercased extension of a path, if it has one.
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension().map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Pre-filter check straight from a path.
    pub fn path_allowed(&self, path: &Path) -> bool {
        Self::extension_of(path).is_some_and(|e| self.is_allowed(&e))
    }
}

/// Sort, filter and pagination defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    pub default_sort: String,
    pub default_order: String,
    /// Items per page. Zero means everything on a single page.
    pub page_size: usize,
    /// Files smaller than this many bytes are dropped from listings.
    pub min_file_size: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_sort: "name".to_string(),
            default_order: "asc".to_string(),
            page_size: 50,
            min_file_size: 1024,
        }
    }
}

/// Preview generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box the preview must fit inside. Aspect ratio is preserved
    /// and sources smaller than the box are never upscaled.
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG encoding quality (1-100).
    pub quality: u8,
    /// Seek offset for the video frame grab, in seconds.
    pub video_position: f64,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 400,
            quality: 85,
            video_position: 5.0,
        }
    }
}

/// Full-file serving policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadsConfig {
    pub enabled: bool,
    /// Largest file servable in full, in bytes.
    pub max_size: u64,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: 500 * 1024 * 1024,
        }
    }
}

/// Raw ignore lists as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IgnoreConfig {
    /// Glob patterns matched against file names.
    pub files: Vec<String>,
    /// Exact directory names.
    pub dirs: Vec<String>,
}

impl IgnoreConfig {
    /// Compile into the matcher used during scanning.
    pub fn compile(&self) -> Result<IgnoreRules, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.files {
            builder.add(Glob::new(pattern)?);
        }
        Ok(IgnoreRules {
            files: builder.build()?,
            dirs: self.dirs.iter().cloned().collect(),
        })
    }
}

/// Compiled ignore rules, applied per entry before any other processing.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    files: GlobSet,
    dirs: HashSet<String>,
}

impl IgnoreRules {
    /// Empty rule set (nothing ignored). Handy for tests.
    pub fn empty() -> Self {
        Self {
            files: GlobSet::empty(),
            dirs: HashSet::new(),
        }
    }

    pub fn ignores_file(&self, name: &str) -> bool {
        self.files.is_match(name)
    }

    pub fn ignores_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }
}

/// Print-ready stock config with inline documentation.
///
/// Used by `medley gen-config`.
pub fn stock_config_toml() -> String {
    r#"# medley configuration
# All options are optional - defaults shown below.

# Ordered list of gallery roots; first root containing a path wins.
# No trailing slashes. Must exist at startup.
roots = []

# Where generated previews live. Created at startup if missing.
cache_dir = ".cache"

[extensions]
images = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "nef"]
videos = ["mp4", "mkv", "mov", "webm", "avi", "m4v"]
raw    = ["nef"]          # served via full-size JPEG conversion

[listing]
default_sort = "name"     # name | size | created | modified | type | random
default_order = "asc"     # asc | desc
page_size = 50            # 0 = everything on one page
min_file_size = 1024      # files smaller than this are not listed (bytes)

[thumbnails]
max_width = 400           # bounding box, aspect ratio preserved
max_height = 400
quality = 85              # JPEG quality (1-100)
video_position = 5.0      # frame-grab offset into the video (seconds)

[downloads]
enabled = true
max_size = 524288000      # largest file servable in full (bytes)

[ignore]
files = []                # glob patterns matched against file names
dirs  = []                # exact directory names
"#
    .to_string()
}
