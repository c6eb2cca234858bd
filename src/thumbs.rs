//! The on-disk preview cache.
//!
//! Cache layout mirrors the source roots: a media file at
//! `root/a/b/c.ext` gets its thumbnail at `cache/a/b/c.jpg`, and a
//! full-size browsable conversion (for RAW formats) at
//! `cache/a/b/cORIGINAL.jpg`. The path mapping is deterministic, so the
//! existence of the mapped path is the entire cache-hit test. There is no
//! index, no TTL, and no invalidation when a source changes; the cache only
//! grows, and the expensive work it absorbs (decode + encode, frame grabs)
//! is exactly the work worth never repeating.
//!
//! Concurrent misses for the same source race freely. Generation is
//! deterministic per source, so last-writer-wins produces an equivalent
//! file; duplicate work is accepted instead of locking.
//!
//! Generation paths:
//! - **Images**: decode via the `image` crate (animated formats contribute
//!   their first frame), normalize to RGB8, shrink to fit the configured
//!   bounding box (never upscale), encode JPEG at the configured quality.
//! - **Videos**: one `ffmpeg` invocation grabs a single frame at the
//!   configured offset, scaled shrink-only into the bounding box, written
//!   straight to the cache path.
//! - **RAW**: one ImageMagick `convert` invocation produces the full-size
//!   JPEG under the `ORIGINAL` suffix so it never collides with the
//!   thumbnail of the same source.
//!
//! Any failure leaves the cache path absent; the next request simply
//! retries. That is the only retry mechanism.

use crate::classify::{self, MediaKind};
use crate::config::ThumbnailsConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("not a supported media file")]
    NotMedia,
    #[error("image processing failed: {0}")]
    Image(String),
    #[error("{tool} failed: {reason}")]
    Tool { tool: &'static str, reason: String },
}

/// The prepared cache directory.
///
/// Produced once at startup by [`CacheRoot::prepare`], then passed by
/// reference into every cache operation. Holding a value proves the
/// directory exists; no ambient global state.
#[derive(Debug, Clone)]
pub struct CacheRoot(PathBuf);

impl CacheRoot {
    /// Create the cache directory if needed and wrap it.
    pub fn prepare(path: &Path) -> io::Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self(path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Thumbnail location for a source file, given its root-relative path.
    ///
    /// Same relative directory, same stem, `.jpg` extension. Deterministic,
    /// and `..`/root components are stripped so the result cannot escape
    /// the cache root.
    pub fn thumbnail_path(&self, relative_source: &Path) -> PathBuf {
        self.mapped(relative_source, "")
    }

    /// Full-size conversion location for a source file. The `ORIGINAL`
    /// stem suffix keeps it disjoint from the thumbnail of the same source.
    pub fn original_path(&self, relative_source: &Path) -> PathBuf {
        self.mapped(relative_source, "ORIGINAL")
    }

    fn mapped(&self, relative_source: &Path, stem_suffix: &str) -> PathBuf {
        let mut out = self.0.clone();
        if let Some(parent) = relative_source.parent() {
            for comp in parent.components() {
                if let Component::Normal(part) = comp {
                    out.push(part);
                }
            }
        }
        let stem = relative_source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        out.push(format!("{stem}{stem_suffix}.jpg"));
        out
    }
}

/// Lazily generates previews into a [`CacheRoot`].
pub struct Thumbnailer<'a> {
    config: &'a ThumbnailsConfig,
    cache: &'a CacheRoot,
}

impl<'a> Thumbnailer<'a> {
    pub fn new(config: &'a ThumbnailsConfig, cache: &'a CacheRoot) -> Self {
        Self { config, cache }
    }

    /// Return the JPEG preview for a source file, generating on miss.
    ///
    /// `relative_source` is the path relative to the owning root (it keys
    /// the cache); `source` is the resolved absolute path.
    pub fn thumbnail(&self, source: &Path, relative_source: &Path) -> Result<PathBuf, ThumbError> {
        let dest = self.cache.thumbnail_path(relative_source);
        if dest.exists() {
            return Ok(dest);
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match classify::classify(source) {
            Some(MediaKind::Image) => self.generate_image(source, &dest)?,
            Some(MediaKind::Video) => self.extract_video_frame(source, &dest)?,
            None => return Err(ThumbError::NotMedia),
        }
        Ok(dest)
    }

    /// Return the full-size browsable conversion for a RAW source,
    /// generating on miss via ImageMagick.
    pub fn convert_original(
        &self,
        source: &Path,
        relative_source: &Path,
    ) -> Result<PathBuf, ThumbError> {
        let dest = self.cache.original_path(relative_source);
        if dest.exists() {
            return Ok(dest);
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        run_tool(
            "convert",
            Command::new("convert").arg(source).arg(&dest),
            &dest,
        )?;
        Ok(dest)
    }

    fn generate_image(&self, source: &Path, dest: &Path) -> Result<(), ThumbError> {
        let decoded = image::open(source)
            .map_err(|e| ThumbError::Image(format!("decode {}: {e}", source.display())))?;
        let rgb = decoded.to_rgb8();

        // Shrink-only fit inside the bounding box
        let (max_w, max_h) = (self.config.max_width, self.config.max_height);
        let rgb = if rgb.width() > max_w || rgb.height() > max_h {
            image::DynamicImage::ImageRgb8(rgb)
                .resize(max_w, max_h, FilterType::Lanczos3)
                .to_rgb8()
        } else {
            rgb
        };

        let result = (|| {
            let file = fs::File::create(dest)?;
            let writer = io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, self.config.quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| io::Error::other(e.to_string()))
        })();

        if let Err(err) = result {
            discard_partial(dest);
            return Err(ThumbError::Image(format!(
                "encode {}: {err}",
                dest.display()
            )));
        }
        Ok(())
    }

    fn extract_video_frame(&self, source: &Path, dest: &Path) -> Result<(), ThumbError> {
        let scale = format!(
            "scale={}:{}:force_original_aspect_ratio=decrease",
            self.config.max_width, self.config.max_height
        );
        run_tool(
            "ffmpeg",
            Command::new("ffmpeg")
                .arg("-i")
                .arg(source)
                .args(["-ss", &self.config.video_position.to_string()])
                .args(["-vframes", "1"])
                .args(["-vf", &scale])
                .arg("-y")
                .arg(dest),
            dest,
        )
    }
}

/// Run an external conversion tool, discarding its output unless it fails.
///
/// A failed run must leave the cache path absent so the next miss retries.
fn run_tool(tool: &'static str, command: &mut Command, dest: &Path) -> Result<(), ThumbError> {
    let output = match command.output() {
        Ok(out) => out,
        Err(err) => {
            // Covers a missing binary as well as spawn failures
            discard_partial(dest);
            tracing::warn!(tool, error = %err, "external tool could not be run");
            return Err(ThumbError::Tool {
                tool,
                reason: err.to_string(),
            });
        }
    };
    if !output.status.success() || !dest.exists() {
        discard_partial(dest);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(tool, status = ?output.status.code(), stderr = %stderr, "external tool failed");
        return Err(ThumbError::Tool {
            tool,
            reason: format!("exit status {:?}", output.status.code()),
        });
    }
    Ok(())
}

fn discard_partial(dest: &Path) {
    let _ = fs::remove_file(dest);
}
