//! CLI output formatting.
//!
//! Entries lead with their name; size, media kind and preview sources are
//! secondary context. Each display has a `format_*` function (returns
//! `Vec<String>`) for testability and a `print_*` wrapper that writes to
//! stdout. Format functions are pure.
//!
//! ```text
//! holidays/
//!     Preview: holidays/2024/beach.jpg
//! beach.jpg (image, 2.4 MB)
//! clip.mp4 (video, 148.0 MB)
//!
//! Page 1 of 3 (23 items, 19 files)
//! ```

use crate::listing::Listing;
use crate::scan::Entry;

/// Human-readable byte size, one decimal from KB upward.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

fn entry_line(entry: &Entry) -> String {
    if entry.is_folder {
        format!("{}/", entry.name)
    } else {
        let kind = if entry.is_video { "video" } else { "image" };
        format!("{} ({}, {})", entry.name, kind, format_size(entry.size))
    }
}

/// Format one listing page plus its pagination summary.
pub fn format_listing(listing: &Listing) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &listing.items {
        lines.push(entry_line(entry));
        if let Some(source) = &entry.thumbnail_source {
            lines.push(format!("    Preview: {}", source.display()));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Page {} of {} ({} items, {} files)",
        listing.page,
        listing.total_pages,
        listing.total_items,
        listing.all_files.len()
    ));
    lines
}

/// Print a listing page to stdout.
pub fn print_listing(listing: &Listing) {
    for line in format_listing(listing) {
        println!("{}", line);
    }
}
