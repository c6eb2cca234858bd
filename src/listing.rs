//! Listing policy: filter, sort, paginate.
//!
//! Pure functions over scanned entries. Everything here must be
//! deterministic for non-random sort keys: pagination is only correct if
//! two identical requests see identical orderings, so the sort is stable
//! and tie-breaks on nothing beyond the key (stable sort preserves scan
//! order for equal keys).
//!
//! Directories always sort before files, whatever the key and order, with
//! one exception: `random` shuffles the whole set with no type precedence.

use crate::scan::Entry;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort key for a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Size,
    Created,
    Modified,
    /// Videos before non-videos, then by name.
    Type,
    /// Uniform shuffle; ignores the requested order.
    Random,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            "created" => Ok(Self::Created),
            "modified" => Ok(Self::Modified),
            "type" => Ok(Self::Type),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Sort direction. Has no effect under [`SortKey::Random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Items per page, with an explicit everything-on-one-page sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    All,
    Limit(usize),
}

impl PageSize {
    /// Config encodes "all" as zero.
    pub fn from_config(n: usize) -> Self {
        if n == 0 {
            Self::All
        } else {
            Self::Limit(n)
        }
    }
}

/// One listing request's policy knobs.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Case-insensitive substring match on entry names. Empty matches all.
    pub filter: String,
    pub sort: SortKey,
    pub order: SortOrder,
    /// 1-indexed; clamped into the valid range.
    pub page: usize,
    pub page_size: PageSize,
}

/// A page of results plus the navigation list.
#[derive(Debug, Serialize)]
pub struct Listing {
    /// The requested page slice.
    pub items: Vec<Entry>,
    /// All file entries after filter+sort, ignoring pagination. Drives
    /// prev/next navigation across page boundaries.
    pub all_files: Vec<Entry>,
    pub total_items: usize,
    pub total_pages: usize,
    /// The page actually served, after clamping.
    pub page: usize,
}

/// Apply filter, sort and pagination policy to a scanned entry set.
pub fn build_listing(mut entries: Vec<Entry>, query: &ListQuery) -> Listing {
    if !query.filter.is_empty() {
        let needle = query.filter.to_lowercase();
        entries.retain(|e| e.name.to_lowercase().contains(&needle));
    }

    sort_entries(&mut entries, query.sort, query.order);

    let all_files: Vec<Entry> = entries.iter().filter(|e| e.is_file()).cloned().collect();

    let total_items = entries.len();
    let (total_pages, page, items) = match query.page_size {
        PageSize::All => (1, 1, entries),
        PageSize::Limit(per_page) => {
            let total_pages = total_items.div_ceil(per_page).max(1);
            let page = query.page.clamp(1, total_pages);
            let start = (page - 1) * per_page;
            let end = (start + per_page).min(total_items);
            let items = if start < total_items {
                entries[start..end].to_vec()
            } else {
                Vec::new()
            };
            (total_pages, page, items)
        }
    };

    Listing {
        items,
        all_files,
        total_items,
        total_pages,
        page,
    }
}

/// Sort in place. Stable for all non-random keys.
pub fn sort_entries(entries: &mut [Entry], sort: SortKey, order: SortOrder) {
    if sort == SortKey::Random {
        entries.shuffle(&mut rand::thread_rng());
        return;
    }

    entries.sort_by(|a, b| {
        // Directories first, regardless of key and order
        let type_rank = a.is_file().cmp(&b.is_file());
        let keyed = compare_by_key(a, b, sort);
        let keyed = match order {
            SortOrder::Asc => keyed,
            SortOrder::Desc => keyed.reverse(),
        };
        type_rank.then(keyed)
    });
}

fn compare_by_key(a: &Entry, b: &Entry, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Size => a.size.cmp(&b.size),
        SortKey::Created => a.created.cmp(&b.created),
        SortKey::Modified => a.modified.cmp(&b.modified),
        SortKey::Type => (!a.is_video, a.name.to_lowercase())
            .cmp(&(!b.is_video, b.name.to_lowercase())),
        SortKey::Random => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::EntryKind;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn entry(name: &str, kind: EntryKind, size: u64, modified: u64, is_video: bool) -> Entry {
        Entry {
            kind,
            name: name.to_string(),
            relative_path: PathBuf::from(name),
            owning_root: PathBuf::from("/root"),
            size,
            created: modified,
            modified,
            is_image: kind == EntryKind::File && !is_video,
            is_video,
            is_folder: kind == EntryKind::Directory,
            thumbnail_source: None,
        }
    }

    fn file(name: &str, size: u64) -> Entry {
        entry(name, EntryKind::File, size, 100, false)
    }

    fn video(name: &str) -> Entry {
        entry(name, EntryKind::File, 10, 100, true)
    }

    fn folder(name: &str) -> Entry {
        entry(name, EntryKind::Directory, 0, 100, false)
    }

    fn query(sort: SortKey, order: SortOrder) -> ListQuery {
        ListQuery {
            filter: String::new(),
            sort,
            order,
            page: 1,
            page_size: PageSize::All,
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn filter_is_case_insensitive_substring() {
        let entries = vec![file("cat.jpg", 1), file("dog.jpg", 1), file("Category", 1)];
        let listing = build_listing(
            entries,
            &ListQuery {
                filter: "cat".into(),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(names(&listing.items), vec!["cat.jpg", "Category"]);
    }

    #[test]
    fn empty_filter_matches_all() {
        let entries = vec![file("a.jpg", 1), file("b.jpg", 1)];
        let listing = build_listing(entries, &query(SortKey::Name, SortOrder::Asc));
        assert_eq!(listing.total_items, 2);
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    #[test]
    fn directories_precede_files_for_every_non_random_key() {
        for sort in [
            SortKey::Name,
            SortKey::Size,
            SortKey::Created,
            SortKey::Modified,
            SortKey::Type,
        ] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let mut entries = vec![file("aaa.jpg", 1), folder("zzz"), file("bbb.jpg", 2)];
                sort_entries(&mut entries, sort, order);
                assert_eq!(
                    entries[0].name, "zzz",
                    "dir must come first for {sort:?}/{order:?}"
                );
            }
        }
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut entries = vec![file("Banana.jpg", 1), file("apple.jpg", 1), file("Cherry.jpg", 1)];
        sort_entries(&mut entries, SortKey::Name, SortOrder::Asc);
        assert_eq!(names(&entries), vec!["apple.jpg", "Banana.jpg", "Cherry.jpg"]);
    }

    #[test]
    fn desc_reverses_key_order() {
        let mut entries = vec![file("small.jpg", 1), file("big.jpg", 100)];
        sort_entries(&mut entries, SortKey::Size, SortOrder::Desc);
        assert_eq!(names(&entries), vec!["big.jpg", "small.jpg"]);
    }

    #[test]
    fn type_sort_puts_videos_before_images() {
        let mut entries = vec![file("img.jpg", 1), video("clip.mp4"), file("art.png", 1)];
        sort_entries(&mut entries, SortKey::Type, SortOrder::Asc);
        assert_eq!(names(&entries), vec!["clip.mp4", "art.png", "img.jpg"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        for sort in [SortKey::Name, SortKey::Size, SortKey::Modified, SortKey::Type] {
            let mut entries = vec![
                file("b.jpg", 3),
                folder("x"),
                video("a.mp4"),
                file("c.jpg", 1),
            ];
            sort_entries(&mut entries, sort, SortOrder::Asc);
            let once: Vec<String> = names(&entries).iter().map(|s| s.to_string()).collect();
            sort_entries(&mut entries, sort, SortOrder::Asc);
            assert_eq!(names(&entries), once, "second sort changed order for {sort:?}");
        }
    }

    #[test]
    fn random_preserves_contents() {
        let entries: Vec<Entry> = (0..50).map(|i| file(&format!("{i}.jpg"), i)).collect();
        let expected: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();

        let listing = build_listing(entries, &query(SortKey::Random, SortOrder::Desc));
        let got: HashSet<String> = listing.items.iter().map(|e| e.name.clone()).collect();
        assert_eq!(got, expected);
        assert_eq!(listing.total_items, 50);
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    #[test]
    fn pages_partition_without_overlap_or_gaps() {
        let entries: Vec<Entry> = (0..23).map(|i| file(&format!("{i:02}.jpg"), i)).collect();
        let per_page = 5;

        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let listing = build_listing(
                entries.clone(),
                &ListQuery {
                    page,
                    page_size: PageSize::Limit(per_page),
                    ..query(SortKey::Name, SortOrder::Asc)
                },
            );
            assert_eq!(listing.total_pages, 5);
            seen.extend(names(&listing.items).iter().map(|s| s.to_string()));
            if page == listing.total_pages {
                break;
            }
            page += 1;
        }

        assert_eq!(seen.len(), 23);
        let unique: HashSet<&String> = seen.iter().collect();
        assert_eq!(unique.len(), 23);
    }

    #[test]
    fn page_clamped_to_valid_range() {
        let entries: Vec<Entry> = (0..10).map(|i| file(&format!("{i}.jpg"), i)).collect();
        let listing = build_listing(
            entries.clone(),
            &ListQuery {
                page: 99,
                page_size: PageSize::Limit(4),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(listing.page, 3);
        assert_eq!(listing.items.len(), 2);

        let listing = build_listing(
            entries,
            &ListQuery {
                page: 0,
                page_size: PageSize::Limit(4),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(listing.page, 1);
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let listing = build_listing(
            Vec::new(),
            &ListQuery {
                page: 7,
                page_size: PageSize::Limit(10),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(listing.total_items, 0);
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.page, 1);
        assert!(listing.items.is_empty());
    }

    #[test]
    fn page_size_all_is_a_single_page() {
        let entries: Vec<Entry> = (0..137).map(|i| file(&format!("{i}.jpg"), i)).collect();
        let listing = build_listing(
            entries,
            &ListQuery {
                page: 3,
                page_size: PageSize::All,
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.page, 1);
        assert_eq!(listing.items.len(), 137);
    }

    #[test]
    fn page_size_zero_in_config_means_all() {
        assert_eq!(PageSize::from_config(0), PageSize::All);
        assert_eq!(PageSize::from_config(50), PageSize::Limit(50));
    }

    // =========================================================================
    // Navigation list
    // =========================================================================

    #[test]
    fn all_files_excludes_directories_and_spans_pages() {
        let mut entries: Vec<Entry> = (0..8).map(|i| file(&format!("{i}.jpg"), i)).collect();
        entries.push(folder("album"));

        let listing = build_listing(
            entries,
            &ListQuery {
                page: 1,
                page_size: PageSize::Limit(3),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(listing.all_files.len(), 8);
        assert!(listing.all_files.iter().all(|e| e.is_file()));
        // Navigation list follows the same ordering as the pages
        assert_eq!(listing.all_files[0].name, "0.jpg");
    }

    #[test]
    fn all_files_respects_filter() {
        let entries = vec![file("cat.jpg", 1), file("dog.jpg", 1)];
        let listing = build_listing(
            entries,
            &ListQuery {
                filter: "cat".into(),
                ..query(SortKey::Name, SortOrder::Asc)
            },
        );
        assert_eq!(names(&listing.all_files), vec!["cat.jpg"]);
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn sort_key_round_trips_from_str() {
        for (s, k) in [
            ("name", SortKey::Name),
            ("size", SortKey::Size),
            ("created", SortKey::Created),
            ("modified", SortKey::Modified),
            ("type", SortKey::Type),
            ("random", SortKey::Random),
        ] {
            assert_eq!(s.parse::<SortKey>().unwrap(), k);
        }
        assert!("newest".parse::<SortKey>().is_err());
    }

    #[test]
    fn sort_order_from_str() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }
}
