//! Track table: the filter → sort → page pipeline behind the Tracks page
//!
//! [`flatten`] derives the full list once from the cluster dataset. A
//! [`TrackTable`] borrows that list and owns the only mutable view state in
//! the program: the filtered subset, the sort key and the current page. A
//! table belongs to whoever created it (one request handler, one CLI
//! invocation) and nothing else writes to it.
//!
//! # Transitions
//!
//! | Call | Effect |
//! |------|--------|
//! | [`TrackTable::filter`] | recompute the subset, re-apply the sort, back to page 1 |
//! | [`TrackTable::sort`] | reorder the subset in place |
//! | [`TrackTable::go_to_page`] | move within `1..=total_pages`, otherwise no-op |

use crate::format::parse_timestamp;
use crate::model::{Cluster, ClusteredTrack, Track};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

/// Rows per page
pub const PAGE_SIZE: usize = 50;

/// How many page links to show on each side of the current page
const PAGE_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Artist,
    Duration,
    Plays,
    #[default]
    LikedAt,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::LikedAt,
        SortKey::Title,
        SortKey::Artist,
        SortKey::Duration,
        SortKey::Plays,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Artist => "artist",
            SortKey::Duration => "duration",
            SortKey::Plays => "plays",
            SortKey::LikedAt => "liked_at",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Title (A-Z)",
            SortKey::Artist => "Artist (A-Z)",
            SortKey::Duration => "Longest first",
            SortKey::Plays => "Most played",
            SortKey::LikedAt => "Recently liked",
        }
    }

    /// Unknown names fall back to the default (`liked_at`)
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every cluster's tracks in cluster order, tagged with their cluster.
///
/// A track listed under two clusters appears twice.
pub fn flatten(clusters: &[Cluster]) -> Vec<ClusteredTrack> {
    clusters
        .iter()
        .flat_map(|cluster| {
            cluster.tracks.iter().map(move |t| ClusteredTrack {
                track: t.clone(),
                cluster_id: cluster.id.clone(),
                cluster_name: cluster.name.clone(),
            })
        })
        .collect()
}

/// Number of distinct artist names (a missing artist counts as one name)
pub fn distinct_artists<'a, I>(tracks: I) -> usize
where
    I: IntoIterator<Item = &'a Track>,
{
    tracks.into_iter().map(Track::artist).collect::<HashSet<_>>().len()
}

/// Headline numbers for the Tracks page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackStats {
    pub total: usize,
    pub unique_artists: usize,
    pub total_hours: u64,
    pub avg_minutes: f64,
}

impl TrackStats {
    pub fn from_tracks(tracks: &[ClusteredTrack]) -> Self {
        let total_ms: u64 = tracks.iter().map(|t| t.track.duration_ms.unwrap_or(0)).sum();
        let avg_minutes = if tracks.is_empty() {
            0.0
        } else {
            total_ms as f64 / tracks.len() as f64 / 60_000.0
        };

        Self {
            total: tracks.len(),
            unique_artists: distinct_artists(tracks.iter().map(|t| &t.track)),
            total_hours: (total_ms as f64 / 3_600_000.0).round() as u64,
            avg_minutes,
        }
    }
}

/// One control in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    Prev { target: usize, enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { target: usize, enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total_pages: usize,
    pub items: Vec<PageItem>,
}

impl Pagination {
    /// Prev, a window of at most two pages either side of `current`, and
    /// first/last shortcuts with ellipses when the window stops short.
    pub fn new(current: usize, total_pages: usize) -> Self {
        let mut items = vec![PageItem::Prev {
            target: current.saturating_sub(1),
            enabled: current > 1,
        }];

        let start = current.saturating_sub(PAGE_WINDOW).max(1);
        let end = (current + PAGE_WINDOW).min(total_pages);

        if start > 1 {
            items.push(PageItem::Page { number: 1, active: false });
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }

        for number in start..=end {
            items.push(PageItem::Page { number, active: number == current });
        }

        if end < total_pages {
            if end + 1 < total_pages {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page { number: total_pages, active: false });
        }

        items.push(PageItem::Next {
            target: current + 1,
            enabled: current < total_pages,
        });

        Self { current, total_pages, items }
    }

    pub fn prev_enabled(&self) -> bool {
        self.items.iter().any(|i| matches!(i, PageItem::Prev { enabled: true, .. }))
    }

    pub fn next_enabled(&self) -> bool {
        self.items.iter().any(|i| matches!(i, PageItem::Next { enabled: true, .. }))
    }

    /// Page numbers shown, in order
    pub fn page_numbers(&self) -> Vec<usize> {
        self.items
            .iter()
            .filter_map(|i| match i {
                PageItem::Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }
}

/// Filtered, sorted, paginated view over the flattened track list
#[derive(Debug, Clone)]
pub struct TrackTable<'a> {
    all: &'a [ClusteredTrack],
    filtered: Vec<&'a ClusteredTrack>,
    current_page: usize,
    sort_key: Option<SortKey>,
}

impl<'a> TrackTable<'a> {
    /// Unfiltered, in flattened order, on page 1
    pub fn new(all: &'a [ClusteredTrack]) -> Self {
        Self {
            all,
            filtered: all.iter().collect(),
            current_page: 1,
            sort_key: None,
        }
    }

    pub fn filtered(&self) -> &[&'a ClusteredTrack] {
        &self.filtered
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Keep tracks whose title, artist or genre contains `query`
    /// (case-insensitive) and, when `cluster` is given and non-empty, that
    /// belong to it. Resets to page 1.
    pub fn filter(&mut self, query: &str, cluster: Option<&str>) {
        let needle = query.to_lowercase();
        let cluster = cluster.filter(|c| !c.is_empty());

        self.filtered = self
            .all
            .iter()
            .filter(|t| {
                let matches_search = needle.is_empty()
                    || [t.track.title(), t.track.artist(), t.track.genre()]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle));
                let matches_cluster = cluster.map_or(true, |c| t.cluster_id == c);
                matches_search && matches_cluster
            })
            .collect();

        self.current_page = 1;
        if let Some(key) = self.sort_key {
            self.sort(key);
        }
    }

    /// Reorder the filtered tracks. Text keys ascend, numbers and dates
    /// descend; missing numbers count as 0 and missing dates sort last.
    pub fn sort(&mut self, key: SortKey) {
        self.sort_key = Some(key);
        match key {
            SortKey::Title => self.filtered.sort_by_cached_key(|t| collation_key(t.track.title())),
            SortKey::Artist => self.filtered.sort_by_cached_key(|t| collation_key(t.track.artist())),
            SortKey::Duration => self
                .filtered
                .sort_by_key(|t| Reverse(t.track.duration_ms.unwrap_or(0))),
            SortKey::Plays => self.filtered.sort_by_key(|t| Reverse(t.track.plays.unwrap_or(0))),
            SortKey::LikedAt => self
                .filtered
                .sort_by_cached_key(|t| Reverse(t.track.liked_at.as_deref().and_then(parse_timestamp))),
        }
    }

    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    /// Move to `page`. Returns `false` and changes nothing when the page
    /// does not exist.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Rows on the current page
    pub fn visible(&self) -> &[&'a ClusteredTrack] {
        let start = ((self.current_page - 1) * PAGE_SIZE).min(self.filtered.len());
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        &self.filtered[start..end]
    }

    /// 1-based inclusive row range of the current page, `None` when empty
    pub fn range(&self) -> Option<(usize, usize)> {
        let visible = self.visible().len();
        if visible == 0 {
            return None;
        }
        let start = (self.current_page - 1) * PAGE_SIZE + 1;
        Some((start, start + visible - 1))
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.current_page, self.total_pages())
    }

    /// Look a track up by id across the full list
    pub fn find(&self, track_id: u64) -> Option<&'a ClusteredTrack> {
        self.all.iter().find(|t| t.track.track_id == Some(track_id))
    }

    pub fn stats(&self) -> TrackStats {
        TrackStats::from_tracks(self.all)
    }
}

/// Multi-level text ordering: base letters first (accents and case
/// ignored, so `Émile` sits between `Eliza` and `Eve`), then accents, then
/// the raw text.
fn collation_key(text: &str) -> (String, String, String) {
    let lower: String = text.chars().flat_map(char::to_lowercase).collect();
    let base: String = lower.nfd().filter(|c| !is_combining_mark(*c)).collect();
    (base, lower, text.to_string())
}

/// Track table state as carried in a URL: `?q=love&cluster=rock_alternative&sort=title&page=2`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackQuery {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl TrackQuery {
    /// Parse a query string; anything malformed yields the default view
    pub fn from_query_string(query: &str) -> Self {
        serde_urlencoded::from_str(query).unwrap_or_default()
    }

    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::parse(&self.sort)
    }

    pub fn cluster(&self) -> Option<&str> {
        Some(self.cluster.as_str()).filter(|c| !c.is_empty())
    }

    /// Same filters, different page
    pub fn with_page(&self, page: usize) -> Self {
        Self { page: Some(page), ..self.clone() }
    }

    /// Run the filter → sort → page pipeline over `all`.
    ///
    /// The search box text is trimmed first. A page outside the result is
    /// ignored and the table stays on page 1.
    pub fn apply<'a>(&self, all: &'a [ClusteredTrack]) -> TrackTable<'a> {
        let mut table = TrackTable::new(all);
        table.filter(self.q.trim(), self.cluster());
        table.sort(self.sort_key());
        if let Some(page) = self.page {
            table.go_to_page(page);
        }
        table
    }
}
