//! Track table and track detail pages

use super::{cluster_color, write_stat, Page, Renderer, Site};
use crate::format::{
    artwork_thumbnail, format_count, format_count_or, safe_url, truncate_chars, Escaped,
};
use crate::loader::Snapshot;
use crate::model::ClusteredTrack;
use crate::tracks::{PageItem, Pagination, SortKey, TrackQuery, TrackTable};
use std::fmt::{self, Write};

/// Description preview length on the detail page
const DESCRIPTION_PREVIEW: usize = 300;

/// `Showing 101-120 of 120 tracks`
pub fn range_label(table: &TrackTable) -> String {
    match table.range() {
        Some((start, end)) => format!(
            "Showing {}-{} of {} tracks",
            start,
            end,
            format_count(table.filtered().len() as u64)
        ),
        None => "No tracks match".to_string(),
    }
}

impl Renderer<'_> {
    /// The table as filtered/sorted/paged by `query`
    pub fn tracks(&self, snap: &Snapshot, table: &TrackTable, query: &TrackQuery) -> String {
        let mut body = String::new();
        let _ = self.write_tracks(&mut body, snap, table, query);
        self.layout(Page::Tracks, Page::Tracks.title(), &body)
    }

    fn write_tracks(
        &self,
        out: &mut String,
        snap: &Snapshot,
        table: &TrackTable,
        query: &TrackQuery,
    ) -> fmt::Result {
        let stats = table.stats();
        out.push_str(r#"<div class="stats">"#);
        write_stat(out, "total-tracks", &format_count(stats.total as u64), "Tracks")?;
        write_stat(out, "unique-artists", &format_count(stats.unique_artists as u64), "Artists")?;
        write_stat(out, "total-duration", &format!("{}h", stats.total_hours), "Total Duration")?;
        write_stat(out, "avg-duration", &format!("{:.1}m", stats.avg_minutes), "Avg Duration")?;
        out.push_str("</div>");

        if self.site == Site::Served {
            self.write_filters(out, snap, query)?;
        }

        write!(
            out,
            r#"<div class="muted" id="tracks-count">{}</div>"#,
            Escaped(&range_label(table))
        )?;
        out.push_str(
            r#"<div class="table-container"><table><thead><tr><th></th><th>Title</th><th>Artist</th><th>Duration</th><th>Genre</th><th>Cluster</th><th>Plays</th></tr></thead><tbody id="tracks-tbody">"#,
        );
        for t in table.visible() {
            self.write_row(out, t)?;
        }
        out.push_str("</tbody></table></div>");

        self.write_pagination(out, &table.pagination(), query)
    }

    fn write_filters(&self, out: &mut String, snap: &Snapshot, query: &TrackQuery) -> fmt::Result {
        write!(
            out,
            r#"<form class="filters auto-submit" method="get" action="{}"><input type="search" id="search-input" name="q" placeholder="Search title, artist or genre" value="{}">"#,
            self.site.href(Page::Tracks),
            Escaped(&query.q)
        )?;

        out.push_str(r#"<select id="cluster-filter" name="cluster"><option value="">All clusters</option>"#);
        for c in &snap.clusters.clusters {
            write!(
                out,
                r#"<option value="{}"{}>{} ({})</option>"#,
                Escaped(&c.id),
                if query.cluster == c.id { " selected" } else { "" },
                Escaped(&c.name),
                c.track_count
            )?;
        }
        out.push_str("</select>");

        out.push_str(r#"<select id="sort-select" name="sort">"#);
        let current = query.sort_key();
        for key in SortKey::ALL {
            write!(
                out,
                r#"<option value="{}"{}>{}</option>"#,
                key.as_str(),
                if key == current { " selected" } else { "" },
                key.label()
            )?;
        }
        out.push_str(r#"</select><button type="submit">Search</button></form>"#);
        Ok(())
    }

    fn write_row(&self, out: &mut String, t: &ClusteredTrack) -> fmt::Result {
        let track = &t.track;
        write!(
            out,
            r#"<tr><td>{art}</td><td class="title"><a href="{href}">{title}</a></td><td>{artist}</td><td>{duration}</td><td><span class="tag">{genre}</span></td><td><span class="tag" style="background: {color}; color: white;">{cluster}</span></td><td>{plays}</td></tr>"#,
            art = artwork_img(track.artwork_url.as_deref(), "track-artwork", true),
            href = Escaped(&self.site.track_href(track.track_id, track.url.as_deref())),
            title = Escaped(track.title()),
            artist = Escaped(track.artist()),
            duration = Escaped(track.duration.as_deref().unwrap_or("-")),
            genre = Escaped(track.genre.as_deref().unwrap_or("N/A")),
            color = cluster_color(&t.cluster_id),
            cluster = Escaped(&t.cluster_name),
            plays = format_count_or(track.plays, "-"),
        )
    }

    fn write_pagination(&self, out: &mut String, p: &Pagination, query: &TrackQuery) -> fmt::Result {
        out.push_str(r#"<div class="pagination" id="pagination">"#);
        for item in &p.items {
            match *item {
                PageItem::Prev { target, enabled } => self.write_page_link(out, query, target, "Prev", enabled, false)?,
                PageItem::Next { target, enabled } => self.write_page_link(out, query, target, "Next", enabled, false)?,
                PageItem::Page { number, active } => {
                    self.write_page_link(out, query, number, &number.to_string(), true, active)?
                }
                PageItem::Ellipsis => out.push_str(r#"<span class="disabled">...</span>"#),
            }
        }
        out.push_str("</div>");
        Ok(())
    }

    fn write_page_link(
        &self,
        out: &mut String,
        query: &TrackQuery,
        page: usize,
        label: &str,
        enabled: bool,
        active: bool,
    ) -> fmt::Result {
        if !enabled {
            return write!(out, r#"<span class="disabled">{}</span>"#, label);
        }
        write!(
            out,
            r#"<a href="{}"{}>{}</a>"#,
            self.site.tracks_href(&query.with_page(page)),
            if active { r#" class="active""# } else { "" },
            label
        )
    }

    /// One track: artwork, stats, description and the external link
    pub fn track_detail(&self, t: &ClusteredTrack) -> String {
        let mut body = String::new();
        let _ = self.write_track_detail(&mut body, t);
        self.layout(Page::Tracks, t.track.title(), &body)
    }

    fn write_track_detail(&self, out: &mut String, t: &ClusteredTrack) -> fmt::Result {
        let track = &t.track;
        write!(
            out,
            r#"<div class="card"><h2>{}</h2><div class="detail">{}<div>"#,
            Escaped(track.title()),
            artwork_img(track.artwork_url.as_deref(), "", false)
        )?;
        let rows = [
            ("Artist", track.artist().to_string()),
            ("Duration", track.duration.clone().unwrap_or_else(|| "N/A".into())),
            ("Genre", track.genre.clone().unwrap_or_else(|| "N/A".into())),
            ("Plays", format_count_or(track.plays, "N/A")),
            ("Likes", format_count_or(track.likes, "N/A")),
        ];
        for (label, value) in rows {
            write!(out, "<p><strong>{}:</strong> {}</p>", label, Escaped(&value))?;
        }
        write!(
            out,
            r#"<p><strong>Cluster:</strong> <span class="tag" style="background: {}; color: white;">{}</span></p></div></div>"#,
            cluster_color(&t.cluster_id),
            Escaped(&t.cluster_name)
        )?;

        if let Some(desc) = track.description.as_deref().filter(|d| !d.is_empty()) {
            write!(
                out,
                r#"<p class="muted" style="margin-top: 1rem;">{}...</p>"#,
                Escaped(truncate_chars(desc, DESCRIPTION_PREVIEW))
            )?;
        }
        write!(
            out,
            r#"<a class="btn" href="{}" target="_blank" rel="noopener">Open on SoundCloud</a><a class="btn btn-secondary" href="{}">Back to tracks</a></div>"#,
            Escaped(safe_url(track.url.as_deref())),
            self.site.href(Page::Tracks)
        )
    }
}

fn artwork_img(url: Option<&str>, class: &str, thumbnail: bool) -> String {
    match url.map(|u| safe_url(Some(u))).filter(|u| *u != "#") {
        Some(u) => {
            let src = if thumbnail { artwork_thumbnail(u) } else { u.to_string() };
            format!(r#"<img class="artwork {}" src="{}" alt="">"#, class, Escaped(&src))
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::InlineSvg;
    use crate::loader::fixtures;
    use crate::model::Track;
    use crate::tracks::flatten;

    fn render(site: Site, query: &TrackQuery) -> String {
        let snap = fixtures::snapshot();
        let all = flatten(&snap.clusters.clusters);
        let table = query.apply(&all);
        Renderer::new(site, &InlineSvg::default()).tracks(&snap, &table, query)
    }

    #[test]
    fn test_tracks_page_rows() {
        let html = render(Site::Served, &TrackQuery::default());
        assert!(html.contains(r#"id="total-tracks">3<"#));
        assert!(html.contains("Showing 1-3 of 3 tracks"));
        assert!(html.contains(r#"<a href="/tracks/2">Creep</a>"#));
        assert!(html.contains("90,000"));
        // Missing duration and genre fall back
        assert!(html.contains("<td>-</td>"));
        assert!(html.contains(r#"<span class="tag">N/A</span>"#));
    }

    #[test]
    fn test_tracks_page_filter_form() {
        let query = TrackQuery {
            q: "\"><script>".into(),
            cluster: "instrumental".into(),
            sort: "plays".into(),
            page: None,
        };
        let html = render(Site::Served, &query);
        assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
        assert!(html.contains(r#"<option value="instrumental" selected>Instrumental (1)</option>"#));
        assert!(html.contains(r#"<option value="plays" selected>Most played</option>"#));
        assert!(html.contains("No tracks match"));
    }

    #[test]
    fn test_tracks_page_static_has_no_form() {
        let html = render(Site::Static, &TrackQuery::default());
        assert!(!html.contains("<form"));
        // Static rows link out to the external page when there is one
        assert!(html.contains(r#"href="https://soundcloud.com/cure/lovesong""#));
    }

    #[test]
    fn test_pagination_markup() {
        let all: Vec<ClusteredTrack> = (0..120)
            .map(|i| ClusteredTrack {
                track: Track { track_id: Some(i), title: Some(format!("T{i}")), ..Default::default() },
                cluster_id: "c".into(),
                cluster_name: "C".into(),
            })
            .collect();
        let snap = Snapshot::default();
        let query = TrackQuery { cluster: "c".into(), page: Some(2), ..Default::default() };
        let table = query.apply(&all);
        let html = Renderer::new(Site::Served, &InlineSvg::default()).tracks(&snap, &table, &query);

        assert!(html.contains("Showing 51-100 of 120 tracks"));
        assert!(html.contains(r#"<a href="/tracks?cluster=c&amp;page=1">Prev</a>"#));
        assert!(html.contains(r#"<a href="/tracks?cluster=c&amp;page=2" class="active">2</a>"#));
        assert!(html.contains(r#"<a href="/tracks?cluster=c&amp;page=3">Next</a>"#));
    }

    #[test]
    fn test_track_detail() {
        let t = ClusteredTrack {
            track: Track {
                title: Some("Enta Omri".into()),
                artist: Some("Umm Kulthum".into()),
                description: Some("x".repeat(400)),
                plays: Some(1_000_000),
                url: Some("https://soundcloud.com/umm/enta-omri".into()),
                ..Default::default()
            },
            cluster_id: "arabic_classical".into(),
            cluster_name: "Arabic Classical".into(),
        };
        let html = Renderer::new(Site::Served, &InlineSvg::default()).track_detail(&t);
        assert!(html.contains("<title>Enta Omri · AutoEQ</title>"));
        assert!(html.contains("1,000,000"));
        assert!(html.contains(&format!("{}...", "x".repeat(300))));
        assert!(!html.contains(&"x".repeat(301)));
        assert!(html.contains("<strong>Likes:</strong> N/A"));
        assert!(html.contains("background: #ff5500"));
    }

    #[test]
    fn test_artwork_thumbnail_in_rows() {
        assert_eq!(
            artwork_img(Some("https://i1.sndcdn.com/a-large.jpg"), "track-artwork", true),
            r#"<img class="artwork track-artwork" src="https://i1.sndcdn.com/a-small.jpg" alt="">"#
        );
        assert_eq!(artwork_img(Some("data:image/png;base64,xx"), "", true), "");
        assert_eq!(artwork_img(None, "", true), "");
    }
}
