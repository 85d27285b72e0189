//! HTML pages
//!
//! Each page is a pure function of the [`Snapshot`](crate::loader::Snapshot)
//! (plus, for the Tracks page, a [`TrackTable`](crate::tracks::TrackTable)).
//! The same renderers back both the live server and the static build; the
//! only difference is how links are spelled, which [`Site`] decides.
//!
//! - [`dashboard`]: overview counts, cluster doughnut, account panel
//! - [`clusters`]: cluster cards and size distribution
//! - [`presets`]: 10-band EQ curves and downloads
//! - [`tracks`]: searchable/sortable/paginated track table and track details

pub mod clusters;
pub mod dashboard;
pub mod presets;
pub mod tracks;

use crate::chart::ChartSink;
use crate::format::{safe_url, Escaped};
use crate::loader::Download;
use crate::model::SampleTrack;
use crate::tracks::TrackQuery;
use std::fmt::{self, Write};

/// Colour for clusters outside the known palette
pub const DEFAULT_CLUSTER_COLOR: &str = "#6b7280";

/// Per-cluster accent colours
pub fn cluster_color(cluster_id: &str) -> &'static str {
    match cluster_id {
        "arabic_classical" => "#ff5500",
        "sufi_religious" => "#8b5cf6",
        "arabic_pop" => "#ec4899",
        "electronic_edm" => "#3b82f6",
        "instrumental" => "#10b981",
        "world_fusion" => "#f59e0b",
        "rock_alternative" => "#ef4444",
        "hip_hop_rap" => "#6366f1",
        _ => DEFAULT_CLUSTER_COLOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Clusters,
    Presets,
    Tracks,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Clusters, Page::Presets, Page::Tracks];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Clusters => "Clusters",
            Page::Presets => "EQ Presets",
            Page::Tracks => "Tracks",
        }
    }
}

/// How pages link to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// Served by `autoeq serve`: absolute paths, query-string state
    Served,
    /// Written by `autoeq build`: relative file names, no search form
    Static,
}

impl Site {
    pub fn href(self, page: Page) -> &'static str {
        match (self, page) {
            (Site::Served, Page::Dashboard) => "/",
            (Site::Served, Page::Clusters) => "/clusters",
            (Site::Served, Page::Presets) => "/eq-presets",
            (Site::Served, Page::Tracks) => "/tracks",
            (Site::Static, Page::Dashboard) => "index.html",
            (Site::Static, Page::Clusters) => "clusters.html",
            (Site::Static, Page::Presets) => "eq-presets.html",
            (Site::Static, Page::Tracks) => "tracks.html",
        }
    }

    /// Link to the card for `id` on `page`
    pub fn anchor(self, page: Page, id: &str) -> String {
        format!("{}#{}", self.href(page), Escaped(id))
    }

    /// Tracks page for a query. Static builds only have the default view,
    /// one file per page.
    pub fn tracks_href(self, query: &TrackQuery) -> String {
        match self {
            Site::Served => {
                let qs = query.to_query_string();
                if qs.is_empty() {
                    "/tracks".to_string()
                } else {
                    format!("/tracks?{}", Escaped(&qs))
                }
            }
            Site::Static => static_tracks_file(query.page.unwrap_or(1)),
        }
    }

    /// Detail view for a track, or its external page when there is none
    pub fn track_href(self, track_id: Option<u64>, url: Option<&str>) -> String {
        match (self, track_id) {
            (Site::Served, Some(id)) => format!("/tracks/{}", id),
            _ => safe_url(url).to_string(),
        }
    }

    pub fn download_href(self, which: Download) -> String {
        match self {
            Site::Served => format!("/download/{}", which.file_name()),
            Site::Static => which.file_name().to_string(),
        }
    }
}

/// File name of page `n` of the static track table
pub fn static_tracks_file(page: usize) -> String {
    if page <= 1 {
        "tracks.html".to_string()
    } else {
        format!("tracks-{}.html", page)
    }
}

/// Renders pages for one site flavour with one chart backend
pub struct Renderer<'a> {
    pub site: Site,
    pub charts: &'a dyn ChartSink,
}

impl<'a> Renderer<'a> {
    pub fn new(site: Site, charts: &'a dyn ChartSink) -> Self {
        Self { site, charts }
    }

    /// Wrap a page body in the shared document shell and navigation
    pub fn layout(&self, active: Page, title: &str, body: &str) -> String {
        let mut nav = String::new();
        for page in Page::ALL {
            let _ = write!(
                nav,
                r#"<a href="{}"{}>{}</a>"#,
                self.site.href(page),
                if page == active { r#" class="active""# } else { "" },
                page.title()
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · AutoEQ</title>
    {chart_head}
    <style>{style}</style>
</head>
<body>
    <nav class="nav"><span class="logo">AutoEQ</span>{nav}</nav>
    <main class="container">
{body}
    </main>
    <script>{script}</script>
</body>
</html>
"#,
            title = Escaped(title),
            chart_head = self.charts.head(),
            style = STYLE,
            nav = nav,
            body = body,
            script = SCRIPT,
        )
    }

    pub fn not_found(&self, what: &str) -> String {
        let body = format!(
            r#"<div class="card"><h2>Not found</h2><p class="muted">{}</p></div>"#,
            Escaped(what)
        );
        self.layout(Page::Dashboard, "Not found", &body)
    }

    pub fn server_error(&self, what: &str) -> String {
        let body = format!(
            r#"<div class="card"><h2>Something went wrong</h2><p class="muted">{}</p></div>"#,
            Escaped(what)
        );
        self.layout(Page::Dashboard, "Error", &body)
    }
}

/// A headline number with its caption
pub(crate) fn write_stat(out: &mut String, id: &str, value: &str, label: &str) -> fmt::Result {
    write!(
        out,
        r#"<div class="stat"><div class="stat-value" id="{}">{}</div><div class="stat-label">{}</div></div>"#,
        Escaped(id),
        Escaped(value),
        Escaped(label)
    )
}

/// Title/artist rows linking out to the track's page
pub(crate) fn write_sample_tracks(out: &mut String, tracks: &[SampleTrack]) -> fmt::Result {
    out.push_str(r#"<div class="tracks-list">"#);
    for t in tracks {
        write!(
            out,
            r#"<a class="track-item" href="{url}" target="_blank" rel="noopener"><div class="track-info"><div class="track-title">{title}</div><div class="track-artist">{artist}</div></div></a>"#,
            url = Escaped(safe_url(t.url.as_deref())),
            title = Escaped(t.title.as_deref().unwrap_or("")),
            artist = Escaped(t.artist.as_deref().unwrap_or("")),
        )?;
    }
    out.push_str("</div>");
    Ok(())
}

/// Behaviour is bound once here; markup carries no inline handlers
const SCRIPT: &str = r#"
document.querySelectorAll('form.auto-submit select').forEach(function (el) {
    el.addEventListener('change', function () { el.form.submit(); });
});
document.querySelectorAll('img.artwork').forEach(function (img) {
    img.addEventListener('error', function () { img.style.display = 'none'; });
});
"#;

const STYLE: &str = r#"
:root {
    --bg: #0f0f0f;
    --card: #1a1a1a;
    --border: #2a2a2a;
    --text: #f0f0f0;
    --text-muted: #a0a0a0;
    --primary: #ff5500;
    --positive: #ff5500;
    --negative: #3b82f6;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    background: var(--bg);
    color: var(--text);
    line-height: 1.5;
}
a { color: inherit; text-decoration: none; }
.nav { display: flex; gap: 1.5rem; align-items: center; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
.nav a { color: var(--text-muted); }
.nav a.active, .nav a:hover { color: var(--primary); }
.logo { font-weight: 800; font-size: 1.4rem; color: var(--primary); margin-right: 1rem; }
.container { max-width: 1400px; margin: 0 auto; padding: 2rem; }
.muted { color: var(--text-muted); }
.stats { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; margin-bottom: 2rem; }
.stat { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; text-align: center; }
.stat-value { font-size: 2.25rem; font-weight: 700; line-height: 1; color: var(--primary); }
.stat-label { color: var(--text-muted); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; margin-bottom: 1.5rem; }
.card h2 { font-size: 1.1rem; margin-bottom: 1rem; }
.card h3 { font-size: 1rem; color: var(--text-muted); margin: 1rem 0 0.5rem; }
.chart-box { position: relative; height: 300px; }
.legend { display: flex; flex-wrap: wrap; gap: 0.75rem; margin-top: 1rem; }
.legend-item { display: flex; align-items: center; gap: 0.4rem; font-size: 0.85rem; }
.legend-color { width: 12px; height: 12px; border-radius: 50%; }
.cluster-item, .eq-item { display: flex; justify-content: space-between; padding: 0.6rem 0; border-bottom: 1px solid var(--border); }
.cluster-count { color: var(--primary); font-weight: 600; }
.tracks-list { overflow-y: auto; max-height: 220px; }
.track-item { display: flex; align-items: center; gap: 0.75rem; padding: 0.5rem 0; border-bottom: 1px solid var(--border); }
.track-artwork { width: 40px; height: 40px; border-radius: 4px; object-fit: cover; }
.track-title { font-weight: 500; }
.track-artist, .track-meta { color: var(--text-muted); font-size: 0.85rem; }
.track-meta { margin-left: auto; }
.user-stat { display: flex; justify-content: space-between; padding: 0.4rem 0; }
.user-stat-label { color: var(--text-muted); }
.tag { display: inline-block; padding: 0.15rem 0.6rem; border-radius: 12px; background: var(--border); font-size: 0.75rem; margin: 0 0.25rem 0.25rem 0; }
.btn { display: inline-block; padding: 0.5rem 1rem; border-radius: 8px; background: var(--primary); color: white; margin-top: 1rem; margin-right: 0.5rem; }
.btn-secondary { background: var(--border); color: var(--text); }
.eq-visualizer { display: flex; gap: 0.5rem; align-items: stretch; height: 220px; margin: 1rem 0; }
.eq-band { flex: 1; display: flex; flex-direction: column; align-items: center; }
.eq-db { font-size: 0.75rem; height: 1.2rem; }
.eq-bar-container { position: relative; flex: 1; width: 100%; }
.eq-zero-line { position: absolute; top: 50%; left: 0; right: 0; border-top: 1px dashed var(--border); }
.eq-bar { position: absolute; bottom: 50%; left: 25%; width: 50%; background: var(--positive); border-radius: 3px 3px 0 0; }
.eq-bar.negative { bottom: auto; top: 50%; background: var(--negative); border-radius: 0 0 3px 3px; }
.eq-freq { font-size: 0.75rem; color: var(--text-muted); }
.filters { display: flex; gap: 1rem; margin-bottom: 1rem; }
.filters input, .filters select, .filters button { background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 8px; padding: 0.5rem 0.75rem; }
.filters input { flex: 1; }
.table-container { background: var(--card); border: 1px solid var(--border); border-radius: 12px; overflow: auto; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 0.6rem 1rem; text-align: left; border-bottom: 1px solid var(--border); }
th { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--text-muted); }
td.title { max-width: 300px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.pagination { display: flex; gap: 0.35rem; justify-content: center; margin-top: 1rem; }
.pagination a, .pagination span { padding: 0.35rem 0.75rem; border: 1px solid var(--border); border-radius: 6px; }
.pagination a.active { background: var(--primary); border-color: var(--primary); }
.pagination span.disabled { color: var(--text-muted); opacity: 0.5; }
.detail { display: flex; gap: 1.5rem; }
.detail img { width: 150px; height: 150px; border-radius: 8px; object-fit: cover; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::InlineSvg;

    #[test]
    fn test_cluster_palette() {
        assert_eq!(cluster_color("rock_alternative"), "#ef4444");
        assert_eq!(cluster_color("something_new"), DEFAULT_CLUSTER_COLOR);
    }

    #[test]
    fn test_site_links() {
        assert_eq!(Site::Served.href(Page::Presets), "/eq-presets");
        assert_eq!(Site::Static.href(Page::Dashboard), "index.html");
        assert_eq!(Site::Served.anchor(Page::Clusters, "arabic_pop"), "/clusters#arabic_pop");
        assert_eq!(Site::Static.anchor(Page::Presets, "arabic_pop"), "eq-presets.html#arabic_pop");
        assert_eq!(Site::Served.download_href(Download::Presets), "/download/eq_presets.json");
        assert_eq!(Site::Static.download_href(Download::DetailedPresets), "eq_presets_detailed.json");
    }

    #[test]
    fn test_tracks_href() {
        let q = TrackQuery { q: "a&b".into(), page: Some(2), ..Default::default() };
        assert_eq!(Site::Served.tracks_href(&q), "/tracks?q=a%26b&amp;page=2");
        assert_eq!(Site::Served.tracks_href(&TrackQuery::default()), "/tracks");
        assert_eq!(Site::Static.tracks_href(&q), "tracks-2.html");
        assert_eq!(Site::Static.tracks_href(&TrackQuery::default()), "tracks.html");
    }

    #[test]
    fn test_track_href() {
        assert_eq!(Site::Served.track_href(Some(5), None), "/tracks/5");
        assert_eq!(
            Site::Static.track_href(Some(5), Some("https://soundcloud.com/x")),
            "https://soundcloud.com/x"
        );
        assert_eq!(Site::Served.track_href(None, Some("javascript:x")), "#");
    }

    #[test]
    fn test_layout_marks_active_page() {
        let svg = InlineSvg::default();
        let renderer = Renderer::new(Site::Served, &svg);
        let html = renderer.layout(Page::Tracks, "Tracks", "<p>body</p>");
        assert!(html.contains(r#"<a href="/tracks" class="active">Tracks</a>"#));
        assert!(html.contains(r#"<a href="/">Dashboard</a>"#));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn test_sample_tracks_escaped() {
        let mut out = String::new();
        write_sample_tracks(
            &mut out,
            &[SampleTrack {
                title: Some("<b>bold</b>".into()),
                artist: None,
                url: Some("javascript:alert(1)".into()),
            }],
        )
        .unwrap();
        assert!(out.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(out.contains(r##"href="#""##));
    }
}
