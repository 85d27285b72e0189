//! Overview page

use super::{cluster_color, write_stat, Page, Renderer};
use crate::chart::{Chart, ChartKind};
use crate::format::{
    format_count, format_count_or, format_date, format_datetime, safe_url, Escaped,
};
use crate::loader::Snapshot;
use crate::model::AccountSnapshot;
use crate::tracks::distinct_artists;
use std::fmt::{self, Write};

const TOP_CLUSTERS: usize = 5;
const PRESET_PREVIEW: usize = 4;
const RECENT_TRACKS: usize = 5;

impl Renderer<'_> {
    pub fn dashboard(&self, snap: &Snapshot) -> String {
        let mut body = String::new();
        // Writing into a String cannot fail
        let _ = self.write_dashboard(&mut body, snap);
        self.layout(Page::Dashboard, Page::Dashboard.title(), &body)
    }

    fn write_dashboard(&self, out: &mut String, snap: &Snapshot) -> fmt::Result {
        let clusters = &snap.clusters.clusters;

        out.push_str(r#"<div class="stats">"#);
        write_stat(out, "total-tracks", &format_count(snap.likes.track_count as u64), "Liked Tracks")?;
        write_stat(out, "total-clusters", &clusters.len().to_string(), "Clusters")?;
        let artists = distinct_artists(&snap.likes.tracks);
        write_stat(out, "total-artists", &format_count(artists as u64), "Artists")?;
        write_stat(out, "eq-presets", &snap.presets.presets.len().to_string(), "EQ Presets")?;
        out.push_str("</div>");

        // Cluster distribution + legend
        let mut chart = Chart::new(ChartKind::Doughnut);
        for c in clusters {
            chart.push(c.name.clone(), c.track_count as f64, cluster_color(&c.id));
        }
        out.push_str(r#"<div class="grid"><div class="card"><h2>Cluster Distribution</h2>"#);
        out.push_str(&self.charts.render("clusterChart", &chart));
        out.push_str(r#"<div class="legend" id="cluster-legend">"#);
        for c in clusters {
            write!(
                out,
                r#"<div class="legend-item"><div class="legend-color" style="background: {}"></div><span>{} ({})</span></div>"#,
                cluster_color(&c.id),
                Escaped(&c.name),
                c.track_count
            )?;
        }
        out.push_str("</div></div>");

        out.push_str(r#"<div class="card"><h2>Top Clusters</h2><div id="top-clusters-list">"#);
        for c in clusters.iter().take(TOP_CLUSTERS) {
            write!(
                out,
                r#"<a class="cluster-item" href="{}"><span class="cluster-name">{}</span><span class="cluster-count">{}</span></a>"#,
                self.site.anchor(Page::Clusters, &c.id),
                Escaped(&c.name),
                c.track_count
            )?;
        }
        out.push_str("</div></div></div>");

        out.push_str(r#"<div class="grid"><div class="card"><h2>EQ Presets</h2><div id="eq-preview-list">"#);
        for p in snap.presets_detailed.presets.iter().take(PRESET_PREVIEW) {
            write!(
                out,
                r#"<a class="eq-item" href="{}"><span class="eq-name">{}</span><span class="eq-description">{} tracks</span></a>"#,
                self.site.anchor(Page::Presets, &p.cluster_id),
                Escaped(&p.preset_name),
                p.track_count
            )?;
        }
        out.push_str("</div></div>");

        out.push_str(r#"<div class="card"><h2>Recently Liked</h2><div class="tracks-list" id="recent-tracks-list">"#);
        for t in snap.likes.tracks.iter().take(RECENT_TRACKS) {
            write!(
                out,
                r#"<a class="track-item" href="{url}" target="_blank" rel="noopener">"#,
                url = Escaped(safe_url(t.url.as_deref()))
            )?;
            if let Some(art) = t.artwork_url.as_deref() {
                write!(
                    out,
                    r#"<img class="track-artwork artwork" src="{}" alt="">"#,
                    Escaped(safe_url(Some(art)))
                )?;
            }
            write!(
                out,
                r#"<div class="track-info"><div class="track-title">{}</div><div class="track-artist">{}</div></div><div class="track-meta">{}</div></a>"#,
                Escaped(t.title()),
                Escaped(t.artist()),
                Escaped(t.duration.as_deref().unwrap_or(""))
            )?;
        }
        out.push_str("</div></div></div>");

        out.push_str(r#"<div class="card"><h2>Account</h2><div id="user-info-content">"#);
        match snap.account() {
            Some(account) => write_account(out, &account)?,
            None => {
                let source = snap.likes.source.as_deref().unwrap_or("N/A");
                write_user_stat(out, "Source", source)?;
                let scraped = snap.likes.scraped_at.as_deref().map(format_datetime);
                write_user_stat(out, "Scraped At", scraped.as_deref().unwrap_or("N/A"))?;
            }
        }
        out.push_str("</div></div>");
        Ok(())
    }
}

fn write_account(out: &mut String, account: &AccountSnapshot) -> fmt::Result {
    write_user_stat(out, "Username", account.username.as_deref().unwrap_or("N/A"))?;
    write_user_stat(out, "Full Name", account.full_name.as_deref().unwrap_or("N/A"))?;
    write_user_stat(out, "Followers", &format_count_or(account.followers_count, "N/A"))?;
    write_user_stat(out, "Following", &format_count_or(account.followings_count, "N/A"))?;
    write_user_stat(out, "Likes", &format_count_or(account.likes_count, "N/A"))?;
    let since = account.created_at.as_deref().map(format_date);
    write_user_stat(out, "Member Since", since.as_deref().unwrap_or("N/A"))
}

fn write_user_stat(out: &mut String, label: &str, value: &str) -> fmt::Result {
    write!(
        out,
        r#"<div class="user-stat"><div class="user-stat-label">{}</div><div class="user-stat-value">{}</div></div>"#,
        Escaped(label),
        Escaped(value)
    )
}

#[cfg(test)]
mod tests {
    use crate::chart::InlineSvg;
    use crate::loader::fixtures;
    use crate::render::{Renderer, Site};

    fn render(snap: &crate::loader::Snapshot) -> String {
        let svg = InlineSvg::default();
        Renderer::new(Site::Served, &svg).dashboard(snap)
    }

    #[test]
    fn test_dashboard_counts() {
        let html = render(&fixtures::snapshot());
        assert!(html.contains(r#"id="total-tracks">3<"#));
        assert!(html.contains(r#"id="total-clusters">2<"#));
        assert!(html.contains(r#"id="total-artists">3<"#));
        assert!(html.contains(r#"id="eq-presets">1<"#));
    }

    #[test]
    fn test_dashboard_legend_and_links() {
        let html = render(&fixtures::snapshot());
        assert!(html.contains("Rock &amp; Alternative (2)"));
        assert!(html.contains(r#"href="/clusters#rock_alternative""#));
        assert!(html.contains(r#"href="/eq-presets#rock_alternative""#));
        assert!(html.contains("2 tracks"));
    }

    #[test]
    fn test_dashboard_account_from_hydration() {
        let html = render(&fixtures::snapshot());
        assert!(html.contains("A Listener"));
        assert!(html.contains("1,234"));
        assert!(html.contains("Feb 3, 2016"));
        assert!(!html.contains("Scraped At"));
    }

    #[test]
    fn test_dashboard_account_fallback() {
        let mut snap = fixtures::snapshot();
        snap.hydration = None;
        let html = render(&snap);
        assert!(html.contains("Scraped At"));
        assert!(html.contains("Jan 5, 2025 11:00"));
        assert!(html.contains("https://soundcloud.com/listener/likes"));
    }

    #[test]
    fn test_dashboard_escapes_titles() {
        let mut snap = fixtures::snapshot();
        snap.likes.tracks[0].title = Some("<img src=x onerror=alert(1)>".into());
        let html = render(&snap);
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }
}
