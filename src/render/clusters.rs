//! Cluster browser

use super::{cluster_color, write_sample_tracks, write_stat, Page, Renderer};
use crate::chart::{Chart, ChartKind};
use crate::format::{format_count, format_number, Escaped};
use crate::loader::Snapshot;
use crate::model::ClusterSet;
use std::fmt::{self, Write};

/// Headline numbers for the cluster page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterSummary {
    pub count: usize,
    pub total_tracks: usize,
    pub largest: usize,
    pub average: usize,
}

impl ClusterSummary {
    pub fn from_set(set: &ClusterSet) -> Self {
        let count = set.clusters.len();
        let largest = set.clusters.iter().map(|c| c.track_count).max().unwrap_or(0);
        let average = if count == 0 {
            0
        } else {
            (set.total_tracks as f64 / count as f64).round() as usize
        };
        Self { count, total_tracks: set.total_tracks, largest, average }
    }
}

/// Share of `total` as a one-decimal percentage
fn share(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}

impl Renderer<'_> {
    pub fn clusters(&self, snap: &Snapshot) -> String {
        let mut body = String::new();
        let _ = self.write_clusters(&mut body, snap);
        self.layout(Page::Clusters, Page::Clusters.title(), &body)
    }

    fn write_clusters(&self, out: &mut String, snap: &Snapshot) -> fmt::Result {
        let set = &snap.clusters;
        let summary = ClusterSummary::from_set(set);

        out.push_str(r#"<div class="stats">"#);
        write_stat(out, "cluster-count", &summary.count.to_string(), "Clusters")?;
        write_stat(out, "total-tracks", &format_count(summary.total_tracks as u64), "Tracks")?;
        write_stat(out, "largest-cluster", &format_count(summary.largest as u64), "Largest Cluster")?;
        write_stat(out, "avg-cluster-size", &format_count(summary.average as u64), "Avg Cluster Size")?;
        out.push_str("</div>");

        let mut chart = Chart::new(ChartKind::Bar);
        for c in &set.clusters {
            chart.push(c.name.clone(), c.track_count as f64, cluster_color(&c.id));
        }
        out.push_str(r#"<div class="card"><h2>Cluster Sizes</h2>"#);
        out.push_str(&self.charts.render("clusterDistributionChart", &chart));
        out.push_str("</div>");

        out.push_str(r#"<div id="clusters-container">"#);
        for c in &set.clusters {
            write!(
                out,
                r#"<div class="card" id="{id}"><h2 style="border-left: 4px solid {color}; padding-left: 1rem;">{name}</h2>"#,
                id = Escaped(&c.id),
                color = cluster_color(&c.id),
                name = Escaped(&c.name),
            )?;
            write!(
                out,
                r#"<div class="cluster-stats" style="display: flex; gap: 2rem;"><div><strong>{count}</strong> <span class="muted">tracks ({pct}%)</span></div><div><strong>{artists}</strong> <span class="muted">artists</span></div><div><strong>{avg}</strong> <span class="muted">min avg</span></div></div>"#,
                count = c.track_count,
                pct = share(c.track_count, set.total_tracks),
                artists = c.unique_artists,
                avg = format_number(c.avg_duration_min),
            )?;
            out.push_str("<h3>Sample Tracks</h3>");
            write_sample_tracks(out, &c.sample_tracks)?;
            write!(
                out,
                r#"<a class="btn btn-secondary" href="{}">View EQ Preset</a></div>"#,
                self.site.anchor(Page::Presets, &c.id)
            )?;
        }
        out.push_str("</div>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartJs;
    use crate::loader::fixtures;
    use crate::model::Cluster;
    use crate::render::Site;

    #[test]
    fn test_summary() {
        let set = ClusterSet {
            total_tracks: 10,
            clusters: vec![
                Cluster { id: "a".into(), name: "A".into(), track_count: 3, ..Default::default() },
                Cluster { id: "b".into(), name: "B".into(), track_count: 6, ..Default::default() },
                Cluster { id: "c".into(), name: "C".into(), track_count: 1, ..Default::default() },
            ],
            ..Default::default()
        };
        let s = ClusterSummary::from_set(&set);
        assert_eq!(s.count, 3);
        assert_eq!(s.largest, 6);
        // 10 / 3 rounds to 3
        assert_eq!(s.average, 3);
    }

    #[test]
    fn test_summary_empty() {
        let s = ClusterSummary::from_set(&ClusterSet::default());
        assert_eq!(s, ClusterSummary { count: 0, total_tracks: 0, largest: 0, average: 0 });
    }

    #[test]
    fn test_share() {
        assert_eq!(share(2, 3), "66.7");
        assert_eq!(share(1, 0), "0.0");
    }

    #[test]
    fn test_cluster_cards() {
        let snap = fixtures::snapshot();
        let html = Renderer::new(Site::Served, &ChartJs).clusters(&snap);
        assert!(html.contains(r#"id="rock_alternative""#));
        assert!(html.contains("tracks (66.7%)"));
        assert!(html.contains("<strong>4.2</strong>"));
        assert!(html.contains(r#"id="largest-cluster">2<"#));
        assert!(html.contains(r#"href="/eq-presets#instrumental""#));
        assert!(html.contains("clusterDistributionChart"));
        assert!(html.contains("chart.js"));
    }
}
