//! Static site output
//!
//! Writes every page for the default view plus both preset downloads into a
//! directory that can be opened straight from disk. Charts are drawn as
//! inline SVG so the pages need no network access.

use crate::chart::InlineSvg;
use crate::error::Result;
use crate::loader::{Download, Snapshot};
use crate::render::{static_tracks_file, Renderer, Site};
use crate::tracks::{flatten, TrackQuery};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render all pages into `out_dir`, returning the paths written
pub fn build<P: AsRef<Path>>(snap: &Snapshot, out_dir: P, progress: bool) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let svg = InlineSvg::default();
    let renderer = Renderer::new(Site::Static, &svg);
    let all = flatten(&snap.clusters.clusters);
    let total_pages = TrackQuery::default().apply(&all).total_pages().max(1);

    let pb = if progress {
        let pb = ProgressBar::new((3 + total_pages + Download::ALL.len()) as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        Some(pb)
    } else {
        None
    };

    let mut written = Vec::new();
    let mut emit = |name: String, contents: String| -> Result<()> {
        let path = out_dir.join(&name);
        fs::write(&path, contents)?;
        if let Some(ref pb) = pb {
            pb.inc(1);
            pb.set_message(name);
        }
        written.push(path);
        Ok(())
    };

    emit("index.html".into(), renderer.dashboard(snap))?;
    emit("clusters.html".into(), renderer.clusters(snap))?;
    emit("eq-presets.html".into(), renderer.presets(snap))?;

    for page in 1..=total_pages {
        let query = TrackQuery { page: Some(page), ..Default::default() };
        let table = query.apply(&all);
        emit(static_tracks_file(page), renderer.tracks(snap, &table, &query))?;
    }

    for which in Download::ALL {
        emit(which.file_name().to_string(), snap.download(which)?)?;
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(dir = %out_dir.display(), files = written.len(), "site written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;
    use crate::model::{Cluster, Track};

    #[test]
    fn test_build_writes_pages() {
        let dir = tempfile::tempdir().unwrap();
        let written = build(&fixtures::snapshot(), dir.path(), false).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "index.html",
                "clusters.html",
                "eq-presets.html",
                "tracks.html",
                "eq_presets.json",
                "eq_presets_detailed.json",
            ]
        );

        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(r#"href="clusters.html#rock_alternative""#));
        assert!(index.contains("<svg"));
        assert!(!index.contains("chart.js"));
    }

    #[test]
    fn test_build_paginates_tracks() {
        let tracks: Vec<Track> = (0..120)
            .map(|i| Track { track_id: Some(i), title: Some(format!("T{i}")), ..Default::default() })
            .collect();
        let mut snap = fixtures::snapshot();
        snap.clusters.clusters = vec![Cluster {
            id: "all".into(),
            name: "All".into(),
            track_count: tracks.len(),
            tracks,
            ..Default::default()
        }];

        let dir = tempfile::tempdir().unwrap();
        build(&snap, dir.path(), false).unwrap();

        let page2 = fs::read_to_string(dir.path().join("tracks-2.html")).unwrap();
        assert!(page2.contains("Showing 51-100 of 120 tracks"));
        assert!(page2.contains(r#"<a href="tracks.html">Prev</a>"#));
        assert!(page2.contains(r#"<a href="tracks-3.html">Next</a>"#));

        let page3 = fs::read_to_string(dir.path().join("tracks-3.html")).unwrap();
        assert!(page3.contains("Showing 101-120 of 120 tracks"));
        assert!(!dir.path().join("tracks-4.html").exists());
    }
}
