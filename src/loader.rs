//! Dataset loading
//!
//! All five files are read in parallel and joined before anything renders.
//! The four required files fail the whole load; the hydration file is
//! optional and degrades to `None`. There is one attempt per file.

use crate::error::{Error, Result};
use crate::model::{
    AccountSnapshot, ClusterSet, DetailedPresets, HydrationEntry, LikesCollection, PresetLibrary,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

pub const CLUSTERS_FILE: &str = "track_clusters.json";
pub const LIKES_FILE: &str = "soundcloud_likes.json";
pub const PRESETS_FILE: &str = "eq_presets.json";
pub const PRESETS_DETAILED_FILE: &str = "eq_presets_detailed.json";
pub const HYDRATION_FILE: &str = "soundcloud_hydration.json";

/// Everything the pages read, fixed for the lifetime of the process.
///
/// Written once by [`load`]; every renderer and request handler only
/// borrows it.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub clusters: ClusterSet,
    pub likes: LikesCollection,
    pub presets: PresetLibrary,
    pub presets_detailed: DetailedPresets,
    /// `None` when the hydration file is missing or unreadable
    pub hydration: Option<Vec<HydrationEntry>>,
    /// The preset files as loaded, re-serialized for downloads
    pub presets_document: Value,
    pub presets_detailed_document: Value,
}

/// The two files offered as downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Download {
    Presets,
    DetailedPresets,
}

impl Download {
    pub const ALL: [Download; 2] = [Download::Presets, Download::DetailedPresets];

    pub fn file_name(self) -> &'static str {
        match self {
            Download::Presets => PRESETS_FILE,
            Download::DetailedPresets => PRESETS_DETAILED_FILE,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.file_name() == name)
    }
}

impl Snapshot {
    /// The hydrated account, if the optional file had one
    pub fn account(&self) -> Option<AccountSnapshot> {
        self.hydration.as_deref().and_then(AccountSnapshot::from_hydration)
    }

    /// Pretty-printed (2-space) JSON for a download
    pub fn download(&self, which: Download) -> Result<String> {
        let doc = match which {
            Download::Presets => &self.presets_document,
            Download::DetailedPresets => &self.presets_detailed_document,
        };
        Ok(serde_json::to_string_pretty(doc)?)
    }
}

/// Load all datasets from `data_dir`
pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Snapshot> {
    let dir = data_dir.as_ref();
    debug!(dir = %dir.display(), "loading datasets");

    let ((clusters, likes), ((presets, detailed), hydration)) = rayon::join(
        || {
            rayon::join(
                || read_typed::<ClusterSet>(dir, CLUSTERS_FILE),
                || read_typed::<LikesCollection>(dir, LIKES_FILE),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || read_document::<PresetLibrary>(dir, PRESETS_FILE),
                        || read_document::<DetailedPresets>(dir, PRESETS_DETAILED_FILE),
                    )
                },
                || read_optional::<Vec<HydrationEntry>>(dir, HYDRATION_FILE),
            )
        },
    );

    let (presets, presets_document) = presets?;
    let (presets_detailed, presets_detailed_document) = detailed?;
    let snapshot = Snapshot {
        clusters: clusters?,
        likes: likes?,
        presets,
        presets_detailed,
        hydration,
        presets_document,
        presets_detailed_document,
    };

    info!(
        clusters = snapshot.clusters.clusters.len(),
        tracks = snapshot.likes.tracks.len(),
        presets = snapshot.presets_detailed.presets.len(),
        hydration = snapshot.hydration.is_some(),
        "datasets loaded"
    );
    Ok(snapshot)
}

fn read_value(dir: &Path, resource: &'static str) -> Result<Value> {
    let bytes = std::fs::read(dir.join(resource)).map_err(|source| Error::Read { resource, source })?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Parse { resource, source })
}

fn read_typed<T: DeserializeOwned>(dir: &Path, resource: &'static str) -> Result<T> {
    let value = read_value(dir, resource)?;
    serde_json::from_value(value).map_err(|source| Error::Parse { resource, source })
}

/// Typed view plus the document itself
fn read_document<T: DeserializeOwned>(dir: &Path, resource: &'static str) -> Result<(T, Value)> {
    let value = read_value(dir, resource)?;
    let typed = T::deserialize(&value).map_err(|source| Error::Parse { resource, source })?;
    Ok((typed, value))
}

fn read_optional<T: DeserializeOwned>(dir: &Path, resource: &'static str) -> Option<T> {
    match read_typed(dir, resource) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(error = %e, "optional dataset unavailable");
            None
        }
    }
}
