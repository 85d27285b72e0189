//! Dataset types for the five JSON files the dashboard reads
//!
//! The files are produced by the scraping/clustering pipeline and are treated
//! as fixed-schema inputs. Only the fields the pages display are modelled;
//! anything else in the files is ignored on load. Almost every per-track field
//! is optional because the scraper writes `null` whenever the upstream API
//! omitted a value.

use crate::format::{format_duration_ms, parse_clock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// The fixed 10-band equalizer layout, in Hz
pub const EQ_BANDS: [u32; 10] = [32, 64, 125, 250, 500, 1000, 2000, 4000, 8000, 16000];

/// A liked track as written by the likes fetcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTrack")]
pub struct Track {
    pub track_id: Option<u64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Display form, `m:ss` / `h:mm:ss`
    pub duration: Option<String>,
    pub duration_ms: Option<u64>,
    pub genre: Option<String>,
    pub plays: Option<u64>,
    pub likes: Option<u64>,
    pub artwork_url: Option<String>,
    pub url: Option<String>,
    /// RFC 3339 timestamp of the like
    pub liked_at: Option<String>,
    pub description: Option<String>,
}

/// A track record as found on disk.
///
/// Older scrapes store `duration` as raw milliseconds rather than text, and
/// any field of the wrong type is dropped instead of failing the file.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawTrack {
    #[serde(deserialize_with = "count")]
    track_id: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    artist: Option<String>,
    duration: Option<Value>,
    #[serde(deserialize_with = "count")]
    duration_ms: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    genre: Option<String>,
    #[serde(deserialize_with = "count")]
    plays: Option<u64>,
    #[serde(deserialize_with = "count")]
    likes: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    artwork_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    liked_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    description: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let (duration, clock_ms) = match raw.duration {
            Some(Value::String(text)) => {
                let ms = parse_clock(&text);
                (Some(text), ms)
            }
            Some(Value::Number(n)) => {
                let ms = number_to_count(&n);
                (ms.map(format_duration_ms), ms)
            }
            _ => (None, None),
        };

        Self {
            track_id: raw.track_id,
            title: raw.title,
            artist: raw.artist,
            duration,
            duration_ms: raw.duration_ms.filter(|&ms| ms > 0).or(clock_ms),
            genre: raw.genre,
            plays: raw.plays,
            likes: raw.likes,
            artwork_url: raw.artwork_url,
            url: raw.url,
            liked_at: raw.liked_at,
            description: raw.description,
        }
    }
}

/// Any value that doesn't fit `T` reads as `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Counts and ids: integers, whole non-negative floats, digit strings (`"1,200"`)
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => number_to_count(&n),
        Value::String(text) => text.trim().replace(',', "").parse().ok(),
        _ => None,
    })
}

fn number_to_count(n: &Number) -> Option<u64> {
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

impl Track {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn artist(&self) -> &str {
        self.artist.as_deref().unwrap_or("")
    }

    pub fn genre(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }
}

/// A track tagged with the cluster it was listed under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredTrack {
    #[serde(flatten)]
    pub track: Track,
    pub cluster_id: String,
    pub cluster_name: String,
}

/// Abbreviated track reference used for cluster and preset samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTrack {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub track_count: usize,
    #[serde(default)]
    pub unique_artists: usize,
    #[serde(default)]
    pub avg_duration_min: f64,
    #[serde(default)]
    pub sample_tracks: Vec<SampleTrack>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// `track_clusters.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClusterSet {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub total_tracks: usize,
    #[serde(default)]
    pub cluster_count: usize,
    #[serde(default)]
    pub clustered_at: Option<String>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

impl ClusterSet {
    pub fn get(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }
}

/// `soundcloud_likes.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LikesCollection {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub track_count: usize,
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandGain {
    pub frequency: u32,
    pub gain: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    #[serde(default)]
    pub global: f64,
    #[serde(default)]
    pub bands: Vec<BandGain>,
}

/// One preset in the eqMac import format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EqMacPreset {
    pub id: String,
    pub name: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    #[serde(default)]
    pub gains: Gains,
}

/// `eq_presets.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresetLibrary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub presets: Vec<EqMacPreset>,
}

/// One entry of `eq_presets_detailed.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EqPreset {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub track_count: usize,
    pub preset_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    /// Keyed by band frequency; the file stores the keys as strings
    #[serde(default)]
    pub eq_settings: BTreeMap<u32, f64>,
    #[serde(default)]
    pub sample_tracks: Vec<SampleTrack>,
}

impl EqPreset {
    /// Gain for a band, 0 dB when the preset leaves it out
    pub fn gain(&self, freq: u32) -> f64 {
        self.eq_settings.get(&freq).copied().unwrap_or(0.0)
    }
}

/// `eq_presets_detailed.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetailedPresets {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<usize>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub presets: Vec<EqPreset>,
}

/// One element of the page hydration array (`soundcloud_hydration.json`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HydrationEntry {
    pub hydratable: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Profile data for the account whose likes were scraped
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub followers_count: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub followings_count: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub likes_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
}

impl AccountSnapshot {
    /// Pick the `user` entry out of a hydration array. Mistyped fields are
    /// dropped one by one; only a non-object `data` yields `None`.
    pub fn from_hydration(entries: &[HydrationEntry]) -> Option<Self> {
        entries
            .iter()
            .find(|h| h.hydratable == "user")
            .and_then(|h| Self::deserialize(&h.data).ok())
    }
}
