//! AutoEQ - browse liked-track clusters and their EQ presets
//!
//! The scraping and clustering pipeline leaves five JSON files behind: the
//! track clusters, the raw likes, EQ presets in eqMac format, a detailed
//! preset listing, and (optionally) the account's page hydration data. This
//! crate loads those files into an immutable [`Snapshot`] and renders four
//! pages from it:
//!
//! | Page | Shows |
//! |------|-------|
//! | Dashboard | headline counts, cluster doughnut, top clusters, account |
//! | Clusters | one card per cluster with samples, size bar chart |
//! | EQ Presets | 10-band gain curves, characteristics, downloads |
//! | Tracks | searchable, sortable, paginated table of every track |
//!
//! # Quick Start
//!
//! ```no_run
//! use autoeq::tracks::{flatten, SortKey, TrackTable};
//!
//! let snapshot = autoeq::load("data")?;
//! let all = flatten(&snapshot.clusters.clusters);
//!
//! let mut table = TrackTable::new(&all);
//! table.filter("love", Some("rock_alternative"));
//! table.sort(SortKey::Title);
//! for t in table.visible() {
//!     println!("{} - {}", t.track.artist(), t.track.title());
//! }
//! # Ok::<(), autoeq::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`loader`]: parallel dataset loading into a [`Snapshot`]
//! - [`tracks`]: the filter/sort/paginate controller
//! - [`render`]: HTML pages
//! - [`chart`]: chart sinks (Chart.js, inline SVG)
//! - [`serve`]: local HTTP server
//! - [`site`]: static site output

pub mod chart;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod model;
pub mod render;
pub mod serve;
pub mod site;
pub mod tracks;

pub use error::{Error, Result};
pub use loader::{load, Download, Snapshot};
pub use tracks::{SortKey, TrackQuery, TrackTable, PAGE_SIZE};
