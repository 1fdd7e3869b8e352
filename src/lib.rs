//! Crowd Monitor dashboard
//!
//! A demonstration dashboard that plays a local video frame by frame and shows
//! synthetic crowd heatmaps and object counts. No detection model runs: counts
//! are a constant table and heatmaps and insights come from a random source.
//!
//! # Module Structure
//!
//! - `frame`: `Frame`, channel order, display slot
//! - `ingest`: video sources (local files via FFmpeg, `stub://` synthetic)
//! - `player`: bounded frame-by-frame playback
//! - `heatmap`: disk stamping and jet palette
//! - `detect`: constant object counts
//! - `insights`: simulated live count, anomaly and report
//! - `pages`: page selection and dispatch
//! - `html`: page rendering
//! - `feedback`: sidebar rating
//! - `api`: HTTP service
//! - `config`: file + environment configuration
//! - `ui`: CLI stage reporting

pub mod api;
pub mod config;
pub mod detect;
pub mod feedback;
pub mod frame;
pub mod heatmap;
pub mod html;
pub mod ingest;
pub mod insights;
pub mod pages;
pub mod player;
pub mod ui;

pub use detect::{ObjectClass, ObjectCountSummary, REFERENCE_COUNTS};
pub use frame::{ChannelOrder, DisplaySlot, DisplaySurface, Frame};
pub use heatmap::{generate_heatmap, HeatmapParams, IntensityGrid, Palette};
pub use ingest::{FileSource, VideoSource};
pub use pages::{Dashboard, Page, PageRequest, PageView};
pub use player::{
    BoundedPlayer, PlaybackOutcome, PlaybackPolicy, PlaybackReport, DEFAULT_MAX_FRAMES,
};
