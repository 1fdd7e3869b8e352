//! Video sources.
//!
//! This module provides the sources the bounded player reads from:
//! - Local video files (feature: video-ffmpeg)
//! - Synthetic `stub://` streams (always available, used by tests and demos)
//!
//! All sources produce `Frame` values in their native channel order. The
//! ingestion layer is responsible for:
//! - Opening the resource on demand
//! - Decoding frames sequentially, in source order
//! - Releasing the resource when asked, exactly once
//!
//! The ingestion layer MUST NOT:
//! - Keep a handle across playback invocations
//! - Retain frames beyond handoff to the player

pub mod file;
#[cfg(feature = "video-ffmpeg")]
pub(crate) mod file_ffmpeg;

pub use file::{FileSource, FileStats};

use anyhow::Result;

use crate::frame::Frame;

/// A finite, ordered stream of frames.
pub trait VideoSource {
    /// Whether the resource is open and may yield more frames.
    fn is_open(&self) -> bool;

    /// Decode the next frame. `Ok(None)` means the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying resource. After this, `is_open` is false.
    fn release(&mut self);
}
