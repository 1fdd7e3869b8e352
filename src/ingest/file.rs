//! Local file video source.
//!
//! This module provides `FileSource` for reading frames from local video files.
//! Opening never fails outright: an unreadable or undecodable path yields a
//! source that is not open, and the reason is kept for callers that want to
//! report it.
//!
//! Paths starting with `stub://` select a synthetic backend, e.g.
//! `stub://crowd?frames=10&width=64&height=48`.

use anyhow::{anyhow, Context, Result};

#[cfg(feature = "video-ffmpeg")]
use super::file_ffmpeg::FfmpegFileSource;
use super::VideoSource;
use crate::frame::{buffer_len, ChannelOrder, Frame};

const STUB_SCHEME: &str = "stub://";
const DEFAULT_STUB_FRAMES: u64 = 300;
const DEFAULT_STUB_WIDTH: u32 = 640;
const DEFAULT_STUB_HEIGHT: u32 = 480;
/// Largest accepted stub width or height.
const MAX_STUB_DIMENSION: u32 = 8192;

/// Local file video source.
pub struct FileSource {
    path: String,
    backend: FileBackend,
    unavailable: Option<String>,
    frames_read: u64,
}

enum FileBackend {
    Synthetic(SyntheticFileSource),
    #[cfg(feature = "video-ffmpeg")]
    Ffmpeg(FfmpegFileSource),
    Closed,
}

impl FileSource {
    /// Open `path`. Failures leave the source closed with a recorded reason.
    pub fn open(path: &str) -> Self {
        match Self::try_open(path) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("FileSource: cannot open {}: {:#}", path, err);
                Self {
                    path: path.to_string(),
                    backend: FileBackend::Closed,
                    unavailable: Some(format!("{:#}", err)),
                    frames_read: 0,
                }
            }
        }
    }

    /// Open `path`, reporting failures as errors.
    pub fn try_open(path: &str) -> Result<Self> {
        if !is_local_file_path(path) {
            return Err(anyhow!(
                "video playback only supports local paths (no URL schemes)"
            ));
        }
        let backend = if let Some(params) = path.strip_prefix(STUB_SCHEME) {
            FileBackend::Synthetic(SyntheticFileSource::parse(params)?)
        } else {
            std::fs::metadata(path).with_context(|| format!("video file '{}' not readable", path))?;
            open_decoder(path)?
        };
        log::info!("FileSource: opened {}", path);
        Ok(Self {
            path: path.to_string(),
            backend,
            unavailable: None,
            frames_read: 0,
        })
    }

    /// Why the source could not be opened, if it could not.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    /// Get frame statistics.
    pub fn stats(&self) -> FileStats {
        FileStats {
            frames_read: self.frames_read,
            path: self.path.clone(),
        }
    }
}

impl VideoSource for FileSource {
    fn is_open(&self) -> bool {
        !matches!(self.backend, FileBackend::Closed)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let frame = match &mut self.backend {
            FileBackend::Synthetic(source) => source.next_frame()?,
            #[cfg(feature = "video-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.next_frame()?,
            FileBackend::Closed => None,
        };
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    fn release(&mut self) {
        if matches!(self.backend, FileBackend::Closed) {
            return;
        }
        self.backend = FileBackend::Closed;
        log::debug!(
            "FileSource: released {} after {} frames",
            self.path,
            self.frames_read
        );
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_read: u64,
    pub path: String,
}

#[cfg(feature = "video-ffmpeg")]
fn open_decoder(path: &str) -> Result<FileBackend> {
    Ok(FileBackend::Ffmpeg(FfmpegFileSource::new(path)?))
}

#[cfg(not(feature = "video-ffmpeg"))]
fn open_decoder(_path: &str) -> Result<FileBackend> {
    Err(anyhow!(
        "video file decoding requires the video-ffmpeg feature"
    ))
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and demos
// ----------------------------------------------------------------------------

/// Produces `frames` BGR frames. Frame `n` carries `n` in its blue and green
/// channels (low and high byte) so order is observable; red varies per pixel.
struct SyntheticFileSource {
    frames: u64,
    width: u32,
    height: u32,
    next_index: u64,
}

impl SyntheticFileSource {
    fn parse(params: &str) -> Result<Self> {
        let mut source = Self {
            frames: DEFAULT_STUB_FRAMES,
            width: DEFAULT_STUB_WIDTH,
            height: DEFAULT_STUB_HEIGHT,
            next_index: 0,
        };
        let Some((_, query)) = params.split_once('?') else {
            return Ok(source);
        };
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("stub parameter '{}' has no value", pair))?;
            match key {
                "frames" => {
                    source.frames = value
                        .parse()
                        .with_context(|| format!("invalid stub frame count '{}'", value))?
                }
                "width" => source.width = parse_dimension(key, value)?,
                "height" => source.height = parse_dimension(key, value)?,
                other => return Err(anyhow!("unknown stub parameter '{}'", other)),
            }
        }
        Ok(source)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.next_index >= self.frames {
            return Ok(None);
        }
        let index = self.next_index;
        self.next_index += 1;

        let mut data = Vec::with_capacity(buffer_len(self.width, self.height)?);
        let pixel_count = (self.width as usize) * (self.height as usize);
        for p in 0..pixel_count {
            data.push(index as u8);
            data.push((index >> 8) as u8);
            data.push((p % 256) as u8);
        }
        Frame::new(data, self.width, self.height, ChannelOrder::Bgr).map(Some)
    }
}

fn parse_dimension(key: &str, value: &str) -> Result<u32> {
    let parsed: u32 = value
        .parse()
        .with_context(|| format!("invalid stub {} '{}'", key, value))?;
    if parsed == 0 || parsed > MAX_STUB_DIMENSION {
        return Err(anyhow!(
            "stub {} must be between 1 and {}, got {}",
            key,
            MAX_STUB_DIMENSION,
            parsed
        ));
    }
    Ok(parsed)
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with(STUB_SCHEME) {
        return true;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_source_yields_requested_frames_in_order() {
        let mut source = FileSource::try_open("stub://t?frames=3&width=4&height=2").unwrap();
        assert!(source.is_open());
        for expected in 0..3u8 {
            let frame = source.read_frame().unwrap().expect("frame");
            assert_eq!(frame.order(), ChannelOrder::Bgr);
            assert_eq!((frame.width(), frame.height()), (4, 2));
            assert_eq!(frame.pixel(0, 0).unwrap()[0], expected);
        }
        assert!(source.read_frame().unwrap().is_none());
        assert_eq!(source.stats().frames_read, 3);
    }

    #[test]
    fn rejects_remote_urls() {
        assert!(FileSource::try_open("rtsp://camera/stream").is_err());
        assert!(FileSource::try_open("   ").is_err());
    }

    #[test]
    fn rejects_bad_stub_parameters() {
        assert!(FileSource::try_open("stub://t?frames=abc").is_err());
        assert!(FileSource::try_open("stub://t?width=0").is_err());
        assert!(FileSource::try_open("stub://t?fps=10").is_err());
    }

    #[test]
    fn rejects_oversized_stub_dimensions() {
        assert!(FileSource::try_open("stub://x?width=4294967295&height=4294967295").is_err());
        assert!(FileSource::try_open("stub://x?width=65536&height=65536").is_err());
        assert!(FileSource::try_open("stub://x?width=8192&height=1").is_ok());

        let mut source = FileSource::open("stub://x?frames=1&width=4294967295&height=4294967295");
        assert!(!source.is_open());
        assert!(source.unavailable_reason().unwrap().contains("width"));
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn missing_file_opens_closed() {
        let mut source = FileSource::open("/definitely/not/here.mp4");
        assert!(!source.is_open());
        assert!(source.unavailable_reason().is_some());
        source.release();
        assert!(source.unavailable_reason().is_some());
    }

    #[test]
    fn release_closes_source() {
        let mut source = FileSource::open("stub://t?frames=5&width=1&height=1");
        source.release();
        assert!(!source.is_open());
        assert!(source.read_frame().unwrap().is_none());
        source.release();
        assert!(!source.is_open());
    }
}
