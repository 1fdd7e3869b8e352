//! Frame container and display slot.
//!
//! - `Frame`: immutable 3-channel pixel grid tagged with its channel order.
//! - `DisplaySurface`: where the player and the dashboard emit frames.
//! - `DisplaySlot`: single reusable slot. Each new frame replaces the prior one.
//!
//! Decoded video and palette output arrive in `ChannelOrder::Bgr`. Everything
//! handed to a display surface is expected in `ChannelOrder::Rgb`.

use anyhow::{anyhow, Context, Result};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Bytes per pixel for every frame in this crate.
pub const CHANNELS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Native order of decoders and palettes.
    Bgr,
    /// Display order.
    Rgb,
}

impl ChannelOrder {
    pub const DISPLAY: ChannelOrder = ChannelOrder::Rgb;
}

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// A height × width grid of 3-channel byte samples.
///
/// Fields are private; a frame is immutable once built. The only transform is
/// `into_display_order`, which consumes the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self> {
        let expected = buffer_len(width, height)?;
        if data.len() != expected {
            return Err(anyhow!(
                "frame buffer is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    /// Build a frame whose buffer size is known to match.
    pub(crate) fn from_parts(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * CHANNELS);
        Self {
            data,
            width,
            height,
            order,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Sample at (x, y) in the frame's own channel order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Convert to display order. A frame already in display order is returned as is.
    pub fn into_display_order(mut self) -> Frame {
        if self.order != ChannelOrder::DISPLAY {
            for px in self.data.chunks_exact_mut(CHANNELS) {
                px.swap(0, 2);
            }
            self.order = ChannelOrder::DISPLAY;
        }
        self
    }

    /// PNG encoding of the frame, converted to display order first.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let display = self.clone().into_display_order();
        let (width, height) = (display.width, display.height);
        let image = RgbImage::from_raw(width, height, display.data)
            .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", width, height))?;
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .context("encode frame as png")?;
        Ok(out.into_inner())
    }
}

/// Byte length of a `width` x `height` frame. Errors if it overflows `usize`.
pub fn buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(|| anyhow!("frame size {}x{} overflows", width, height))
}

// ----------------------------------------------------------------------------
// Display surfaces
// ----------------------------------------------------------------------------

/// Receiver of full-frame replacements. No partial updates.
pub trait DisplaySurface {
    fn show(&mut self, frame: Frame);
}

/// Single reusable image slot. Keeps only the latest frame.
#[derive(Debug, Default)]
pub struct DisplaySlot {
    current: Option<Frame>,
    updates: u64,
}

impl DisplaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// Number of replacements since creation.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl DisplaySurface for DisplaySlot {
    fn show(&mut self, frame: Frame) {
        self.current = Some(frame);
        self.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgr_frame() -> Frame {
        // 2x1: blue pixel then red pixel, in BGR.
        Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, ChannelOrder::Bgr).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(Frame::new(vec![0; 5], 1, 2, ChannelOrder::Rgb).is_err());
    }

    #[test]
    fn buffer_len_rejects_overflow() {
        assert_eq!(buffer_len(4, 2).unwrap(), 24);
        assert!(buffer_len(u32::MAX, u32::MAX).is_err());
        assert!(Frame::new(Vec::new(), u32::MAX, u32::MAX, ChannelOrder::Bgr).is_err());
    }

    #[test]
    fn display_order_swaps_red_and_blue() {
        let frame = bgr_frame().into_display_order();
        assert_eq!(frame.order(), ChannelOrder::Rgb);
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(frame.pixel(1, 0), Some([255, 0, 0]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn display_order_is_noop_for_rgb() {
        let frame = Frame::new(vec![1, 2, 3], 1, 1, ChannelOrder::Rgb).unwrap();
        assert_eq!(frame.clone().into_display_order(), frame);
    }

    #[test]
    fn slot_keeps_only_latest_frame() {
        let mut slot = DisplaySlot::new();
        assert!(slot.current().is_none());
        slot.show(Frame::new(vec![1, 1, 1], 1, 1, ChannelOrder::Rgb).unwrap());
        slot.show(Frame::new(vec![2, 2, 2], 1, 1, ChannelOrder::Rgb).unwrap());
        assert_eq!(slot.updates(), 2);
        assert_eq!(slot.current().unwrap().as_bytes(), &[2, 2, 2]);
    }

    #[test]
    fn png_has_signature() {
        let png = bgr_frame().to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
