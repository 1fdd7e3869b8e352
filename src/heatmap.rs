//! Synthetic heatmap generation.
//!
//! A heatmap is a zeroed single-channel grid with randomly placed filled disks
//! stamped at full intensity, mapped through a jet palette (native BGR) and
//! then converted to display order. Nothing here is derived from video: it is
//! a placeholder visualization.
//!
//! The random source is always passed in. Seed it for reproducible output;
//! the dashboard uses `rand::thread_rng()`.

use anyhow::Result;
use rand::Rng;

use crate::frame::{buffer_len, ChannelOrder, Frame};

pub const HEATMAP_WIDTH: u32 = 600;
pub const HEATMAP_HEIGHT: u32 = 400;
pub const DISK_COUNT: u32 = 200;
pub const DISK_RADIUS: u32 = 20;
pub const FULL_INTENSITY: u8 = 255;

/// Captions of the monitoring page heatmaps, in display order.
pub const INTERVAL_CAPTIONS: [&str; 4] = [
    "Heatmap for 0–10 seconds",
    "Heatmap for 10–20 seconds",
    "Heatmap for 20–30 seconds",
    "Heatmap for 30–40 seconds",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeatmapParams {
    pub width: u32,
    pub height: u32,
    pub disks: u32,
    pub radius: u32,
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self {
            width: HEATMAP_WIDTH,
            height: HEATMAP_HEIGHT,
            disks: DISK_COUNT,
            radius: DISK_RADIUS,
        }
    }
}

// ----------------------------------------------------------------------------
// IntensityGrid
// ----------------------------------------------------------------------------

/// Row-major single-channel grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityGrid {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl IntensityGrid {
    /// Zeroed grid. Errors when the colored frame of the same size would overflow.
    pub fn zeros(width: u32, height: u32) -> Result<Self> {
        buffer_len(width, height)?;
        Ok(Self {
            data: vec![0; (width as usize) * (height as usize)],
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y as usize) * (self.width as usize) + x as usize])
    }

    /// Fill every pixel within `radius` of (cx, cy) with `value`. Clipped to the grid.
    pub fn stamp_disk(&mut self, cx: u32, cy: u32, radius: u32, value: u8) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let radius = radius.min(self.width.max(self.height));
        let (cx, cy, r) = (cx as i64, cy as i64, radius as i64);
        let y_min = (cy - r).max(0);
        let y_max = (cy + r).min(self.height as i64 - 1);
        let x_min = (cx - r).max(0);
        let x_max = (cx + r).min(self.width as i64 - 1);
        let r2 = r.saturating_mul(r);
        for y in y_min..=y_max {
            let dy = y - cy;
            let row = (y as usize) * (self.width as usize);
            for x in x_min..=x_max {
                let dx = x - cx;
                if dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) <= r2 {
                    self.data[row + x as usize] = value;
                }
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Palette
// ----------------------------------------------------------------------------

/// 256-entry lookup table from intensity to a BGR color.
#[derive(Clone, Debug)]
pub struct Palette {
    lut: [[u8; 3]; 256],
}

impl Palette {
    /// Blue-to-red "jet" ramp: dark blue at 0, dark red at 255.
    pub fn jet() -> Self {
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let v = i as f32 / 255.0;
            let channel = |center: f32| -> u8 {
                let level = (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
                (level * 255.0).round() as u8
            };
            *entry = [channel(1.0), channel(2.0), channel(3.0)];
        }
        Self { lut }
    }

    /// BGR color for `intensity`.
    pub fn color(&self, intensity: u8) -> [u8; 3] {
        self.lut[intensity as usize]
    }

    /// Map every grid cell through the palette. Output is in BGR order.
    pub fn apply(&self, grid: &IntensityGrid) -> Frame {
        let mut data = Vec::with_capacity(grid.data.len() * 3);
        for &value in &grid.data {
            data.extend_from_slice(&self.lut[value as usize]);
        }
        Frame::from_parts(data, grid.width, grid.height, ChannelOrder::Bgr)
    }
}

// ----------------------------------------------------------------------------
// Generation
// ----------------------------------------------------------------------------

/// Stamp `params.disks` full-intensity disks at uniform random centers.
pub fn stamp_random_disks<R: Rng + ?Sized>(
    params: &HeatmapParams,
    rng: &mut R,
) -> Result<IntensityGrid> {
    let mut grid = IntensityGrid::zeros(params.width, params.height)?;
    if params.width == 0 || params.height == 0 {
        return Ok(grid);
    }
    for _ in 0..params.disks {
        let x = rng.gen_range(0..params.width);
        let y = rng.gen_range(0..params.height);
        grid.stamp_disk(x, y, params.radius, FULL_INTENSITY);
    }
    Ok(grid)
}

/// Generate one display-ready heatmap with the reference parameters.
pub fn generate_heatmap<R: Rng + ?Sized>(rng: &mut R) -> Result<Frame> {
    generate_with(&HeatmapParams::default(), rng)
}

pub fn generate_with<R: Rng + ?Sized>(params: &HeatmapParams, rng: &mut R) -> Result<Frame> {
    let grid = stamp_random_disks(params, rng)?;
    Ok(Palette::jet().apply(&grid).into_display_order())
}

#[derive(Clone, Debug)]
pub struct IntervalHeatmap {
    pub caption: &'static str,
    pub frame: Frame,
}

/// One independent heatmap per entry of `INTERVAL_CAPTIONS`.
pub fn interval_heatmaps<R: Rng + ?Sized>(rng: &mut R) -> Result<Vec<IntervalHeatmap>> {
    INTERVAL_CAPTIONS
        .iter()
        .map(|&caption| {
            Ok(IntervalHeatmap {
                caption,
                frame: generate_heatmap(rng)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn heatmap_has_reference_dimensions() {
        let frame = generate_heatmap(&mut rand::thread_rng()).unwrap();
        assert_eq!(frame.width(), 600);
        assert_eq!(frame.height(), 400);
        assert_eq!(frame.order(), ChannelOrder::Rgb);
        assert_eq!(frame.as_bytes().len(), 600 * 400 * 3);
    }

    #[test]
    fn raw_grid_is_binary() {
        let grid = stamp_random_disks(&HeatmapParams::default(), &mut rand::thread_rng()).unwrap();
        assert!(grid.as_bytes().iter().all(|&v| v == 0 || v == 255));
        assert!(grid.as_bytes().iter().any(|&v| v == 255));
    }

    #[test]
    fn disk_is_clipped_and_round() {
        let mut grid = IntensityGrid::zeros(10, 10).unwrap();
        grid.stamp_disk(0, 0, 3, 255);
        assert_eq!(grid.get(0, 0), Some(255));
        assert_eq!(grid.get(3, 0), Some(255));
        assert_eq!(grid.get(0, 3), Some(255));
        // (3, 3) is outside the radius-3 circle.
        assert_eq!(grid.get(3, 3), Some(0));
        assert_eq!(grid.get(4, 0), Some(0));
        assert_eq!(grid.as_bytes().iter().filter(|&&v| v == 255).count(), 11);
    }

    #[test]
    fn huge_radius_is_clamped() {
        let params = HeatmapParams {
            width: 4,
            height: 4,
            disks: 1,
            radius: u32::MAX,
        };
        let frame = generate_with(&params, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 4));
        let hot = Palette::jet().color(255);
        let hot_rgb = [hot[2], hot[1], hot[0]];
        assert!(frame.as_bytes().chunks_exact(3).any(|px| px == hot_rgb));

        let mut grid = IntensityGrid::zeros(3, 3).unwrap();
        grid.stamp_disk(1, 1, u32::MAX, 255);
        assert!(grid.as_bytes().iter().all(|&v| v == 255));
        let mut grid = IntensityGrid::zeros(3, 3).unwrap();
        grid.stamp_disk(u32::MAX, u32::MAX, u32::MAX, 255);
        assert_eq!(grid.get(0, 0), Some(0));
    }

    #[test]
    fn oversized_grid_is_an_error() {
        assert!(IntensityGrid::zeros(u32::MAX, u32::MAX).is_err());
        let params = HeatmapParams {
            width: u32::MAX,
            height: u32::MAX,
            ..HeatmapParams::default()
        };
        assert!(generate_with(&params, &mut StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn jet_endpoints() {
        let jet = Palette::jet();
        assert_eq!(jet.color(0), [128, 0, 0]);
        assert_eq!(jet.color(255), [0, 0, 128]);
    }

    #[test]
    fn heatmap_uses_two_colors() {
        let frame = generate_heatmap(&mut StdRng::seed_from_u64(7)).unwrap();
        let jet = Palette::jet();
        let cold = jet.color(0);
        let hot = jet.color(255);
        let cold_rgb = [cold[2], cold[1], cold[0]];
        let hot_rgb = [hot[2], hot[1], hot[0]];
        for px in frame.as_bytes().chunks_exact(3) {
            assert!(px == cold_rgb || px == hot_rgb);
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_heatmap(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_heatmap(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn interval_series_has_four_captioned_maps() {
        let maps = interval_heatmaps(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(maps.len(), 4);
        assert_eq!(maps[0].caption, "Heatmap for 0–10 seconds");
        assert_eq!(maps[3].caption, "Heatmap for 30–40 seconds");
        assert!(maps.iter().all(|m| m.frame.width() == HEATMAP_WIDTH));
    }
}
