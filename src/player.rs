//! Bounded video player.
//!
//! Reads frames from a `VideoSource`, converts each to display order and
//! emits it to a `DisplaySurface`, stopping when the source is exhausted, a
//! decode fails, or the frame cap is reached. The source is released exactly
//! once per invocation, on every exit path, before `play` returns.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::frame::DisplaySurface;
use crate::ingest::{FileSource, VideoSource};

/// Default upper bound on frames per playback.
pub const DEFAULT_MAX_FRAMES: u64 = 500;

/// What to do when the resource cannot be opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPolicy {
    /// Treat an unopenable source like an empty one.
    #[default]
    Lenient,
    /// Report an unopenable source as an error.
    Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// The source ran out of frames.
    Exhausted,
    /// The frame cap was reached.
    CapReached,
    /// The source was never open.
    SourceUnavailable,
    /// A frame failed to decode; playback stopped there.
    DecodeFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlaybackReport {
    pub frames_emitted: u64,
    pub outcome: PlaybackOutcome,
}

#[derive(Clone, Copy, Debug)]
pub struct BoundedPlayer {
    max_frames: u64,
    policy: PlaybackPolicy,
}

impl Default for BoundedPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMES, PlaybackPolicy::default())
    }
}

impl BoundedPlayer {
    pub fn new(max_frames: u64, policy: PlaybackPolicy) -> Self {
        Self { max_frames, policy }
    }

    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    pub fn policy(&self) -> PlaybackPolicy {
        self.policy
    }

    /// Open `path` as a `FileSource` and play it.
    pub fn play_path<D: DisplaySurface + ?Sized>(
        &self,
        path: &str,
        surface: &mut D,
    ) -> Result<PlaybackReport> {
        let mut source = FileSource::open(path);
        self.play(&mut source, surface)
            .map_err(|err| match source.unavailable_reason() {
                Some(reason) => anyhow!("video source '{}' unavailable: {}", path, reason),
                None => err,
            })
    }

    /// Play `source` into `surface`.
    pub fn play<S, D>(&self, source: &mut S, surface: &mut D) -> Result<PlaybackReport>
    where
        S: VideoSource + ?Sized,
        D: DisplaySurface + ?Sized,
    {
        let mut guard = ReleaseGuard { source };
        let was_open = guard.source.is_open();

        let mut frames_emitted = 0u64;
        let mut outcome = PlaybackOutcome::Exhausted;
        while guard.source.is_open() && frames_emitted < self.max_frames {
            match guard.source.read_frame() {
                Ok(Some(frame)) => {
                    surface.show(frame.into_display_order());
                    frames_emitted += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    log::warn!("playback stopped after {} frames: {:#}", frames_emitted, err);
                    outcome = PlaybackOutcome::DecodeFailed;
                    break;
                }
            }
        }
        drop(guard);

        if !was_open {
            outcome = PlaybackOutcome::SourceUnavailable;
        } else if outcome == PlaybackOutcome::Exhausted && frames_emitted >= self.max_frames {
            outcome = PlaybackOutcome::CapReached;
        }
        if outcome == PlaybackOutcome::SourceUnavailable && self.policy == PlaybackPolicy::Strict
        {
            return Err(anyhow!("video source unavailable"));
        }

        log::info!(
            "playback finished: {} frames ({:?})",
            frames_emitted,
            outcome
        );
        Ok(PlaybackReport {
            frames_emitted,
            outcome,
        })
    }
}

/// Releases the wrapped source when dropped.
struct ReleaseGuard<'a, S: VideoSource + ?Sized> {
    source: &'a mut S,
}

impl<S: VideoSource + ?Sized> Drop for ReleaseGuard<'_, S> {
    fn drop(&mut self) {
        self.source.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ChannelOrder, DisplaySlot, Frame};

    /// In-memory source that counts releases.
    struct CountingSource {
        open: bool,
        remaining: u64,
        produced: u64,
        fail_at: Option<u64>,
        releases: u32,
    }

    impl CountingSource {
        fn with_frames(frames: u64) -> Self {
            Self {
                open: true,
                remaining: frames,
                produced: 0,
                fail_at: None,
                releases: 0,
            }
        }
    }

    impl VideoSource for CountingSource {
        fn is_open(&self) -> bool {
            self.open
        }

        fn read_frame(&mut self) -> Result<Option<Frame>> {
            assert!(self.open, "read after release");
            if self.fail_at == Some(self.produced) {
                return Err(anyhow!("corrupt packet"));
            }
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let index = self.produced as u8;
            self.produced += 1;
            Frame::new(vec![index, 0, 0], 1, 1, ChannelOrder::Bgr).map(Some)
        }

        fn release(&mut self) {
            self.open = false;
            self.releases += 1;
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Frame>,
    }

    impl DisplaySurface for Recorder {
        fn show(&mut self, frame: Frame) {
            self.frames.push(frame);
        }
    }

    #[test]
    fn emits_min_of_cap_and_available() {
        for (cap, available) in [(0, 5), (3, 5), (5, 5), (8, 5), (4, 0)] {
            let mut source = CountingSource::with_frames(available);
            let mut recorder = Recorder::default();
            let report = BoundedPlayer::new(cap, PlaybackPolicy::Lenient)
                .play(&mut source, &mut recorder)
                .unwrap();
            assert_eq!(report.frames_emitted, cap.min(available));
            assert_eq!(recorder.frames.len() as u64, cap.min(available));
            assert_eq!(source.releases, 1);
        }
    }

    #[test]
    fn frames_arrive_in_order_and_display_order() {
        let mut source = CountingSource::with_frames(4);
        let mut recorder = Recorder::default();
        BoundedPlayer::default()
            .play(&mut source, &mut recorder)
            .unwrap();
        for (i, frame) in recorder.frames.iter().enumerate() {
            assert_eq!(frame.order(), ChannelOrder::Rgb);
            assert_eq!(frame.pixel(0, 0), Some([0, 0, i as u8]));
        }
    }

    #[test]
    fn reports_cap_and_exhaustion() {
        let mut slot = DisplaySlot::new();
        let player = BoundedPlayer::new(2, PlaybackPolicy::Lenient);
        let capped = player
            .play(&mut CountingSource::with_frames(5), &mut slot)
            .unwrap();
        assert_eq!(capped.outcome, PlaybackOutcome::CapReached);

        let exhausted = player
            .play(&mut CountingSource::with_frames(1), &mut slot)
            .unwrap();
        assert_eq!(exhausted.outcome, PlaybackOutcome::Exhausted);
        assert_eq!(slot.updates(), 3);
    }

    #[test]
    fn decode_failure_stops_quietly() {
        let mut source = CountingSource::with_frames(10);
        source.fail_at = Some(3);
        let mut slot = DisplaySlot::new();
        let report = BoundedPlayer::default().play(&mut source, &mut slot).unwrap();
        assert_eq!(report.frames_emitted, 3);
        assert_eq!(report.outcome, PlaybackOutcome::DecodeFailed);
        assert_eq!(source.releases, 1);
    }

    #[test]
    fn closed_source_is_released_once() {
        let mut source = CountingSource::with_frames(10);
        source.open = false;
        let mut slot = DisplaySlot::new();

        let lenient = BoundedPlayer::default().play(&mut source, &mut slot).unwrap();
        assert_eq!(lenient.frames_emitted, 0);
        assert_eq!(lenient.outcome, PlaybackOutcome::SourceUnavailable);
        assert_eq!(source.releases, 1);

        let strict = BoundedPlayer::new(10, PlaybackPolicy::Strict).play(&mut source, &mut slot);
        assert!(strict.is_err());
        assert_eq!(source.releases, 2);
        assert!(slot.current().is_none());
    }
}
