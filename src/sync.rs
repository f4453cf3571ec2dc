//! Aligns the continuous trajectory with a fixed-rate video frame stream.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::types::{Pixel, Sample};

pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// A gap between samples shorter than this many frame intervals counts as
/// continuous motion, so every frame inside it is labeled.
pub const DENSE_GAP_FRAMES: f64 = 1.3;

/// A frame ending this many intervals or less before a sample is labeled
/// with that sample's position.
pub const LOOKAHEAD_FRAMES: f64 = 0.3;

/// Something that hands out video frames one at a time.
///
/// `read_next_frame` may block; `None` means the stream ended or a read failed.
pub trait FrameSource {
    type Frame;

    fn is_open(&self) -> bool;

    fn read_next_frame(&mut self) -> Option<Self::Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    type Frame = S::Frame;

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn read_next_frame(&mut self) -> Option<Self::Frame> {
        (**self).read_next_frame()
    }
}

/// A frame source without video: each frame is just its index.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    emitted: u64,
    limit: Option<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: u64) -> Self {
        Self {
            emitted: 0,
            limit: Some(limit),
        }
    }
}

impl FrameSource for FrameClock {
    type Frame = u64;

    fn is_open(&self) -> bool {
        self.limit.map_or(true, |limit| self.emitted < limit)
    }

    fn read_next_frame(&mut self) -> Option<u64> {
        if !self.is_open() {
            return None;
        }
        let frame = self.emitted;
        self.emitted += 1;
        Some(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub frame_rate: f64,
    /// Milliseconds the video lags behind the beatmap clock.
    pub delay: i32,
    pub dense_gap: f64,
    pub lookahead: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            delay: 0,
            dense_gap: DENSE_GAP_FRAMES,
            lookahead: LOOKAHEAD_FRAMES,
        }
    }
}

impl SyncConfig {
    pub fn with_delay(delay: i32) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.frame_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFrame<F> {
    pub index: u64,
    pub frame: F,
    /// Where the cursor should be, or `None` while idle.
    pub position: Option<Pixel>,
}

impl<F> LabeledFrame<F> {
    pub fn is_click(&self) -> bool {
        self.position.is_some()
    }
}

/// Pull iterator pairing each frame of `source` with a trajectory label.
///
/// Ends when the samples run out or the source stops producing frames.
/// Not restartable; build a new one to label again.
pub struct FrameLabels<S, I> {
    source: S,
    samples: I,
    config: SyncConfig,
    current: Option<Sample>,
    prev_time: f64,
    frames_emitted: u64,
    finished: bool,
}

impl<S, I> FrameLabels<S, I>
where
    S: FrameSource,
    I: Iterator<Item = Sample>,
{
    pub fn new(source: S, samples: impl IntoIterator<IntoIter = I>, config: SyncConfig) -> Self {
        Self {
            source,
            samples: samples.into_iter(),
            config,
            current: None,
            prev_time: 0.0,
            frames_emitted: 0,
            finished: false,
        }
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Nominal time of the frame boundary after `frames` frames.
    fn clock(&self, frames: u64) -> f64 {
        -(self.config.delay as f64) + frames as f64 * 1000.0 / self.config.frame_rate
    }

    fn label(&self, sample: &Sample) -> Option<Pixel> {
        let interval = self.config.frame_interval();
        let time = sample.time as f64;

        let dense = (time - self.prev_time) / interval < self.config.dense_gap;
        let imminent = (self.clock(self.frames_emitted) - time) / interval > -self.config.lookahead;

        (dense || imminent).then_some(sample.position)
    }

    fn finish(&mut self) -> Option<LabeledFrame<S::Frame>> {
        self.finished = true;
        None
    }
}

impl<S, I> Iterator for FrameLabels<S, I>
where
    S: FrameSource,
    I: Iterator<Item = Sample>,
{
    type Item = LabeledFrame<S::Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let sample = match self.current {
                Some(sample) => sample,
                None => {
                    let Some(sample) = self.samples.next() else {
                        return self.finish();
                    };
                    if !self.source.is_open() {
                        return self.finish();
                    }
                    self.current = Some(sample);
                    sample
                }
            };

            if self.clock(self.frames_emitted) < sample.time as f64 {
                let Some(frame) = self.source.read_next_frame() else {
                    return self.finish();
                };
                let index = self.frames_emitted;
                self.frames_emitted += 1;

                let position = self.label(&sample);
                trace!("frame {index} -> {position:?} (sample at {}ms)", sample.time);
                return Some(LabeledFrame {
                    index,
                    frame,
                    position,
                });
            }

            self.prev_time = sample.time as f64;
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap(x: f64, y: f64, time: i32) -> Sample {
        Sample::new(Pixel::new(x, y), time)
    }

    fn labels(samples: Vec<Sample>, config: SyncConfig) -> Vec<Option<Pixel>> {
        FrameLabels::new(FrameClock::new(), samples, config)
            .map(|frame| frame.position)
            .collect()
    }

    #[test]
    fn single_tap_labels_only_the_frame_before_it() {
        let labels = labels(vec![tap(100.0, 100.0, 500)], SyncConfig::default());

        assert_eq!(labels.len(), 30);
        assert!(labels[..29].iter().all(Option::is_none));
        assert_eq!(labels[29], Some(Pixel::new(100.0, 100.0)));
    }

    #[test]
    fn frames_carry_their_index_and_source_frame() {
        let frames: Vec<_> = FrameLabels::new(
            FrameClock::new(),
            vec![tap(1.0, 1.0, 100)],
            SyncConfig::default(),
        )
        .collect();

        assert_eq!(frames.len(), 6);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i as u64);
            assert_eq!(frame.frame, i as u64);
        }
        assert!(frames[5].is_click());
    }

    #[test]
    fn dense_samples_label_every_frame() {
        let samples: Vec<Sample> = (0..=100)
            .map(|i| tap(i as f64, 50.0, 1000 + i * 10))
            .collect();
        let labels = labels(samples, SyncConfig::default());

        // Frames whose boundary lies inside (1000, 2000] all follow the slide.
        let mut labeled_inside = 0;
        for (i, label) in labels.iter().enumerate() {
            let boundary = (i + 1) as f64 * 1000.0 / 60.0;
            if boundary > 1000.0 {
                assert!(label.is_some(), "frame {i} is idle");
                labeled_inside += 1;
            } else if boundary < 995.0 {
                assert!(label.is_none(), "frame {i} is labeled");
            }
        }
        assert_eq!(labeled_inside, 60);
    }

    #[test]
    fn sparse_samples_leave_gaps_idle() {
        let labels = labels(
            vec![tap(10.0, 10.0, 500), tap(20.0, 20.0, 1500)],
            SyncConfig::default(),
        );

        assert_eq!(labels.len(), 90);
        assert_eq!(labels.iter().filter(|label| label.is_some()).count(), 2);
        assert_eq!(labels[29], Some(Pixel::new(10.0, 10.0)));
        assert_eq!(labels[89], Some(Pixel::new(20.0, 20.0)));
        assert!(labels[30..89].iter().all(Option::is_none));
    }

    #[test]
    fn close_samples_count_as_continuous() {
        // 20ms apart is under 1.3 intervals, so the frames between are labeled.
        let labels = labels(
            vec![tap(10.0, 10.0, 500), tap(20.0, 20.0, 520)],
            SyncConfig::default(),
        );

        assert_eq!(labels.len(), 32);
        assert_eq!(labels[30], Some(Pixel::new(20.0, 20.0)));
        assert_eq!(labels[31], Some(Pixel::new(20.0, 20.0)));
    }

    #[test]
    fn delay_shifts_the_frame_clock() {
        let labels = labels(vec![tap(1.0, 1.0, 500)], SyncConfig::with_delay(100));

        // Frames start 100ms early, so six more fit before the tap.
        assert_eq!(labels.len(), 36);
        assert_eq!(labels[35], Some(Pixel::new(1.0, 1.0)));
    }

    #[test]
    fn exhausted_source_ends_the_sequence() {
        let mut clock = FrameClock::with_limit(10);
        let mut frames =
            FrameLabels::new(&mut clock, vec![tap(1.0, 1.0, 500)], SyncConfig::default());

        assert_eq!(frames.by_ref().count(), 10);
        assert_eq!(frames.next(), None);
        assert_eq!(frames.frames_emitted(), 10);
        assert!(!clock.is_open());
    }

    #[test]
    fn closed_source_emits_nothing() {
        let labels: Vec<_> = FrameLabels::new(
            FrameClock::with_limit(0),
            vec![tap(1.0, 1.0, 500)],
            SyncConfig::default(),
        )
        .collect();

        assert!(labels.is_empty());
    }

    #[test]
    fn samples_already_behind_the_clock_emit_nothing() {
        let labels = labels(
            vec![tap(1.0, 1.0, -50), tap(2.0, 2.0, 0)],
            SyncConfig::default(),
        );
        assert!(labels.is_empty());
    }
}
