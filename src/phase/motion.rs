//! Motion features over the recent angle window
//!
//! The per-frame signal is the mean of the exercise's primary angles.
//! Position is where the current signal sits inside the window's span,
//! oriented so 0 is rest and 1 is peak.

use crate::config::MotionConfig;
use crate::exercise::{ExerciseTuning, PeakDirection};
use crate::pose::{AngleFrame, AngleKind};
use crate::session::buffer::RingBuffer;

/// Spans narrower than this (degrees) have no usable position
const MIN_SPAN: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionFeatures {
    /// Current primary-angle signal (degrees)
    pub signal: f32,
    /// 0 = rest, 1 = peak, within the analysis window
    pub position: f32,
    /// Degrees per frame, fastest primary angle
    pub velocity: f32,
    /// Signal span over the analysis window
    pub range: f32,
    /// Signal span over the whole angle buffer
    pub buffer_range: f32,
}

#[derive(Clone, Debug)]
pub struct MotionAnalyzer {
    analysis_window: usize,
    velocity_span: usize,
    primary_angles: Vec<AngleKind>,
    peak_direction: PeakDirection,
}

impl MotionAnalyzer {
    pub fn new(config: &MotionConfig, tuning: &ExerciseTuning) -> Self {
        MotionAnalyzer {
            analysis_window: config.analysis_window,
            velocity_span: config.velocity_span,
            primary_angles: tuning.primary_angles.clone(),
            peak_direction: tuning.peak_direction,
        }
    }

    pub fn analysis_window(&self) -> usize {
        self.analysis_window
    }

    pub fn signal(&self, frame: &AngleFrame) -> f32 {
        frame.mean_of(&self.primary_angles)
    }

    /// Features for the latest frame, or `None` until the window is filled.
    /// Windows shorter than two frames, or not longer than the velocity span,
    /// never produce features.
    pub fn analyze(&self, buffer: &RingBuffer<AngleFrame>) -> Option<MotionFeatures> {
        if self.analysis_window < 2
            || self.analysis_window <= self.velocity_span
            || buffer.len() < self.analysis_window
        {
            return None;
        }

        let window: Vec<&AngleFrame> = buffer.window(self.analysis_window).collect();
        let signals: Vec<f32> = window.iter().map(|f| self.signal(f)).collect();

        let (lo, hi) = span(signals.iter().copied());
        let n = signals.len();
        let current = (signals[n - 1] + signals[n - 2]) / 2.0;

        let raw_position = if hi - lo > MIN_SPAN {
            ((current - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let position = match self.peak_direction {
            PeakDirection::Flexion => 1.0 - raw_position,
            PeakDirection::Extension => raw_position,
        };

        let latest = window[n - 1];
        let earlier = window[n - 1 - self.velocity_span];
        let velocity = self
            .primary_angles
            .iter()
            .map(|&kind| (latest.get(kind) - earlier.get(kind)).abs() / self.velocity_span as f32)
            .fold(0.0_f32, f32::max);

        let (buffer_lo, buffer_hi) = span(buffer.iter().map(|f| self.signal(f)));

        Some(MotionFeatures {
            signal: signals[n - 1],
            position,
            velocity,
            range: hi - lo,
            buffer_range: buffer_hi - buffer_lo,
        })
    }
}

fn span(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
