//! Session state tracking
//!
//! Maintains:
//! - The three temporal buffers
//! - Committed phase and its confidence
//! - Rep counter progress
//! - Form history and recurring corrections
//! - Frame statistics and pose-loss tracking

use super::buffer::TemporalBuffers;
use super::counter::RepCounter;
use crate::config::CounterConfig;
use crate::exercise::ExerciseTuning;
use crate::form::{CorrectionTally, FormFeedback, FormHistory};
use crate::phase::PhaseLabel;
use serde::Serialize;

/// Per-session frame counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Frames accepted, including frames without a usable pose
    pub processed: u32,
    /// Frames rejected with an error
    pub dropped: u32,
    /// Accepted frames without a usable pose
    pub gap: u32,
    /// Frames over the processing budget
    pub slow: u32,
}

/// Complete mutable state of one session
#[derive(Clone, Debug)]
pub struct SessionState {
    pub buffers: TemporalBuffers,
    pub current_phase: PhaseLabel,
    /// 0..1
    pub phase_confidence: f32,
    pub counter: RepCounter,
    /// Committed transitions over the whole session
    pub transitions: u32,
    pub form_history: FormHistory,
    pub corrections: CorrectionTally,
    pub last_feedback: Option<FormFeedback>,
    pub stats: FrameStats,
    /// Timestamp of the first accepted frame
    pub started_at: Option<f64>,
    /// Timestamp of the latest accepted frame
    pub last_timestamp: Option<f64>,
    /// Timestamp of the latest frame with a usable pose
    pub last_usable_timestamp: Option<f64>,
    /// Set once buffers were dropped for the current gap
    pub tracking_lost: bool,
}

impl SessionState {
    pub fn new(config: &CounterConfig, tuning: &ExerciseTuning) -> Self {
        SessionState {
            buffers: TemporalBuffers::new(&config.buffers),
            current_phase: PhaseLabel::Start,
            phase_confidence: 0.0,
            counter: RepCounter::new(&config.rep, tuning),
            transitions: 0,
            form_history: FormHistory::new(config.form.history_capacity),
            corrections: CorrectionTally::new(),
            last_feedback: None,
            stats: FrameStats::default(),
            started_at: None,
            last_timestamp: None,
            last_usable_timestamp: None,
            tracking_lost: false,
        }
    }

    /// Mark a frame at `timestamp` as accepted
    pub fn touch(&mut self, timestamp: f64) {
        self.started_at.get_or_insert(timestamp);
        self.last_timestamp = Some(timestamp);
        self.stats.processed += 1;
    }

    /// Seconds without a usable pose as of `timestamp`
    pub fn gap_secs(&self, timestamp: f64) -> f64 {
        let since = self.last_usable_timestamp.or(self.started_at).unwrap_or(timestamp);
        timestamp - since
    }

    /// Commit a phase change; returns the edge taken
    pub fn commit(&mut self, next: PhaseLabel) -> (PhaseLabel, PhaseLabel) {
        let from = self.current_phase;
        self.current_phase = next;
        self.buffers.history.push(next);
        self.counter.on_transition();
        self.transitions += 1;
        (from, next)
    }

    /// Prolonged pose loss: forget motion and the partial cycle
    pub fn drop_tracking(&mut self) {
        self.buffers.clear_motion();
        self.current_phase = PhaseLabel::Start;
        self.phase_confidence = 0.0;
        self.counter.abandon_cycle();
        self.tracking_lost = true;
    }

    pub fn duration_secs(&self) -> f64 {
        match (self.started_at, self.last_timestamp) {
            (Some(start), Some(last)) => last - start,
            _ => 0.0,
        }
    }

    /// Clear everything back to a fresh session
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.current_phase = PhaseLabel::Start;
        self.phase_confidence = 0.0;
        self.counter.reset();
        self.transitions = 0;
        self.form_history.reset();
        self.corrections.reset();
        self.last_feedback = None;
        self.stats = FrameStats::default();
        self.started_at = None;
        self.last_timestamp = None;
        self.last_usable_timestamp = None;
        self.tracking_lost = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseCategory, ExercisePattern};
    use crate::pose::AngleFrame;

    fn state() -> SessionState {
        let config = CounterConfig::default();
        let pattern = ExercisePattern::new("s", "curl", ExerciseCategory::UpperBody, [0.0; 8], [0.0; 8]);
        SessionState::new(&config, &ExerciseTuning::resolve(&pattern, &config))
    }

    #[test]
    fn test_fresh_state() {
        let state = state();
        assert_eq!(state.current_phase, PhaseLabel::Start);
        assert_eq!(state.phase_confidence, 0.0);
        assert_eq!(state.duration_secs(), 0.0);
    }

    #[test]
    fn test_touch_starts_clock() {
        let mut state = state();
        state.touch(10.0);
        state.touch(12.5);
        assert_eq!(state.started_at, Some(10.0));
        // the cooldown only runs between reps
        assert_eq!(state.counter.last_rep_timestamp(), None);
        assert_eq!(state.duration_secs(), 2.5);
        assert_eq!(state.stats.processed, 2);
        assert_eq!(state.gap_secs(12.5), 2.5);
    }

    #[test]
    fn test_drop_tracking_keeps_history() {
        let mut state = state();
        state.buffers.angles.push(AngleFrame::new(0.0, [90.0; 8], 1.0));
        assert_eq!(state.commit(PhaseLabel::Quarter), (PhaseLabel::Start, PhaseLabel::Quarter));
        state.phase_confidence = 0.7;

        state.drop_tracking();
        assert_eq!(state.current_phase, PhaseLabel::Start);
        assert_eq!(state.phase_confidence, 0.0);
        assert!(state.buffers.angles.is_empty());
        assert_eq!(state.buffers.history.len(), 1);
        assert_eq!(state.counter.transition_count(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = state();
        state.touch(1.0);
        state.commit(PhaseLabel::Quarter);
        state.form_history.record(0.5);
        state.reset();
        assert_eq!(state.transitions, 0);
        assert!(state.buffers.history.is_empty());
        assert_eq!(state.form_history.count(), 0);
        assert_eq!(state.started_at, None);
    }
}
