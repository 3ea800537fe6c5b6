//! Phase constraints: guard conditions and consensus
//!
//! Two deterministic layers sit between the scorer and a committed phase:
//! - `TransitionGuard` vetoes candidates whose position/velocity evidence
//!   does not support leaving the current phase
//! - `ConsensusFilter` requires a candidate to recur across recent raw
//!   classifications and to be a legal edge from the committed phase

use super::label::PhaseLabel;
use super::motion::MotionFeatures;
use crate::config::{ConsensusConfig, GuardThresholds};

/// Position/velocity conditions for each legal edge
#[derive(Clone, Debug)]
pub struct TransitionGuard {
    thresholds: GuardThresholds,
    /// Velocity needed to leave a resting posture (category-specific)
    movement_threshold: f32,
}

impl TransitionGuard {
    pub fn new(thresholds: GuardThresholds, movement_threshold: f32) -> Self {
        TransitionGuard {
            thresholds,
            movement_threshold,
        }
    }

    /// Phase the guard table itself would move to from `current`
    pub fn propose(&self, current: PhaseLabel, motion: &MotionFeatures) -> PhaseLabel {
        current
            .successors()
            .iter()
            .copied()
            .find(|&next| self.permits(current, next, motion))
            .unwrap_or(current)
    }

    /// Whether the evidence supports moving from `current` to `candidate`
    pub fn permits(&self, current: PhaseLabel, candidate: PhaseLabel, motion: &MotionFeatures) -> bool {
        use PhaseLabel::*;

        let t = &self.thresholds;
        let (pos, vel) = (motion.position, motion.velocity);

        match (current, candidate) {
            (a, b) if a == b => true,
            (Start, Quarter) => pos > t.start_to_quarter_position && vel > self.movement_threshold,
            (Quarter, Peak) => pos > t.quarter_to_peak_position && vel > t.quarter_to_peak_velocity,
            (Quarter, Start) => pos < t.quarter_to_start_position,
            (Peak, Return) => pos < t.peak_to_return_position && vel > t.peak_to_return_velocity,
            (Return, End) => pos < t.return_to_end_position && vel < t.return_to_end_velocity,
            (Return, Peak) => pos > t.return_to_peak_position,
            (End, Start) => vel > self.movement_threshold && pos > t.end_to_start_position,
            _ => false,
        }
    }

    /// Replace a candidate the evidence does not support with the current phase
    pub fn filter(&self, current: PhaseLabel, candidate: PhaseLabel, motion: &MotionFeatures) -> PhaseLabel {
        if self.permits(current, candidate, motion) {
            candidate
        } else {
            current
        }
    }

    /// The resting posture is held while slow and low
    pub fn holds_end(&self, motion: &MotionFeatures) -> bool {
        motion.velocity < self.thresholds.end_hold_velocity
            && motion.position < self.thresholds.end_hold_position
    }
}

/// Majority-of-recent-window vote over raw candidates
#[derive(Clone, Copy, Debug)]
pub struct ConsensusFilter {
    window: usize,
    min_votes: usize,
}

impl ConsensusFilter {
    pub fn new(config: &ConsensusConfig) -> Self {
        ConsensusFilter {
            window: config.window,
            min_votes: config.min_votes,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Decide the committed phase given the most recent raw candidates (oldest first).
    /// Returns `Some(next)` only for a change that is voted for and legal.
    pub fn decide(&self, current: PhaseLabel, recent: &[PhaseLabel]) -> Option<PhaseLabel> {
        let latest = *recent.last()?;
        if latest == current || !current.can_transition_to(latest) {
            return None;
        }

        let start = recent.len().saturating_sub(self.window);
        let votes = recent[start..].iter().filter(|&&c| c == latest).count();
        (votes >= self.min_votes).then_some(latest)
    }
}

impl Default for ConsensusFilter {
    fn default() -> Self {
        Self::new(&ConsensusConfig::default())
    }
}
