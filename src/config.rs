//! Counter configuration
//!
//! Every empirically tuned threshold lives here. Values are loaded from a
//! JSON file; any section or field left out keeps its default.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub buffers: BufferConfig,
    pub motion: MotionConfig,
    pub guard: GuardThresholds,
    pub consensus: ConsensusConfig,
    pub rep: RepConfig,
    pub form: FormConfig,
    pub tracking: TrackingConfig,
    pub scorer: ScorerConfig,
}

/// Ring buffer capacities
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Angle frames (45 = 1.5s at 30fps)
    pub angle_capacity: usize,
    /// Raw phase candidates kept for consensus
    pub candidate_capacity: usize,
    /// Committed phases
    pub history_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            angle_capacity: 45,
            candidate_capacity: 10,
            history_capacity: 20,
        }
    }
}

/// Motion feature extraction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Frames used for position/velocity; classification waits until this many are buffered
    pub analysis_window: usize,
    /// Finite-difference span for velocity (frames)
    pub velocity_span: usize,
    /// Below this signal range (degrees) the window counts as still and the phase holds
    pub min_motion_range: f32,
    /// Velocity (degrees/frame) that counts as deliberate movement
    pub movement_threshold: f32,
    /// Measure angles in 3D instead of the image plane
    pub use_depth: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            analysis_window: 15,
            velocity_span: 4,
            min_motion_range: 20.0,
            movement_threshold: 1.5,
            use_depth: false,
        }
    }
}

/// Guard conditions for promoting a phase candidate.
/// Positions are 0..1 within the window range, velocities degrees/frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardThresholds {
    pub start_to_quarter_position: f32,
    pub quarter_to_peak_position: f32,
    pub quarter_to_peak_velocity: f32,
    pub quarter_to_start_position: f32,
    pub peak_to_return_position: f32,
    pub peak_to_return_velocity: f32,
    pub return_to_end_position: f32,
    pub return_to_end_velocity: f32,
    pub return_to_peak_position: f32,
    pub end_hold_velocity: f32,
    pub end_hold_position: f32,
    pub end_to_start_position: f32,
}

impl Default for GuardThresholds {
    fn default() -> Self {
        GuardThresholds {
            start_to_quarter_position: 0.25,
            quarter_to_peak_position: 0.75,
            quarter_to_peak_velocity: 1.5,
            quarter_to_start_position: 0.20,
            peak_to_return_position: 0.70,
            peak_to_return_velocity: 1.0,
            return_to_end_position: 0.25,
            return_to_end_velocity: 1.5,
            return_to_peak_position: 0.60,
            end_hold_velocity: 1.0,
            end_hold_position: 0.20,
            end_to_start_position: 0.30,
        }
    }
}

/// Consensus filter over raw candidates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Most recent raw candidates considered
    pub window: usize,
    /// Votes a candidate needs within the window
    pub min_votes: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            window: 4,
            min_votes: 2,
        }
    }
}

/// When a completed cycle is counted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepTrigger {
    /// Count on the `end -> start` commit that closes the cycle
    #[default]
    CycleClosed,
    /// Count while the committed phase is `end`
    EndCommitted,
}

/// Rep completion predicate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepConfig {
    /// Minimum seconds between counted reps
    pub cooldown_secs: f64,
    /// Minimum angle excursion (degrees) over the cycle
    pub min_angle_range: f32,
    /// Committed transitions required since the last rep
    pub min_transitions: u32,
    /// Committed phases required in history
    pub min_history: usize,
    pub trigger: RepTrigger,
}

impl Default for RepConfig {
    fn default() -> Self {
        RepConfig {
            cooldown_secs: 1.0,
            min_angle_range: 30.0,
            min_transitions: 3,
            min_history: 4,
            trigger: RepTrigger::CycleClosed,
        }
    }
}

/// Form analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Max left/right difference (degrees) before a symmetry correction
    pub symmetry_tolerance: f32,
    /// Fraction of the expected range that must be observed
    pub rom_fraction: f32,
    /// Expected ranges at or below this (degrees) are not checked
    pub rom_min_expected: f32,
    /// Form scores kept for the trend
    pub history_capacity: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            symmetry_tolerance: 25.0,
            rom_fraction: 0.7,
            rom_min_expected: 30.0,
            history_capacity: 30,
        }
    }
}

/// Pose loss handling and frame budget
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Frames below this landmark confidence count as pose lost
    pub min_landmark_confidence: f32,
    /// Seconds without a usable frame before buffers are dropped
    pub max_gap_secs: f64,
    /// Phase confidence multiplier per lost frame
    pub gap_confidence_decay: f32,
    /// Per-frame processing budget (milliseconds)
    pub frame_budget_ms: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            min_landmark_confidence: 0.5,
            max_gap_secs: 1.5,
            gap_confidence_decay: 0.5,
            frame_budget_ms: 33.0,
        }
    }
}

/// Which phase scorer sessions use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Rule,
    Sequence,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub kind: ScorerKind,
    /// Model bundle for the sequence scorer
    pub weights: Option<PathBuf>,
}

impl CounterConfig {
    /// Load from a JSON file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: CounterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.buffers.angle_capacity == 0 {
            return Err(invalid("buffers.angle_capacity", "must be positive"));
        }
        if self.buffers.history_capacity == 0 {
            return Err(invalid("buffers.history_capacity", "must be positive"));
        }
        if self.consensus.window == 0 || self.consensus.min_votes == 0 {
            return Err(invalid("consensus", "window and min_votes must be positive"));
        }
        if self.consensus.window > self.buffers.candidate_capacity {
            return Err(invalid(
                "consensus.window",
                format!(
                    "{} exceeds candidate capacity {}",
                    self.consensus.window, self.buffers.candidate_capacity
                ),
            ));
        }
        if self.consensus.min_votes > self.consensus.window {
            return Err(invalid("consensus.min_votes", "larger than the window"));
        }
        if self.motion.velocity_span == 0 {
            return Err(invalid("motion.velocity_span", "must be positive"));
        }
        if self.motion.analysis_window <= self.motion.velocity_span {
            return Err(invalid(
                "motion.analysis_window",
                "must be longer than the velocity span",
            ));
        }
        if self.motion.analysis_window > self.buffers.angle_capacity {
            return Err(invalid(
                "motion.analysis_window",
                "exceeds the angle buffer capacity",
            ));
        }
        if !(self.rep.cooldown_secs > 0.0) {
            return Err(invalid("rep.cooldown_secs", "must be positive"));
        }
        if !(self.form.rom_fraction > 0.0 && self.form.rom_fraction <= 1.0) {
            return Err(invalid("form.rom_fraction", "must be in (0, 1]"));
        }
        if !(self.tracking.max_gap_secs > 0.0) {
            return Err(invalid("tracking.max_gap_secs", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffers.angle_capacity, 45);
        assert_eq!(config.rep.trigger, RepTrigger::CycleClosed);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"rep": {"cooldown_secs": 2.0, "trigger": "end_committed"}, "form": {"symmetry_tolerance": 15}}"#;
        let config: CounterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rep.cooldown_secs, 2.0);
        assert_eq!(config.rep.trigger, RepTrigger::EndCommitted);
        assert_eq!(config.rep.min_angle_range, 30.0);
        assert_eq!(config.form.symmetry_tolerance, 15.0);
        assert_eq!(config.guard, GuardThresholds::default());
    }

    #[test]
    fn test_rejects_oversized_consensus_window() {
        let mut config = CounterConfig::default();
        config.consensus.window = 12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "consensus.window", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_cooldown() {
        let mut config = CounterConfig::default();
        config.rep.cooldown_secs = 0.0;
        assert!(config.validate().is_err());
    }
}
