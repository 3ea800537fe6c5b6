//! Phase classifier: scorer + guard + consensus
//!
//! Per frame:
//! 1. motion features over the analysis window (nothing happens before it fills)
//! 2. stillness gate: a window with too little motion keeps the current phase
//! 3. scorer distribution → raw candidate → guard filter
//! 4. the guarded candidate is voted on by the consensus filter

use super::constraints::{ConsensusFilter, TransitionGuard};
use super::label::PhaseLabel;
use super::motion::{MotionAnalyzer, MotionFeatures};
use super::scoring::{PhaseDistribution, PhaseScorer, ScorerInput};
use crate::config::CounterConfig;
use crate::error::ScorerError;
use crate::exercise::ExerciseTuning;
use crate::pose::AngleFrame;
use crate::session::buffer::RingBuffer;

/// Range (degrees) at which the range term of the confidence saturates
const CONFIDENCE_FULL_RANGE: f32 = 60.0;
const MIN_CONFIDENCE: f32 = 0.2;
/// History entries checked for canonical ordering
const SEQUENCE_SPAN: usize = 5;

/// Scorer output for one frame, after the guard
#[derive(Clone, Copy, Debug)]
pub struct PhaseCandidate {
    /// Top label straight from the scorer
    pub raw: PhaseLabel,
    /// Candidate after the guard (and stillness gate)
    pub guarded: PhaseLabel,
    pub distribution: PhaseDistribution,
    /// True when the window was too still to score
    pub still: bool,
}

pub struct PhaseClassifier {
    motion: MotionAnalyzer,
    scorer: Box<dyn PhaseScorer>,
    guard: TransitionGuard,
    consensus: ConsensusFilter,
    min_motion_range: f32,
}

impl PhaseClassifier {
    pub fn new(config: &CounterConfig, tuning: &ExerciseTuning, scorer: Box<dyn PhaseScorer>) -> Self {
        PhaseClassifier {
            motion: MotionAnalyzer::new(&config.motion, tuning),
            scorer,
            guard: TransitionGuard::new(config.guard.clone(), tuning.movement_threshold),
            consensus: ConsensusFilter::new(&config.consensus),
            min_motion_range: config.motion.min_motion_range,
        }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Motion features, once the angle buffer holds a full analysis window
    pub fn motion(&self, angles: &RingBuffer<AngleFrame>) -> Option<MotionFeatures> {
        self.motion.analyze(angles)
    }

    /// Score the current window and apply the guard
    pub fn classify(
        &mut self,
        angles: &RingBuffer<AngleFrame>,
        history: &[PhaseLabel],
        current: PhaseLabel,
        motion: &MotionFeatures,
    ) -> Result<PhaseCandidate, ScorerError> {
        if motion.range < self.min_motion_range {
            return Ok(PhaseCandidate {
                raw: current,
                guarded: current,
                distribution: PhaseDistribution::peaked(current, 1.0),
                still: true,
            });
        }

        let window: Vec<_> = angles
            .window(self.motion.analysis_window())
            .map(|frame| frame.angles)
            .collect();
        let input = ScorerInput {
            angles: &window,
            motion,
            history,
            current,
        };
        let distribution = self.scorer.score(&input)?;
        let raw = distribution.top();

        Ok(PhaseCandidate {
            raw,
            guarded: self.guard.filter(current, raw, motion),
            distribution,
            still: false,
        })
    }

    /// Phase to commit given the candidate buffer, if any
    pub fn decide(&self, current: PhaseLabel, candidates: &RingBuffer<PhaseLabel>) -> Option<PhaseLabel> {
        let recent: Vec<PhaseLabel> = candidates.window(self.consensus.window()).copied().collect();
        self.consensus.decide(current, &recent)
    }
}

/// Confidence in the committed phase:
/// 0.4 × range term + 0.3 × scorer agreement + 0.3 × sequence quality, clamped to [0.2, 1]
pub fn phase_confidence(range: f32, scorer_prob: f32, history: &[PhaseLabel]) -> f32 {
    let range_term = (range / CONFIDENCE_FULL_RANGE).clamp(0.0, 1.0);
    let confidence = 0.4 * range_term + 0.3 * scorer_prob.clamp(0.0, 1.0) + 0.3 * sequence_quality(history);
    confidence.clamp(MIN_CONFIDENCE, 1.0)
}

/// Fraction of recent history steps that follow the canonical cycle
pub fn sequence_quality(history: &[PhaseLabel]) -> f32 {
    if history.len() < 4 {
        return 0.5;
    }
    let recent = &history[history.len().saturating_sub(SEQUENCE_SPAN)..];
    let steps = recent.len() - 1;
    let canonical = recent
        .windows(2)
        .filter(|pair| pair[0].cycle_next() == pair[1])
        .count();
    canonical as f32 / steps as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseCategory, ExercisePattern};
    use crate::phase::RuleScorer;
    use crate::pose::{AngleKind, ANGLE_COUNT};
    use PhaseLabel::*;

    fn classifier() -> PhaseClassifier {
        let config = CounterConfig::default();
        let pattern = ExercisePattern::new("c", "curl", ExerciseCategory::UpperBody, [0.0; 8], [0.0; 8]);
        let tuning = ExerciseTuning::resolve(&pattern, &config);
        let scorer = RuleScorer::new(TransitionGuard::new(config.guard.clone(), tuning.movement_threshold));
        PhaseClassifier::new(&config, &tuning, Box::new(scorer))
    }

    fn angles(elbows: impl IntoIterator<Item = f32>) -> RingBuffer<AngleFrame> {
        let mut buffer = RingBuffer::new(45);
        for (i, elbow) in elbows.into_iter().enumerate() {
            let mut a = [175.0; ANGLE_COUNT];
            a[AngleKind::LeftElbow.index()] = elbow;
            a[AngleKind::RightElbow.index()] = elbow;
            buffer.push(AngleFrame::new(i as f64 / 30.0, a, 1.0));
        }
        buffer
    }

    #[test]
    fn test_still_window_keeps_phase() {
        let mut classifier = classifier();
        let buffer = angles(std::iter::repeat(165.0).take(20));
        let motion = classifier.motion(&buffer).unwrap();
        let candidate = classifier.classify(&buffer, &[], End, &motion).unwrap();
        assert!(candidate.still);
        assert_eq!(candidate.guarded, End);
    }

    #[test]
    fn test_moving_window_proposes_next_phase() {
        let mut classifier = classifier();
        // curling up 4 degrees per frame
        let buffer = angles((0..20).map(|i| 165.0 - 4.0 * i as f32));
        let motion = classifier.motion(&buffer).unwrap();
        let candidate = classifier.classify(&buffer, &[], Start, &motion).unwrap();
        assert!(!candidate.still);
        assert_eq!(candidate.guarded, Quarter);
    }

    #[test]
    fn test_decide_uses_consensus() {
        let classifier = classifier();
        let mut candidates = RingBuffer::new(10);
        candidates.push(Start);
        candidates.push(Quarter);
        assert_eq!(classifier.decide(Start, &candidates), None);
        candidates.push(Quarter);
        assert_eq!(classifier.decide(Start, &candidates), Some(Quarter));
    }

    #[test]
    fn test_sequence_quality() {
        assert_eq!(sequence_quality(&[Start, Quarter]), 0.5);
        assert_eq!(sequence_quality(&[Start, Quarter, Peak, Return, End]), 1.0);
        assert_eq!(sequence_quality(&[Quarter, Start, Quarter, Start]), 1.0 / 3.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(phase_confidence(0.0, 0.0, &[Quarter, Start, Quarter, Start]), MIN_CONFIDENCE);
        assert!((phase_confidence(120.0, 1.0, &[Start, Quarter, Peak, Return]) - 1.0).abs() < 1e-6);
        // 0.4 * 0.5 + 0.3 * 0.5 + 0.3 * 0.5
        assert!((phase_confidence(30.0, 0.5, &[]) - 0.5).abs() < 1e-6);
    }
}
