//! Phase scoring: window → distribution over the five phases
//!
//! Scorers are interchangeable behind `PhaseScorer`. The guard and consensus
//! layers only ever see the resulting `PhaseDistribution`, so swapping the
//! learned model for the rule fallback touches nothing downstream.

use super::constraints::TransitionGuard;
use super::label::{PhaseLabel, PHASE_COUNT};
use super::motion::MotionFeatures;
use crate::error::ScorerError;
use crate::pose::ANGLE_COUNT;

/// Everything a scorer may look at for one frame
#[derive(Clone, Copy, Debug)]
pub struct ScorerInput<'a> {
    /// Analysis window, oldest first
    pub angles: &'a [[f32; ANGLE_COUNT]],
    pub motion: &'a MotionFeatures,
    /// Committed phases, oldest first
    pub history: &'a [PhaseLabel],
    pub current: PhaseLabel,
}

/// Probability per phase, in `PhaseLabel::ALL` order
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseDistribution {
    probs: [f32; PHASE_COUNT],
}

impl PhaseDistribution {
    /// Normalize raw non-negative scores; an all-zero input becomes uniform
    pub fn new(scores: [f32; PHASE_COUNT]) -> Self {
        let cleaned = scores.map(|s| if s.is_finite() { s.max(0.0) } else { 0.0 });
        let sum: f32 = cleaned.iter().sum();
        let probs = if sum > 0.0 {
            cleaned.map(|s| s / sum)
        } else {
            [1.0 / PHASE_COUNT as f32; PHASE_COUNT]
        };
        PhaseDistribution { probs }
    }

    /// Model output of unknown length
    pub fn from_slice(values: &[f32]) -> Result<Self, ScorerError> {
        let scores: [f32; PHASE_COUNT] = values
            .try_into()
            .map_err(|_| ScorerError::OutputShape(values.len()))?;
        Ok(Self::new(scores))
    }

    /// `mass` on one label, the rest spread evenly
    pub fn peaked(label: PhaseLabel, mass: f32) -> Self {
        let mass = mass.clamp(0.0, 1.0);
        let rest = (1.0 - mass) / (PHASE_COUNT - 1) as f32;
        let mut probs = [rest; PHASE_COUNT];
        probs[label.index()] = mass;
        PhaseDistribution { probs }
    }

    /// Most likely label; ties go to the earlier phase
    pub fn top(&self) -> PhaseLabel {
        let mut best = 0;
        for (i, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = i;
            }
        }
        PhaseLabel::ALL[best]
    }

    pub fn prob(&self, label: PhaseLabel) -> f32 {
        self.probs[label.index()]
    }

    pub fn probs(&self) -> &[f32; PHASE_COUNT] {
        &self.probs
    }
}

/// Replaceable phase scorer
pub trait PhaseScorer: Send {
    fn name(&self) -> &str;
    fn score(&mut self, input: &ScorerInput<'_>) -> Result<PhaseDistribution, ScorerError>;
}

/// Position/velocity heuristics: the guard table's own proposal
#[derive(Clone, Debug)]
pub struct RuleScorer {
    guard: TransitionGuard,
}

impl RuleScorer {
    const PROPOSAL_MASS: f32 = 0.8;
    const HOLD_MASS: f32 = 0.9;

    pub fn new(guard: TransitionGuard) -> Self {
        RuleScorer { guard }
    }
}

impl PhaseScorer for RuleScorer {
    fn name(&self) -> &str {
        "rule"
    }

    fn score(&mut self, input: &ScorerInput<'_>) -> Result<PhaseDistribution, ScorerError> {
        let proposal = self.guard.propose(input.current, input.motion);
        let mass = if proposal == PhaseLabel::End && self.guard.holds_end(input.motion) {
            Self::HOLD_MASS
        } else {
            Self::PROPOSAL_MASS
        };
        Ok(PhaseDistribution::peaked(proposal, mass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardThresholds;

    #[test]
    fn test_distribution_normalizes() {
        let dist = PhaseDistribution::new([1.0, 3.0, 0.0, 0.0, 0.0]);
        assert!((dist.probs().iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(dist.top(), PhaseLabel::Quarter);
        assert!((dist.prob(PhaseLabel::Quarter) - 0.75).abs() < 1e-6);

        let uniform = PhaseDistribution::new([0.0, f32::NAN, 0.0, -1.0, 0.0]);
        assert_eq!(uniform.top(), PhaseLabel::Start);
        assert!((uniform.prob(PhaseLabel::End) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert!(PhaseDistribution::from_slice(&[0.2; 5]).is_ok());
        assert!(matches!(
            PhaseDistribution::from_slice(&[0.5; 3]),
            Err(ScorerError::OutputShape(3))
        ));
    }

    #[test]
    fn test_rule_scorer_proposes_from_table() {
        let mut scorer = RuleScorer::new(TransitionGuard::new(GuardThresholds::default(), 1.5));
        let window = [[160.0; ANGLE_COUNT]; 15];
        let motion = MotionFeatures {
            position: 0.9,
            velocity: 4.0,
            range: 50.0,
            ..MotionFeatures::default()
        };
        let input = ScorerInput {
            angles: &window,
            motion: &motion,
            history: &[],
            current: PhaseLabel::Start,
        };
        let dist = scorer.score(&input).unwrap();
        assert_eq!(dist.top(), PhaseLabel::Quarter);
        assert!((dist.prob(PhaseLabel::Quarter) - 0.8).abs() < 1e-6);

        let resting = MotionFeatures {
            position: 0.05,
            velocity: 0.2,
            range: 50.0,
            ..MotionFeatures::default()
        };
        let input = ScorerInput {
            motion: &resting,
            current: PhaseLabel::End,
            ..input
        };
        let dist = scorer.score(&input).unwrap();
        assert_eq!(dist.top(), PhaseLabel::End);
        assert!((dist.prob(PhaseLabel::End) - 0.9).abs() < 1e-6);
    }
}
