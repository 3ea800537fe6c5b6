//! Phase module: per-frame phase classification
//!
//! # Components
//! - `label.rs`: phase labels and the transition table
//! - `motion.rs`: position/velocity features over the angle window
//! - `scoring.rs`: `PhaseScorer` trait, distributions, rule fallback
//! - `model.rs`: candle sequence model and its scorer
//! - `constraints.rs`: transition guard and consensus filter
//! - `classifier.rs`: ties the layers together, phase confidence

pub mod classifier;
pub mod constraints;
pub mod label;
pub mod model;
pub mod motion;
pub mod scoring;

pub use classifier::{phase_confidence, sequence_quality, PhaseCandidate, PhaseClassifier};
pub use constraints::{ConsensusFilter, TransitionGuard};
pub use label::{PhaseLabel, PHASE_COUNT};
pub use model::{save_bundle, SequenceConfig, SequenceModel, SequenceScorer};
pub use motion::{MotionAnalyzer, MotionFeatures};
pub use scoring::{PhaseDistribution, PhaseScorer, RuleScorer, ScorerInput};
