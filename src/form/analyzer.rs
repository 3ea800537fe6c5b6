//! Per-frame form assessment
//!
//! Three independent checks, in this order:
//! - symmetry between left/right joint pairs on the latest frame
//! - range of motion over the full angle buffer vs the reference pattern
//! - category rules (flexion depth, opening, upper bounds, alignment) over the full angle buffer
//!
//! The buffer-wide checks wait until the angle buffer is full.

use crate::config::FormConfig;
use crate::exercise::{ExercisePattern, ExerciseTuning, FormRule, RuleCheck};
use crate::pose::{AngleFrame, AngleKind, JointPair, ANGLE_COUNT};
use crate::session::buffer::RingBuffer;
use serde::Serialize;

/// Sum of pair differences (degrees) at which the symmetry score bottoms out
const SYMMETRY_SCALE: f32 = 240.0;
const MIN_SYMMETRY_SCORE: f32 = 0.2;
const RULE_PENALTY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormGrade {
    Excellent,
    Good,
    NeedsWork,
}

impl FormGrade {
    pub fn from_score(score: f32) -> Self {
        if score > 0.8 {
            FormGrade::Excellent
        } else if score > 0.6 {
            FormGrade::Good
        } else {
            FormGrade::NeedsWork
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormGrade::Excellent => "excellent",
            FormGrade::Good => "good",
            FormGrade::NeedsWork => "needs work",
        }
    }
}

/// What a correction is about. Stable across frames, unlike the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum CorrectionKind {
    Symmetry { pair: JointPair },
    RangeOfMotion { angle: AngleKind },
    Rule { message: &'static str },
}

impl CorrectionKind {
    /// Message without per-frame measurements
    pub fn label(self) -> String {
        match self {
            CorrectionKind::Symmetry { pair } => format!("Uneven {} movement", pair.as_str()),
            CorrectionKind::RangeOfMotion { angle } => {
                format!("Increase {} range of motion", angle.label())
            }
            CorrectionKind::Rule { message } => message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Correction {
    pub kind: CorrectionKind,
    pub message: String,
}

impl Correction {
    fn rule(rule: &FormRule) -> Self {
        Correction {
            kind: CorrectionKind::Rule {
                message: rule.message,
            },
            message: rule.message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormFeedback {
    /// 0..1
    pub score: f32,
    pub grade: FormGrade,
    /// Ordered: symmetry, range of motion, category rules
    pub corrections: Vec<Correction>,
}

impl FormFeedback {
    pub fn messages(&self) -> Vec<&str> {
        self.corrections.iter().map(|c| c.message.as_str()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct FormAnalyzer {
    expected_range: [f32; ANGLE_COUNT],
    symmetry_tolerance: f32,
    rom_fraction: f32,
    rom_min_expected: f32,
    rules: &'static [FormRule],
}

impl FormAnalyzer {
    pub fn new(config: &FormConfig, pattern: &ExercisePattern, tuning: &ExerciseTuning) -> Self {
        FormAnalyzer {
            expected_range: pattern.range,
            symmetry_tolerance: tuning.symmetry_tolerance,
            rom_fraction: config.rom_fraction,
            rom_min_expected: config.rom_min_expected,
            rules: tuning.rules,
        }
    }

    /// Assess the latest frame in `angles`
    pub fn analyze(&self, angles: &RingBuffer<AngleFrame>) -> FormFeedback {
        let Some(latest) = angles.latest() else {
            return FormFeedback {
                score: 1.0,
                grade: FormGrade::Excellent,
                corrections: Vec::new(),
            };
        };

        let (symmetry, mut corrections) = self.symmetry(latest);

        let (rom, hits) = if angles.is_full() {
            let (rom, rom_corrections) = self.range_of_motion(angles);
            corrections.extend(rom_corrections);
            let rule_corrections = self.rule_violations(angles);
            let hits = rule_corrections.len();
            corrections.extend(rule_corrections);
            (rom, hits)
        } else {
            (1.0, 0)
        };

        let score = (0.6 * symmetry + 0.4 * rom - RULE_PENALTY * hits as f32).clamp(0.0, 1.0);
        FormFeedback {
            score,
            grade: FormGrade::from_score(score),
            corrections,
        }
    }

    /// Symmetry score and one correction per pair over tolerance
    pub fn symmetry(&self, frame: &AngleFrame) -> (f32, Vec<Correction>) {
        let mut total = 0.0;
        let mut corrections = Vec::new();

        for pair in JointPair::ALL {
            let diff = (frame.get(pair.left()) - frame.get(pair.right())).abs();
            total += diff;
            if diff > self.symmetry_tolerance {
                corrections.push(Correction {
                    kind: CorrectionKind::Symmetry { pair },
                    message: format!("Uneven {} movement: {:.0}° difference", pair.as_str(), diff),
                });
            }
        }

        let score = (1.0 - total / SYMMETRY_SCALE).clamp(MIN_SYMMETRY_SCORE, 1.0);
        (score, corrections)
    }

    /// Observed excursion vs the reference; score is the mean fulfilled fraction
    fn range_of_motion(&self, angles: &RingBuffer<AngleFrame>) -> (f32, Vec<Correction>) {
        let mut lo = [f32::INFINITY; ANGLE_COUNT];
        let mut hi = [f32::NEG_INFINITY; ANGLE_COUNT];
        for frame in angles.iter() {
            for (i, &angle) in frame.angles.iter().enumerate() {
                lo[i] = lo[i].min(angle);
                hi[i] = hi[i].max(angle);
            }
        }

        let mut fulfilled = Vec::new();
        let mut corrections = Vec::new();
        for angle in AngleKind::ALL {
            let expected = self.expected_range[angle.index()];
            if expected <= self.rom_min_expected {
                continue;
            }
            let observed = hi[angle.index()] - lo[angle.index()];
            fulfilled.push((observed / expected).min(1.0));
            if observed < expected * self.rom_fraction {
                let kind = CorrectionKind::RangeOfMotion { angle };
                corrections.push(Correction {
                    message: kind.label(),
                    kind,
                });
            }
        }

        let score = if fulfilled.is_empty() {
            1.0
        } else {
            fulfilled.iter().sum::<f32>() / fulfilled.len() as f32
        };
        (score, corrections)
    }

    fn rule_violations(&self, angles: &RingBuffer<AngleFrame>) -> Vec<Correction> {
        self.rules
            .iter()
            .filter(|rule| {
                let (left, right) = (rule.pair.left(), rule.pair.right());
                match rule.check {
                    RuleCheck::FlexesBelow => {
                        let deepest = angles
                            .iter()
                            .map(|f| f.get(left).min(f.get(right)))
                            .fold(f32::INFINITY, f32::min);
                        deepest > rule.limit
                    }
                    RuleCheck::OpensBeyond => {
                        let widest = angles
                            .iter()
                            .map(|f| f.get(left).max(f.get(right)))
                            .fold(f32::NEG_INFINITY, f32::max);
                        widest < rule.limit
                    }
                    RuleCheck::StaysBelow => angles
                        .iter()
                        .any(|f| f.get(left).max(f.get(right)) > rule.limit),
                    RuleCheck::AlignedWith(other) => {
                        let drift: f32 = angles
                            .iter()
                            .map(|f| (pair_mean(f, rule.pair) - pair_mean(f, other)).abs())
                            .sum();
                        drift / angles.len() as f32 > rule.limit
                    }
                }
            })
            .map(Correction::rule)
            .collect()
    }
}

fn pair_mean(frame: &AngleFrame, pair: JointPair) -> f32 {
    (frame.get(pair.left()) + frame.get(pair.right())) / 2.0
}
