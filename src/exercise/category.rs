//! Exercise categories and their policy table
//!
//! A category is resolved once when the exercise is loaded. Everything that
//! differs between categories (primary joints, thresholds, corrective rules)
//! comes from the static policy table below, never from the exercise name.

use crate::pose::{AngleKind, JointPair};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    UpperBody,
    LowerBody,
    Core,
    Cardio,
    #[default]
    General,
}

/// Which way the primary angle moves toward the peak of a rep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakDirection {
    /// Angle closes at the peak (curls, squats)
    #[default]
    Flexion,
    /// Angle opens at the peak (raises)
    Extension,
}

/// How a corrective rule reads the angle window
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RuleCheck {
    /// The most flexed angle of the pair must drop below the limit
    FlexesBelow,
    /// The most open angle of the pair must exceed the limit
    OpensBeyond,
    /// Neither side of the pair may open past the limit on any frame
    StaysBelow,
    /// Mean drift between this pair and another pair must stay within the limit
    AlignedWith(JointPair),
}

/// Category-specific corrective rule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormRule {
    pub pair: JointPair,
    pub check: RuleCheck,
    pub limit: f32,
    pub message: &'static str,
}

/// Thresholds and rules for one category. `None` keeps the configured default.
#[derive(Debug)]
pub struct CategoryPolicy {
    pub primary_angles: &'static [AngleKind],
    pub movement_threshold: Option<f32>,
    pub min_angle_range: Option<f32>,
    pub symmetry_tolerance: Option<f32>,
    pub rules: &'static [FormRule],
}

static UPPER_BODY: CategoryPolicy = CategoryPolicy {
    primary_angles: &[AngleKind::LeftElbow, AngleKind::RightElbow],
    movement_threshold: Some(1.5),
    min_angle_range: Some(30.0),
    symmetry_tolerance: None,
    rules: &[
        FormRule {
            pair: JointPair::Elbow,
            check: RuleCheck::FlexesBelow,
            limit: 160.0,
            message: "Bend elbows more for better muscle activation",
        },
        FormRule {
            pair: JointPair::Shoulder,
            check: RuleCheck::StaysBelow,
            limit: 45.0,
            message: "Keep elbows closer to body",
        },
    ],
};

static LOWER_BODY: CategoryPolicy = CategoryPolicy {
    primary_angles: &[AngleKind::LeftKnee, AngleKind::RightKnee],
    movement_threshold: Some(1.2),
    min_angle_range: Some(35.0),
    symmetry_tolerance: None,
    rules: &[
        FormRule {
            pair: JointPair::Knee,
            check: RuleCheck::FlexesBelow,
            limit: 140.0,
            message: "Squat deeper - bend knees more",
        },
        FormRule {
            pair: JointPair::Hip,
            check: RuleCheck::OpensBeyond,
            limit: 90.0,
            message: "Push hips back more",
        },
    ],
};

static CORE: CategoryPolicy = CategoryPolicy {
    primary_angles: &[AngleKind::LeftHip, AngleKind::RightHip],
    movement_threshold: Some(1.8),
    min_angle_range: Some(20.0),
    symmetry_tolerance: Some(15.0),
    rules: &[FormRule {
        pair: JointPair::Shoulder,
        check: RuleCheck::AlignedWith(JointPair::Hip),
        limit: 30.0,
        message: "Maintain neutral spine alignment",
    }],
};

static CARDIO: CategoryPolicy = CategoryPolicy {
    primary_angles: &[AngleKind::LeftShoulder, AngleKind::RightShoulder],
    movement_threshold: Some(2.5),
    min_angle_range: Some(15.0),
    symmetry_tolerance: None,
    rules: &[FormRule {
        pair: JointPair::Shoulder,
        check: RuleCheck::OpensBeyond,
        limit: 30.0,
        message: "Raise arms higher for full range of motion",
    }],
};

static GENERAL: CategoryPolicy = CategoryPolicy {
    primary_angles: &[AngleKind::LeftElbow, AngleKind::RightElbow],
    movement_threshold: None,
    min_angle_range: None,
    symmetry_tolerance: None,
    rules: &[],
};

/// Name keywords checked when a catalog record carries no category
const NAME_KEYWORDS: [(&str, ExerciseCategory); 14] = [
    ("curl", ExerciseCategory::UpperBody),
    ("press", ExerciseCategory::UpperBody),
    ("raise", ExerciseCategory::UpperBody),
    ("row", ExerciseCategory::UpperBody),
    ("pull", ExerciseCategory::UpperBody),
    ("squat", ExerciseCategory::LowerBody),
    ("lunge", ExerciseCategory::LowerBody),
    ("deadlift", ExerciseCategory::LowerBody),
    ("crunch", ExerciseCategory::Core),
    ("sit-up", ExerciseCategory::Core),
    ("plank", ExerciseCategory::Core),
    ("jack", ExerciseCategory::Cardio),
    ("burpee", ExerciseCategory::Cardio),
    ("jump", ExerciseCategory::Cardio),
];

impl ExerciseCategory {
    /// Best-effort category from an exercise name. Only used while loading a catalog.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        NAME_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|&(_, category)| category)
            .unwrap_or(ExerciseCategory::General)
    }

    pub fn policy(self) -> &'static CategoryPolicy {
        match self {
            ExerciseCategory::UpperBody => &UPPER_BODY,
            ExerciseCategory::LowerBody => &LOWER_BODY,
            ExerciseCategory::Core => &CORE,
            ExerciseCategory::Cardio => &CARDIO,
            ExerciseCategory::General => &GENERAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseCategory::UpperBody => "upper_body",
            ExerciseCategory::LowerBody => "lower_body",
            ExerciseCategory::Core => "core",
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::General => "general",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            ExerciseCategory::from_name("Dumbbell Seated Bicep Curl"),
            ExerciseCategory::UpperBody
        );
        assert_eq!(
            ExerciseCategory::from_name("barbell back squat"),
            ExerciseCategory::LowerBody
        );
        assert_eq!(ExerciseCategory::from_name("jumping jacks"), ExerciseCategory::Cardio);
        assert_eq!(ExerciseCategory::from_name("stretch"), ExerciseCategory::General);
    }

    #[test]
    fn test_every_policy_has_primary_angles() {
        for category in [
            ExerciseCategory::UpperBody,
            ExerciseCategory::LowerBody,
            ExerciseCategory::Core,
            ExerciseCategory::Cardio,
            ExerciseCategory::General,
        ] {
            assert!(!category.policy().primary_angles.is_empty());
        }
    }

    #[test]
    fn test_serde_names() {
        let category: ExerciseCategory = serde_json::from_str("\"lower_body\"").unwrap();
        assert_eq!(category, ExerciseCategory::LowerBody);
        assert_eq!(category.as_str(), "lower_body");
    }
}
