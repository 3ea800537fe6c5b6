//! Per-exercise reference pattern
//!
//! Handles:
//! - Raw catalog records (loose JSON shape, vectors of any length)
//! - Validated immutable patterns with fixed 8-angle vectors
//! - Primary angle resolution: explicit list, else the two widest expected
//!   ranges, else the category default

use super::category::{ExerciseCategory, PeakDirection};
use crate::error::CatalogError;
use crate::pose::{AngleKind, ANGLE_COUNT};
use serde::{Deserialize, Serialize};

/// Catalog record as stored on disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<ExerciseCategory>,
    pub mean: Vec<f32>,
    pub range: Vec<f32>,
    #[serde(default)]
    pub sample_frames: usize,
    #[serde(default)]
    pub primary_angles: Vec<AngleKind>,
    #[serde(default)]
    pub peak_direction: Option<PeakDirection>,
    #[serde(default)]
    pub min_angle_range: Option<f32>,
    #[serde(default)]
    pub cooldown_secs: Option<f64>,
}

/// Immutable reference for one exercise
#[derive(Clone, Debug, PartialEq)]
pub struct ExercisePattern {
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    /// Mean angle per dimension over the reference recordings
    pub mean: [f32; ANGLE_COUNT],
    /// Expected excursion per dimension (degrees)
    pub range: [f32; ANGLE_COUNT],
    pub sample_frames: usize,
    pub primary_angles: Vec<AngleKind>,
    pub peak_direction: PeakDirection,
    pub min_angle_range: Option<f32>,
    pub cooldown_secs: Option<f64>,
}

impl ExercisePattern {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ExerciseCategory,
        mean: [f32; ANGLE_COUNT],
        range: [f32; ANGLE_COUNT],
    ) -> Self {
        let primary_angles = resolve_primary(&[], &range, category);
        ExercisePattern {
            id: id.into(),
            name: name.into(),
            category,
            mean,
            range,
            sample_frames: 0,
            primary_angles,
            peak_direction: PeakDirection::default(),
            min_angle_range: None,
            cooldown_secs: None,
        }
    }

    pub fn expected_range(&self, kind: AngleKind) -> f32 {
        self.range[kind.index()]
    }
}

impl TryFrom<PatternRecord> for ExercisePattern {
    type Error = CatalogError;

    fn try_from(record: PatternRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: String| CatalogError::InvalidPattern {
            id: record.id.clone(),
            reason,
        };

        let mean = fixed_vector(&record.mean).ok_or_else(|| {
            invalid(format!("mean has {} values, expected {}", record.mean.len(), ANGLE_COUNT))
        })?;
        let range = fixed_vector(&record.range).ok_or_else(|| {
            invalid(format!("range has {} values, expected {}", record.range.len(), ANGLE_COUNT))
        })?;
        if range.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(invalid("range values must be finite and non-negative".to_string()));
        }
        if let Some(cooldown) = record.cooldown_secs {
            if !(cooldown > 0.0) {
                return Err(invalid("cooldown_secs must be positive".to_string()));
            }
        }

        let category = record
            .category
            .unwrap_or_else(|| ExerciseCategory::from_name(&record.name));
        let primary_angles = resolve_primary(&record.primary_angles, &range, category);

        Ok(ExercisePattern {
            id: record.id,
            name: record.name,
            category,
            mean,
            range,
            sample_frames: record.sample_frames,
            primary_angles,
            peak_direction: record.peak_direction.unwrap_or_default(),
            min_angle_range: record.min_angle_range,
            cooldown_secs: record.cooldown_secs,
        })
    }
}

fn fixed_vector(values: &[f32]) -> Option<[f32; ANGLE_COUNT]> {
    values.try_into().ok()
}

fn resolve_primary(
    explicit: &[AngleKind],
    range: &[f32; ANGLE_COUNT],
    category: ExerciseCategory,
) -> Vec<AngleKind> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    if range.iter().any(|&r| r > 0.0) {
        let mut ranked = AngleKind::ALL.to_vec();
        // stable sort keeps feature order on ties
        ranked.sort_by(|a, b| range[b.index()].total_cmp(&range[a.index()]));
        ranked.truncate(2);
        return ranked;
    }

    category.policy().primary_angles.to_vec()
}
