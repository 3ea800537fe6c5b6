//! Effective thresholds for one session
//!
//! Resolution order for each value: pattern override, then category policy,
//! then the configured default. Resolved once when a session starts.

use super::category::{FormRule, PeakDirection};
use super::pattern::ExercisePattern;
use crate::config::CounterConfig;
use crate::pose::AngleKind;

#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseTuning {
    pub primary_angles: Vec<AngleKind>,
    pub peak_direction: PeakDirection,
    pub movement_threshold: f32,
    pub min_angle_range: f32,
    pub cooldown_secs: f64,
    pub symmetry_tolerance: f32,
    pub rules: &'static [FormRule],
}

impl ExerciseTuning {
    pub fn resolve(pattern: &ExercisePattern, config: &CounterConfig) -> Self {
        let policy = pattern.category.policy();

        ExerciseTuning {
            primary_angles: pattern.primary_angles.clone(),
            peak_direction: pattern.peak_direction,
            movement_threshold: policy
                .movement_threshold
                .unwrap_or(config.motion.movement_threshold),
            min_angle_range: pattern
                .min_angle_range
                .or(policy.min_angle_range)
                .unwrap_or(config.rep.min_angle_range),
            cooldown_secs: pattern.cooldown_secs.unwrap_or(config.rep.cooldown_secs),
            symmetry_tolerance: policy
                .symmetry_tolerance
                .unwrap_or(config.form.symmetry_tolerance),
            rules: policy.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseCategory;

    #[test]
    fn test_resolution_order() {
        let config = CounterConfig::default();
        let mut pattern = ExercisePattern::new(
            "c1",
            "plank hold",
            ExerciseCategory::Core,
            [90.0; 8],
            [0.0; 8],
        );
        let tuning = ExerciseTuning::resolve(&pattern, &config);
        assert_eq!(tuning.symmetry_tolerance, 15.0);
        assert_eq!(tuning.min_angle_range, 20.0);
        assert_eq!(tuning.cooldown_secs, 1.0);

        pattern.min_angle_range = Some(12.0);
        pattern.cooldown_secs = Some(2.5);
        let tuning = ExerciseTuning::resolve(&pattern, &config);
        assert_eq!(tuning.min_angle_range, 12.0);
        assert_eq!(tuning.cooldown_secs, 2.5);
    }

    #[test]
    fn test_general_uses_config() {
        let mut config = CounterConfig::default();
        config.rep.min_angle_range = 42.0;
        let pattern = ExercisePattern::new("g1", "stretch", ExerciseCategory::General, [0.0; 8], [0.0; 8]);
        let tuning = ExerciseTuning::resolve(&pattern, &config);
        assert_eq!(tuning.min_angle_range, 42.0);
        assert_eq!(tuning.movement_threshold, config.motion.movement_threshold);
        assert!(tuning.rules.is_empty());
    }
}
