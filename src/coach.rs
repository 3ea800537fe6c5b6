//! Session factory
//!
//! Owns the exercise catalog, the validated configuration and the shared
//! sequence model (if any). Sessions never share mutable state; each one
//! gets its own scorer instance.

use crate::config::{CounterConfig, ScorerKind};
use crate::error::SessionError;
use crate::exercise::{ExerciseCatalog, ExercisePattern, ExerciseTuning};
use crate::phase::{PhaseScorer, RuleScorer, SequenceModel, SequenceScorer, TransitionGuard};
use crate::session::Session;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Coach<C: ExerciseCatalog> {
    catalog: C,
    config: CounterConfig,
    model: Option<Arc<SequenceModel>>,
}

impl<C: ExerciseCatalog> Coach<C> {
    /// Validate the configuration and load the sequence model when selected.
    /// A model that cannot be loaded falls back to the rule scorer.
    pub fn new(catalog: C, config: CounterConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let model = match (config.scorer.kind, &config.scorer.weights) {
            (ScorerKind::Rule, _) => None,
            (ScorerKind::Sequence, None) => {
                warn!("Sequence scorer selected without weights, using rule scorer");
                None
            }
            (ScorerKind::Sequence, Some(path)) => match SequenceModel::load(path) {
                Ok(model) => Some(Arc::new(model)),
                Err(err) => {
                    warn!(
                        "Could not load model from {}: {}. Using rule scorer",
                        path.display(),
                        err
                    );
                    None
                }
            },
        };

        Ok(Coach {
            catalog,
            config,
            model,
        })
    }

    /// Use an already loaded model for every new session
    pub fn with_model(mut self, model: Arc<SequenceModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn start_session(&self, exercise_id: &str) -> Result<Session, SessionError> {
        let pattern = self.resolve(exercise_id)?;
        let session = self.build(pattern);
        info!(
            "Session started for '{}' ({}, {} scorer)",
            session.exercise().name,
            session.exercise().category.as_str(),
            session.scorer_name()
        );
        Ok(session)
    }

    /// Retarget `session` to another exercise. The old state is discarded
    /// only when the new id resolves.
    pub fn switch_exercise(&self, session: &mut Session, exercise_id: &str) -> Result<(), SessionError> {
        let pattern = self.resolve(exercise_id)?;
        info!(
            "Switching exercise from '{}' to '{}'",
            session.exercise().id,
            pattern.id
        );
        *session = self.build(pattern);
        Ok(())
    }

    fn resolve(&self, exercise_id: &str) -> Result<ExercisePattern, SessionError> {
        self.catalog
            .lookup(exercise_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(exercise_id.to_string()))
    }

    fn build(&self, pattern: ExercisePattern) -> Session {
        let scorer: Box<dyn PhaseScorer> = match &self.model {
            Some(model) => Box::new(SequenceScorer::new(Arc::clone(model))),
            None => {
                let tuning = ExerciseTuning::resolve(&pattern, &self.config);
                Box::new(RuleScorer::new(TransitionGuard::new(
                    self.config.guard.clone(),
                    tuning.movement_threshold,
                )))
            }
        };
        Session::new(pattern, &self.config, scorer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;
    use crate::exercise::{ExerciseCategory, JsonCatalog};
    use crate::phase::{PhaseLabel, SequenceConfig};
    use crate::pose::{CurlProfile, SyntheticCurl};
    use crate::session::SessionEvent;
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};

    fn catalog() -> JsonCatalog {
        let mut catalog = JsonCatalog::new();
        catalog.insert(ExercisePattern::new(
            "xiA6lRr",
            "Dumbbell Bicep Curl",
            ExerciseCategory::UpperBody,
            [110.0, 110.0, 20.0, 20.0, 175.0, 175.0, 178.0, 178.0],
            [120.0, 120.0, 15.0, 15.0, 4.0, 4.0, 2.0, 2.0],
        ));
        catalog.insert(ExercisePattern::new(
            "sq00001",
            "Goblet Squat",
            ExerciseCategory::LowerBody,
            [60.0, 60.0, 30.0, 30.0, 120.0, 120.0, 115.0, 115.0],
            [5.0, 5.0, 10.0, 10.0, 80.0, 80.0, 95.0, 95.0],
        ));
        catalog
    }

    #[test]
    fn test_unknown_exercise_is_not_found() {
        let coach = Coach::new(catalog(), CounterConfig::default()).unwrap();
        match coach.start_session("zzz000") {
            Err(SessionError::NotFound(id)) => assert_eq!(id, "zzz000"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("session created for unknown exercise"),
        }
    }

    #[test]
    fn test_start_session() {
        let coach = Coach::new(catalog(), CounterConfig::default()).unwrap();
        let session = coach.start_session("xiA6lRr").unwrap();
        assert_eq!(session.rep_count(), 0);
        assert_eq!(session.current_phase(), PhaseLabel::Start);
        assert_eq!(session.summary().scorer, "rule");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = CounterConfig::default();
        config.buffers.angle_capacity = 0;
        assert!(matches!(
            Coach::new(catalog(), config),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_missing_weights_fall_back_to_rules() {
        let config = CounterConfig {
            scorer: ScorerConfig {
                kind: ScorerKind::Sequence,
                weights: Some("/nonexistent/phase_model.bin".into()),
            },
            ..CounterConfig::default()
        };
        let coach = Coach::new(catalog(), config).unwrap();
        let session = coach.start_session("xiA6lRr").unwrap();
        assert_eq!(session.summary().scorer, "rule");
    }

    #[test]
    fn test_switch_exercise_keeps_session_on_unknown_id() {
        let coach = Coach::new(catalog(), CounterConfig::default()).unwrap();
        let mut session = coach.start_session("xiA6lRr").unwrap();

        assert!(coach.switch_exercise(&mut session, "zzz000").is_err());
        assert_eq!(session.exercise().id, "xiA6lRr");

        coach.switch_exercise(&mut session, "sq00001").unwrap();
        assert_eq!(session.exercise().id, "sq00001");
        assert_eq!(session.tuning().min_angle_range, 35.0);
    }

    #[test]
    fn test_loaded_model_drives_sessions() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = SequenceModel::new(SequenceConfig::default(), vb).unwrap();
        let coach = Coach::new(catalog(), CounterConfig::default())
            .unwrap()
            .with_model(Arc::new(model));

        let mut session = coach.start_session("xiA6lRr").unwrap();
        assert_eq!(session.scorer_name(), "sequence");

        let mut edges = Vec::new();
        for frame in SyntheticCurl::new(CurlProfile::default(), 3) {
            for event in session.process(&frame).unwrap() {
                if let SessionEvent::PhaseChanged { from, to, .. } = event {
                    edges.push((from, to));
                }
            }
        }

        // untrained weights still only move along legal edges
        assert!(edges.iter().all(|&(from, to)| from.can_transition_to(to)));
        assert_eq!(session.state().stats.dropped, 0);
        assert_eq!(session.summary().scorer, "sequence");
    }
}
