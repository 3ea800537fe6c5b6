//! Events emitted per frame and the end-of-session summary

use super::state::FrameStats;
use crate::exercise::ExerciseCategory;
use crate::form::{FormFeedback, FormStats};
use crate::phase::PhaseLabel;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    PhaseChanged {
        from: PhaseLabel,
        to: PhaseLabel,
        timestamp: f64,
    },
    RepCompleted {
        count: u32,
        timestamp: f64,
    },
    FormFeedback(FormFeedback),
    /// No usable pose for longer than the allowed gap; motion state was dropped
    TrackingLost {
        timestamp: f64,
        gap_secs: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub exercise_id: String,
    pub exercise_name: String,
    pub category: ExerciseCategory,
    pub scorer: String,
    pub rep_count: u32,
    pub current_phase: PhaseLabel,
    pub phase_confidence: f32,
    pub transitions: u32,
    pub form: FormStats,
    /// Corrections seen at least three times
    pub persistent_corrections: Vec<String>,
    pub top_corrections: Vec<(String, u32)>,
    pub frames: FrameStats,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Correction, CorrectionKind, FormGrade};

    #[test]
    fn test_event_json_is_tagged() {
        let event = SessionEvent::RepCompleted {
            count: 2,
            timestamp: 4.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "rep_completed");
        assert_eq!(json["count"], 2);

        let feedback = SessionEvent::FormFeedback(FormFeedback {
            score: 0.5,
            grade: FormGrade::NeedsWork,
            corrections: vec![Correction {
                kind: CorrectionKind::Rule {
                    message: "Push hips back more",
                },
                message: "Push hips back more".to_string(),
            }],
        });
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["event"], "form_feedback");
        assert_eq!(json["grade"], "needs_work");
        assert_eq!(json["corrections"][0]["kind"]["check"], "rule");
        assert_eq!(json["corrections"][0]["message"], "Push hips back more");
    }
}
