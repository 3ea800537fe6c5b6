//! Per-frame pipeline
//!
//! landmarks → angles → buffer update → phase candidate → validated commit
//! → rep check → form feedback. A frame either completes or leaves the
//! state exactly as it was.

use super::events::{SessionEvent, SessionSummary};
use super::state::SessionState;
use crate::config::{CounterConfig, TrackingConfig};
use crate::error::FrameError;
use crate::exercise::{ExercisePattern, ExerciseTuning};
use crate::form::FormAnalyzer;
use crate::phase::{phase_confidence, PhaseClassifier, PhaseLabel, PhaseScorer};
use crate::pose::{AngleExtractor, AngleFrame, Landmark, PoseFrame};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Corrections listed in the summary
const SUMMARY_TOP_CORRECTIONS: usize = 5;

/// One exercise being tracked on one pose stream
pub struct Session {
    pattern: ExercisePattern,
    tuning: ExerciseTuning,
    extractor: AngleExtractor,
    classifier: PhaseClassifier,
    form: FormAnalyzer,
    tracking: TrackingConfig,
    state: SessionState,
}

impl Session {
    pub fn new(pattern: ExercisePattern, config: &CounterConfig, scorer: Box<dyn PhaseScorer>) -> Self {
        let tuning = ExerciseTuning::resolve(&pattern, config);
        Session {
            extractor: AngleExtractor::new(config.motion.use_depth),
            classifier: PhaseClassifier::new(config, &tuning, scorer),
            form: FormAnalyzer::new(&config.form, &pattern, &tuning),
            tracking: config.tracking.clone(),
            state: SessionState::new(config, &tuning),
            pattern,
            tuning,
        }
    }

    pub fn exercise(&self) -> &ExercisePattern {
        &self.pattern
    }

    pub fn tuning(&self) -> &ExerciseTuning {
        &self.tuning
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn rep_count(&self) -> u32 {
        self.state.counter.rep_count()
    }

    pub fn current_phase(&self) -> PhaseLabel {
        self.state.current_phase
    }

    pub fn phase_confidence(&self) -> f32 {
        self.state.phase_confidence
    }

    pub fn scorer_name(&self) -> &str {
        self.classifier.scorer_name()
    }

    pub fn process(&mut self, frame: &PoseFrame) -> Result<Vec<SessionEvent>, FrameError> {
        self.process_frame(frame.landmarks.as_deref(), frame.timestamp)
    }

    /// Process one frame; `None` means no pose was detected
    pub fn process_frame(
        &mut self,
        landmarks: Option<&[Landmark]>,
        timestamp: f64,
    ) -> Result<Vec<SessionEvent>, FrameError> {
        let started = Instant::now();

        let result = self
            .check_timestamp(timestamp)
            .and_then(|_| self.step(landmarks, timestamp));

        if let Err(err) = &result {
            self.state.stats.dropped += 1;
            warn!("Dropped frame at {:.3}s: {}", timestamp, err);
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms > self.tracking.frame_budget_ms {
            self.state.stats.slow += 1;
            warn!(
                "Frame at {:.3}s took {:.1}ms (budget {:.1}ms)",
                timestamp, elapsed_ms, self.tracking.frame_budget_ms
            );
        }

        result
    }

    fn check_timestamp(&self, timestamp: f64) -> Result<(), FrameError> {
        if !timestamp.is_finite() {
            return Err(FrameError::InvalidTimestamp(timestamp));
        }
        match self.state.last_timestamp {
            Some(last) if timestamp <= last => Err(FrameError::OutOfOrder { timestamp, last }),
            _ => Ok(()),
        }
    }

    fn step(&mut self, landmarks: Option<&[Landmark]>, timestamp: f64) -> Result<Vec<SessionEvent>, FrameError> {
        let frame = match landmarks {
            Some(landmarks) => Some(self.extractor.extract(landmarks, timestamp)?),
            None => None,
        };

        match frame {
            Some(frame) if frame.confidence >= self.tracking.min_landmark_confidence => {
                self.on_pose(frame)
            }
            _ => Ok(self.on_pose_lost(timestamp)),
        }
    }

    fn on_pose(&mut self, frame: AngleFrame) -> Result<Vec<SessionEvent>, FrameError> {
        let timestamp = frame.timestamp;
        let evicted = self.state.buffers.angles.push(frame);

        let scored = match self.classifier.motion(&self.state.buffers.angles) {
            Some(motion) => {
                let history = self.state.buffers.history_labels();
                match self.classifier.classify(
                    &self.state.buffers.angles,
                    &history,
                    self.state.current_phase,
                    &motion,
                ) {
                    Ok(candidate) => Some((motion, candidate)),
                    Err(err) => {
                        self.state.buffers.angles.undo_push(evicted);
                        return Err(err.into());
                    }
                }
            }
            None => None,
        };

        self.state.touch(timestamp);
        self.state.last_usable_timestamp = Some(timestamp);
        self.state.tracking_lost = false;

        let mut events = Vec::new();

        if let Some((motion, candidate)) = scored {
            self.state.buffers.candidates.push(candidate.guarded);
            self.state.counter.observe_range(motion.buffer_range);

            let mut transition = None;
            if let Some(next) = self
                .classifier
                .decide(self.state.current_phase, &self.state.buffers.candidates)
            {
                let (from, to) = self.state.commit(next);
                debug!(
                    "Phase {} -> {} at {:.3}s (pos {:.2}, vel {:.2})",
                    from, to, timestamp, motion.position, motion.velocity
                );
                events.push(SessionEvent::PhaseChanged { from, to, timestamp });
                transition = Some((from, to));
            }

            let current = self.state.current_phase;
            let history = self.state.buffers.history_labels();
            self.state.phase_confidence =
                phase_confidence(motion.range, candidate.distribution.prob(current), &history);

            if let Some(count) = self
                .state
                .counter
                .evaluate(timestamp, current, transition, history.len())
            {
                info!("Rep {} completed at {:.2}s", count, timestamp);
                events.push(SessionEvent::RepCompleted { count, timestamp });
            }
        }

        let feedback = self.form.analyze(&self.state.buffers.angles);
        self.state.form_history.record(feedback.score);
        self.state.corrections.record(&feedback.corrections);
        self.state.last_feedback = Some(feedback.clone());
        events.push(SessionEvent::FormFeedback(feedback));

        Ok(events)
    }

    fn on_pose_lost(&mut self, timestamp: f64) -> Vec<SessionEvent> {
        self.state.touch(timestamp);
        self.state.stats.gap += 1;
        self.state.phase_confidence *= self.tracking.gap_confidence_decay;

        let gap_secs = self.state.gap_secs(timestamp);
        if self.state.tracking_lost || gap_secs <= self.tracking.max_gap_secs {
            return Vec::new();
        }

        warn!(
            "No usable pose for {:.2}s, dropping motion state (phase was {})",
            gap_secs, self.state.current_phase
        );
        self.state.drop_tracking();
        vec![SessionEvent::TrackingLost {
            timestamp,
            gap_secs,
        }]
    }

    /// Close the stream: counts a final rep that reached `end` but was
    /// never followed by a new start.
    pub fn finish(&mut self) -> Option<SessionEvent> {
        let now = self.state.last_timestamp?;
        let count = self.state.counter.close_pending(
            now,
            self.state.current_phase,
            self.state.buffers.history.len(),
        )?;
        info!("Rep {} completed at {:.2}s (stream end)", count, now);
        Some(SessionEvent::RepCompleted {
            count,
            timestamp: now,
        })
    }

    /// Clear buffers, counters and history
    pub fn reset(&mut self) {
        self.state.reset();
        info!("Session for '{}' reset", self.pattern.id);
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            exercise_id: self.pattern.id.clone(),
            exercise_name: self.pattern.name.clone(),
            category: self.pattern.category,
            scorer: self.classifier.scorer_name().to_string(),
            rep_count: self.state.counter.rep_count(),
            current_phase: self.state.current_phase,
            phase_confidence: self.state.phase_confidence,
            transitions: self.state.transitions,
            form: self.state.form_history.stats(),
            persistent_corrections: self.state.corrections.persistent(),
            top_corrections: self.state.corrections.top(SUMMARY_TOP_CORRECTIONS),
            frames: self.state.stats,
            duration_secs: self.state.duration_secs(),
        }
    }
}
