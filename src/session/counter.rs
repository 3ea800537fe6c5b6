//! Repetition counter
//!
//! A rep counts only when every condition holds on the same frame:
//! the trigger fires, the cooldown since the last rep has passed, the
//! cycle covered enough angle range, and enough committed transitions
//! and history have built up since the last rep.

use crate::config::{RepConfig, RepTrigger};
use crate::exercise::ExerciseTuning;
use crate::phase::PhaseLabel;

#[derive(Clone, Debug)]
pub struct RepCounter {
    trigger: RepTrigger,
    cooldown_secs: f64,
    min_angle_range: f32,
    min_transitions: u32,
    min_history: usize,

    rep_count: u32,
    transition_count: u32,
    last_rep_timestamp: Option<f64>,
    /// Largest buffer range seen since the last rep
    cycle_range: f32,
}

impl RepCounter {
    pub fn new(config: &RepConfig, tuning: &ExerciseTuning) -> Self {
        RepCounter {
            trigger: config.trigger,
            cooldown_secs: tuning.cooldown_secs,
            min_angle_range: tuning.min_angle_range,
            min_transitions: config.min_transitions,
            min_history: config.min_history,
            rep_count: 0,
            transition_count: 0,
            last_rep_timestamp: None,
            cycle_range: 0.0,
        }
    }

    pub fn on_transition(&mut self) {
        self.transition_count += 1;
    }

    pub fn observe_range(&mut self, range: f32) {
        self.cycle_range = self.cycle_range.max(range);
    }

    /// Check the completion predicate for this frame.
    /// `transition` is the edge committed on this frame, if any.
    pub fn evaluate(
        &mut self,
        now: f64,
        current: PhaseLabel,
        transition: Option<(PhaseLabel, PhaseLabel)>,
        history_len: usize,
    ) -> Option<u32> {
        let triggered = match self.trigger {
            RepTrigger::CycleClosed => transition == Some((PhaseLabel::End, PhaseLabel::Start)),
            RepTrigger::EndCommitted => current == PhaseLabel::End,
        };
        if !triggered {
            return None;
        }
        self.complete_if_valid(now, history_len)
    }

    /// Count a cycle that reached `end` but was never closed by a new start.
    /// Used when the stream ends while the lifter rests.
    pub fn close_pending(&mut self, now: f64, current: PhaseLabel, history_len: usize) -> Option<u32> {
        if current != PhaseLabel::End {
            return None;
        }
        self.complete_if_valid(now, history_len)
    }

    fn complete_if_valid(&mut self, now: f64, history_len: usize) -> Option<u32> {
        let cooled = self
            .last_rep_timestamp
            .map_or(true, |last| now - last > self.cooldown_secs);

        if cooled
            && self.cycle_range >= self.min_angle_range
            && self.transition_count >= self.min_transitions
            && history_len >= self.min_history
        {
            self.rep_count += 1;
            self.transition_count = 0;
            self.last_rep_timestamp = Some(now);
            self.cycle_range = 0.0;
            Some(self.rep_count)
        } else {
            None
        }
    }

    /// Drop progress toward the current rep; the count is kept
    pub fn abandon_cycle(&mut self) {
        self.transition_count = 0;
        self.cycle_range = 0.0;
    }

    pub fn reset(&mut self) {
        self.rep_count = 0;
        self.transition_count = 0;
        self.last_rep_timestamp = None;
        self.cycle_range = 0.0;
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn transition_count(&self) -> u32 {
        self.transition_count
    }

    pub fn last_rep_timestamp(&self) -> Option<f64> {
        self.last_rep_timestamp
    }

    pub fn cycle_range(&self) -> f32 {
        self.cycle_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CounterConfig;
    use crate::exercise::{ExerciseCategory, ExercisePattern};
    use PhaseLabel::*;

    fn counter(trigger: RepTrigger) -> RepCounter {
        let mut config = CounterConfig::default();
        config.rep.trigger = trigger;
        let pattern = ExercisePattern::new("g", "generic", ExerciseCategory::General, [0.0; 8], [0.0; 8]);
        RepCounter::new(&config.rep, &ExerciseTuning::resolve(&pattern, &config))
    }

    /// Feed committed phases one frame at a time, returning the count after each frame
    fn run(counter: &mut RepCounter, phases: &[(f64, PhaseLabel)], range: f32) -> Vec<u32> {
        let mut previous = Start;
        let mut history = 0;
        let mut counts = Vec::new();
        for &(t, phase) in phases {
            counter.observe_range(range);
            let transition = if phase != previous {
                counter.on_transition();
                history += 1;
                Some((previous, phase))
            } else {
                None
            };
            counter.evaluate(t, phase, transition, history);
            counts.push(counter.rep_count());
            previous = phase;
        }
        counts
    }

    #[test]
    fn test_cycle_closed_counts_on_start_commit() {
        let mut counter = counter(RepTrigger::CycleClosed);
        let phases = [
            (0.0, Start),
            (0.2, Quarter),
            (0.4, Peak),
            (0.6, Return),
            (0.8, End),
            (0.9, End),
            (1.0, End),
            (1.2, Start),
        ];
        let counts = run(&mut counter, &phases, 35.0);
        assert_eq!(counts, vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(counter.transition_count(), 0);
        assert_eq!(counter.last_rep_timestamp(), Some(1.2));
    }

    #[test]
    fn test_cycle_closed_respects_cooldown() {
        let mut counter = counter(RepTrigger::CycleClosed);
        let phases = [
            (0.0, Start),
            (0.1, Quarter),
            (0.2, Peak),
            (0.3, Return),
            (0.4, End),
            // first rep: no earlier rep to cool down from
            (0.5, Start),
            (0.6, Quarter),
            (0.7, Peak),
            (0.8, Return),
            (0.9, End),
            // 0.5s after the first rep
            (1.0, Start),
            (1.2, Quarter),
            (1.3, Peak),
            (1.4, Return),
            (1.5, End),
            (1.6, Start),
        ];
        let counts = run(&mut counter, &phases, 35.0);
        assert_eq!(counts[5], 1);
        assert_eq!(counts[10], 1);
        assert_eq!(counts[15], 2);
        assert_eq!(counter.last_rep_timestamp(), Some(1.6));
    }

    #[test]
    fn test_small_range_is_not_a_rep() {
        let mut counter = counter(RepTrigger::CycleClosed);
        let phases = [
            (0.0, Start),
            (0.5, Quarter),
            (1.0, Peak),
            (1.5, Return),
            (2.0, End),
            (2.5, Start),
        ];
        assert_eq!(run(&mut counter, &phases, 25.0).last(), Some(&0));
    }

    #[test]
    fn test_end_committed_counts_once_while_end_persists() {
        let mut counter = counter(RepTrigger::EndCommitted);
        let phases = [
            (0.0, Start),
            (0.5, Quarter),
            (1.0, Peak),
            (1.5, Return),
            (2.0, End),
            (2.1, End),
            (2.5, End),
            (3.5, End),
            (5.0, End),
        ];
        let counts = run(&mut counter, &phases, 40.0);
        assert_eq!(counts, vec![0, 0, 0, 0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_abandoned_cycle_needs_new_transitions() {
        let mut counter = counter(RepTrigger::EndCommitted);
        counter.observe_range(50.0);
        for _ in 0..4 {
            counter.on_transition();
        }
        counter.abandon_cycle();
        assert_eq!(counter.evaluate(3.0, End, None, 6), None);
        assert_eq!(counter.cycle_range(), 0.0);
    }

    #[test]
    fn test_close_pending() {
        let mut counter = counter(RepTrigger::CycleClosed);
        let phases = [
            (0.0, Start),
            (0.5, Quarter),
            (1.0, Peak),
            (1.5, Return),
            (2.0, End),
            (2.5, End),
        ];
        assert_eq!(run(&mut counter, &phases, 40.0).last(), Some(&0));
        assert_eq!(counter.close_pending(2.5, Quarter, 4), None);
        assert_eq!(counter.close_pending(2.5, End, 4), Some(1));
        // nothing left to close
        assert_eq!(counter.close_pending(4.0, End, 4), None);
    }
}
