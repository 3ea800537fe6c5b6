//! Correction tally: which feedback keeps coming back
//!
//! A correction counts as one occurrence each time it appears after a frame
//! without it, so a problem held over many frames is one occurrence. Keys are
//! correction kinds, so a measurement that drifts from frame to frame inside
//! the message does not split one problem into several.

use super::analyzer::{Correction, CorrectionKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Occurrences before a correction is flagged as persistent
const PERSISTENT_THRESHOLD: u32 = 3;

#[derive(Clone, Debug, Default)]
pub struct CorrectionTally {
    counts: FxHashMap<CorrectionKind, u32>,
    active: FxHashSet<CorrectionKind>,
    total: u32,
}

impl CorrectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the corrections of one frame
    pub fn record(&mut self, corrections: &[Correction]) {
        let current: FxHashSet<CorrectionKind> = corrections.iter().map(|c| c.kind).collect();
        for kind in &current {
            if !self.active.contains(kind) {
                *self.counts.entry(*kind).or_insert(0) += 1;
                self.total += 1;
            }
        }
        self.active = current;
    }

    pub fn count(&self, kind: CorrectionKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Most frequent corrections by label, ties broken alphabetically
    pub fn top(&self, n: usize) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .counts
            .iter()
            .map(|(kind, &count)| (kind.label(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Corrections seen at least three times, most frequent first
    pub fn persistent(&self) -> Vec<String> {
        self.top(self.counts.len())
            .into_iter()
            .filter(|(_, count)| *count >= PERSISTENT_THRESHOLD)
            .map(|(message, _)| message)
            .collect()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.active.clear();
        self.total = 0;
    }
}
