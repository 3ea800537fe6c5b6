//! Phase labels and the transition table
//!
//! A rep is the cycle start → quarter → peak → return → end → start.
//! `successors` is the single source of truth for which edges may commit.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PHASE_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseLabel {
    #[default]
    Start,
    Quarter,
    Peak,
    Return,
    End,
}

impl PhaseLabel {
    /// Canonical cycle order
    pub const ALL: [PhaseLabel; PHASE_COUNT] = [
        PhaseLabel::Start,
        PhaseLabel::Quarter,
        PhaseLabel::Peak,
        PhaseLabel::Return,
        PhaseLabel::End,
    ];

    /// Position in the scorer output
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Phases that may directly follow this one
    pub fn successors(self) -> &'static [PhaseLabel] {
        match self {
            PhaseLabel::Start => &[PhaseLabel::Quarter],
            PhaseLabel::Quarter => &[PhaseLabel::Peak, PhaseLabel::Start],
            PhaseLabel::Peak => &[PhaseLabel::Return],
            PhaseLabel::Return => &[PhaseLabel::End, PhaseLabel::Peak],
            PhaseLabel::End => &[PhaseLabel::Start],
        }
    }

    pub fn can_transition_to(self, next: PhaseLabel) -> bool {
        self.successors().contains(&next)
    }

    /// Next phase along the canonical cycle
    pub fn cycle_next(self) -> PhaseLabel {
        Self::ALL[(self.index() + 1) % PHASE_COUNT]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseLabel::Start => "start",
            PhaseLabel::Quarter => "quarter",
            PhaseLabel::Peak => "peak",
            PhaseLabel::Return => "return",
            PhaseLabel::End => "end",
        }
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
