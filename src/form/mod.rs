//! Form module: symmetry, range of motion and category rules
//!
//! # Components
//! - `analyzer.rs`: per-frame feedback (score, grade, corrections)
//! - `history.rs`: form score mean/EMA/trend
//! - `tally.rs`: recurring corrections

pub mod analyzer;
pub mod history;
pub mod tally;

pub use analyzer::{Correction, CorrectionKind, FormAnalyzer, FormFeedback, FormGrade};
pub use history::{FormHistory, FormStats};
pub use tally::CorrectionTally;
