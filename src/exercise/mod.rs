//! Exercise module: reference patterns and per-category policy
//!
//! # Components
//! - `category.rs`: category enum and the static policy table
//! - `pattern.rs`: validated per-exercise reference pattern
//! - `catalog.rs`: lookup trait and the JSON-backed catalog
//! - `tuning.rs`: effective thresholds for a session

pub mod catalog;
pub mod category;
pub mod pattern;
pub mod tuning;

pub use catalog::{ExerciseCatalog, JsonCatalog};
pub use category::{CategoryPolicy, ExerciseCategory, FormRule, PeakDirection, RuleCheck};
pub use pattern::{ExercisePattern, PatternRecord};
pub use tuning::ExerciseTuning;
