//! Rep Coach - repetition counting and form feedback from pose landmarks
//!
//! # Components
//! - `pose`: landmark frames to eight semantic joint angles
//! - `exercise`: reference patterns, categories and per-exercise tuning
//! - `phase`: motion features, phase scorers, transition guard and consensus
//! - `session`: temporal buffers, rep counter and the per-frame pipeline
//! - `form`: symmetry, range-of-motion and category rule checks
//! - `coach`: session factory over a catalog and configuration

pub mod coach;
pub mod config;
pub mod error;
pub mod exercise;
pub mod form;
pub mod phase;
pub mod pose;
pub mod session;

pub use coach::Coach;
pub use config::CounterConfig;
pub use error::{CatalogError, ConfigError, FrameError, ModelError, ScorerError, SessionError};
pub use exercise::{ExerciseCatalog, ExercisePattern, JsonCatalog};
pub use phase::PhaseLabel;
pub use pose::{Landmark, PoseFrame};
pub use session::{Session, SessionEvent, SessionSummary};
