//! Session Management: per-stream state, rep counting and the frame pipeline
//!
//! # Components
//! - `buffer.rs`: fixed-capacity ring buffers for angles, candidates and history
//! - `counter.rs`: rep completion predicate
//! - `state.rs`: SessionState owned by one session
//! - `events.rs`: emitted events and the session summary
//! - `pipeline.rs`: Session, the per-frame pipeline

pub mod buffer;
pub mod counter;
pub mod events;
pub mod pipeline;
pub mod state;

pub use buffer::{RingBuffer, TemporalBuffers};
pub use counter::RepCounter;
pub use events::{SessionEvent, SessionSummary};
pub use pipeline::Session;
pub use state::{FrameStats, SessionState};
