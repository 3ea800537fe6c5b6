//! CLI Interface: frame sources and terminal rendering
//!
//! # Components
//! - `input.rs`: JSON-lines pose frame reader
//! - `display.rs`: event and summary rendering (coloured or JSON lines)

pub mod display;
pub mod input;

pub use display::Display;
pub use input::{skip_unreadable, FrameReader};
