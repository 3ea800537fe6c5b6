//! Pose module: landmark frames to semantic joint angles
//!
//! # Components
//! - `landmarks.rs`: MediaPipe layout, joint triples and left/right pairs
//! - `angles.rs`: angle measurement with degenerate-geometry fallback
//! - `frame.rs`: timestamped extractor output
//! - `synthetic.rs`: seeded curl stream for demos and tests

pub mod angles;
pub mod frame;
pub mod landmarks;
pub mod synthetic;

pub use angles::{joint_angle, measure, AngleExtractor, AngleFrame, AngleReading, FALLBACK_ANGLE};
pub use frame::PoseFrame;
pub use landmarks::{AngleKind, JointPair, Landmark, ANGLE_COUNT, LANDMARK_COUNT};
pub use synthetic::{standing_pose, CurlProfile, SyntheticCurl};
