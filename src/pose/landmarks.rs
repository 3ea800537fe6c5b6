//! Landmark layout and semantic joint definitions
//!
//! Frames follow the MediaPipe Pose layout (33 points). Only the
//! shoulder/elbow/wrist/hip/knee/ankle points feed the angle set.

use serde::{Deserialize, Serialize};

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Number of semantic angles per frame
pub const ANGLE_COUNT: usize = 8;

fn full_visibility() -> f32 {
    1.0
}

/// A single landmark point (normalized image coordinates, relative depth)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Detector confidence that the point is visible (0-1)
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Coordinates as a vector; depth is dropped for planar measurement
    pub fn point(&self, use_depth: bool) -> [f32; 3] {
        [self.x, self.y, if use_depth { self.z } else { 0.0 }]
    }
}

/// Left/right joint pairs used for symmetry checks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointPair {
    Elbow,
    Shoulder,
    Hip,
    Knee,
}

impl JointPair {
    pub const ALL: [JointPair; 4] = [
        JointPair::Elbow,
        JointPair::Shoulder,
        JointPair::Hip,
        JointPair::Knee,
    ];

    pub fn left(self) -> AngleKind {
        match self {
            JointPair::Elbow => AngleKind::LeftElbow,
            JointPair::Shoulder => AngleKind::LeftShoulder,
            JointPair::Hip => AngleKind::LeftHip,
            JointPair::Knee => AngleKind::LeftKnee,
        }
    }

    pub fn right(self) -> AngleKind {
        match self {
            JointPair::Elbow => AngleKind::RightElbow,
            JointPair::Shoulder => AngleKind::RightShoulder,
            JointPair::Hip => AngleKind::RightHip,
            JointPair::Knee => AngleKind::RightKnee,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JointPair::Elbow => "elbow",
            JointPair::Shoulder => "shoulder",
            JointPair::Hip => "hip",
            JointPair::Knee => "knee",
        }
    }
}

/// Semantic joint angles, in feature-vector order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleKind {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

impl AngleKind {
    pub const ALL: [AngleKind; ANGLE_COUNT] = [
        AngleKind::LeftElbow,
        AngleKind::RightElbow,
        AngleKind::LeftShoulder,
        AngleKind::RightShoulder,
        AngleKind::LeftHip,
        AngleKind::RightHip,
        AngleKind::LeftKnee,
        AngleKind::RightKnee,
    ];

    /// Position in the angle vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Landmark triple (outer, vertex, outer); the angle is measured at the vertex
    pub fn triple(self) -> (usize, usize, usize) {
        match self {
            AngleKind::LeftElbow => (LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
            AngleKind::RightElbow => (RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
            AngleKind::LeftShoulder => (LEFT_HIP, LEFT_SHOULDER, LEFT_ELBOW),
            AngleKind::RightShoulder => (RIGHT_HIP, RIGHT_SHOULDER, RIGHT_ELBOW),
            AngleKind::LeftHip => (LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE),
            AngleKind::RightHip => (RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE),
            AngleKind::LeftKnee => (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
            AngleKind::RightKnee => (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
        }
    }

    pub fn pair(self) -> JointPair {
        match self {
            AngleKind::LeftElbow | AngleKind::RightElbow => JointPair::Elbow,
            AngleKind::LeftShoulder | AngleKind::RightShoulder => JointPair::Shoulder,
            AngleKind::LeftHip | AngleKind::RightHip => JointPair::Hip,
            AngleKind::LeftKnee | AngleKind::RightKnee => JointPair::Knee,
        }
    }

    /// Human-readable name used in feedback messages
    pub fn label(self) -> &'static str {
        match self {
            AngleKind::LeftElbow => "left elbow",
            AngleKind::RightElbow => "right elbow",
            AngleKind::LeftShoulder => "left shoulder",
            AngleKind::RightShoulder => "right shoulder",
            AngleKind::LeftHip => "left hip",
            AngleKind::RightHip => "right hip",
            AngleKind::LeftKnee => "left knee",
            AngleKind::RightKnee => "right knee",
        }
    }
}
