//! Synthetic curl stream
//!
//! Generates MediaPipe-layout frames of a standing lifter doing elbow curls,
//! for the CLI demo and for pipeline tests. The elbow angle follows a
//! raised-cosine profile from `rest_angle` down to `peak_angle` and back,
//! then holds at rest. Seeded jitter keeps runs reproducible.

use super::frame::PoseFrame;
use super::landmarks::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const UPPER_ARM: f32 = 0.15;
const FOREARM: f32 = 0.14;

/// Shape of the generated movement
#[derive(Clone, Debug)]
pub struct CurlProfile {
    pub reps: usize,
    pub fps: f64,
    /// Elbow angle with the arm extended (degrees)
    pub rest_angle: f32,
    /// Elbow angle at full contraction (degrees)
    pub peak_angle: f32,
    /// Duration of the moving part of one rep
    pub rep_secs: f64,
    /// Pause at rest after each rep
    pub rest_secs: f64,
    /// Still time before the first rep
    pub lead_in_secs: f64,
    /// Uniform noise added to each elbow angle (± degrees)
    pub jitter_deg: f32,
    /// Constant offset of the right elbow relative to the left
    pub asymmetry_deg: f32,
    /// Time spans with no detected pose, as (start, duration)
    pub gaps: Vec<(f64, f64)>,
}

impl Default for CurlProfile {
    fn default() -> Self {
        CurlProfile {
            reps: 3,
            fps: 30.0,
            rest_angle: 165.0,
            peak_angle: 40.0,
            rep_secs: 2.0,
            rest_secs: 1.0,
            lead_in_secs: 1.0,
            jitter_deg: 1.0,
            asymmetry_deg: 0.0,
            gaps: Vec::new(),
        }
    }
}

impl CurlProfile {
    /// Total stream length in seconds (with one trailing rest)
    pub fn duration_secs(&self) -> f64 {
        self.lead_in_secs + self.reps as f64 * (self.rep_secs + self.rest_secs)
    }

    /// Noise-free elbow angle at time `t`
    pub fn elbow_angle_at(&self, t: f64) -> f32 {
        let cycle = self.rep_secs + self.rest_secs;
        let moving = t - self.lead_in_secs;
        if moving < 0.0 || cycle <= 0.0 || moving >= cycle * self.reps as f64 {
            return self.rest_angle;
        }
        let within = moving % cycle;
        if within >= self.rep_secs {
            return self.rest_angle;
        }
        let u = within / self.rep_secs;
        let depth = ((1.0 - (2.0 * PI * u).cos()) / 2.0) as f32;
        self.rest_angle - (self.rest_angle - self.peak_angle) * depth
    }

    fn in_gap(&self, t: f64) -> bool {
        self.gaps
            .iter()
            .any(|&(start, duration)| t >= start && t < start + duration)
    }
}

/// Iterator over generated frames
pub struct SyntheticCurl {
    profile: CurlProfile,
    rng: StdRng,
    frame_index: usize,
    total_frames: usize,
}

impl SyntheticCurl {
    pub fn new(profile: CurlProfile, seed: u64) -> Self {
        let total_frames = (profile.duration_secs() * profile.fps).round() as usize;
        SyntheticCurl {
            profile,
            rng: StdRng::seed_from_u64(seed),
            frame_index: 0,
            total_frames,
        }
    }

    fn noise(&mut self) -> f32 {
        let j = self.profile.jitter_deg;
        if j > 0.0 {
            self.rng.gen_range(-j..=j)
        } else {
            0.0
        }
    }
}

impl Iterator for SyntheticCurl {
    type Item = PoseFrame;

    fn next(&mut self) -> Option<PoseFrame> {
        if self.frame_index >= self.total_frames {
            return None;
        }
        let t = self.frame_index as f64 / self.profile.fps;
        self.frame_index += 1;

        if self.profile.in_gap(t) {
            return Some(PoseFrame::lost(t));
        }

        let base = self.profile.elbow_angle_at(t);
        let left = base + self.noise();
        let right = base + self.profile.asymmetry_deg + self.noise();
        Some(PoseFrame::detected(t, standing_pose(left, right)))
    }
}

/// Standing figure with arms hanging and the given elbow angles.
/// Forearms swing forward: left to -x, right to +x.
pub fn standing_pose(left_elbow: f32, right_elbow: f32) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); LANDMARK_COUNT];

    for (side, shoulder_x, elbow_angle, idx) in [
        (-1.0_f32, 0.42_f32, left_elbow, [LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE]),
        (1.0, 0.58, right_elbow, [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE]),
    ] {
        let [shoulder, elbow, wrist, hip, knee, ankle] = idx;
        let theta = elbow_angle.clamp(0.0, 180.0).to_radians();
        let elbow_y = 0.30 + UPPER_ARM;

        landmarks[shoulder] = Landmark::new(shoulder_x, 0.30, 0.0, 1.0);
        landmarks[elbow] = Landmark::new(shoulder_x, elbow_y, 0.0, 1.0);
        landmarks[wrist] = Landmark::new(
            shoulder_x + side * FOREARM * theta.sin(),
            elbow_y - FOREARM * theta.cos(),
            0.0,
            1.0,
        );
        landmarks[hip] = Landmark::new(shoulder_x, 0.55, 0.0, 1.0);
        landmarks[knee] = Landmark::new(shoulder_x, 0.75, 0.0, 1.0);
        landmarks[ankle] = Landmark::new(shoulder_x, 0.95, 0.0, 1.0);
    }

    landmarks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::AngleExtractor;

    #[test]
    fn test_pose_reproduces_elbow_angles() {
        let extractor = AngleExtractor::new(false);
        let frame = extractor.extract(&standing_pose(150.0, 120.0), 0.0).unwrap();
        assert!((frame.get(AngleKind::LeftElbow) - 150.0).abs() < 0.1);
        assert!((frame.get(AngleKind::RightElbow) - 120.0).abs() < 0.1);
        assert!((frame.get(AngleKind::LeftKnee) - 180.0).abs() < 0.1);
    }

    #[test]
    fn test_profile_shape() {
        let profile = CurlProfile::default();
        assert_eq!(profile.elbow_angle_at(0.0), 165.0);
        // halfway through the first rep is full contraction
        let mid = profile.lead_in_secs + profile.rep_secs / 2.0;
        assert!((profile.elbow_angle_at(mid) - 40.0).abs() < 0.01);
        // resting after the rep
        let rest = profile.lead_in_secs + profile.rep_secs + 0.5;
        assert_eq!(profile.elbow_angle_at(rest), 165.0);
    }

    #[test]
    fn test_stream_length_and_gaps() {
        let profile = CurlProfile {
            reps: 1,
            gaps: vec![(0.5, 0.25)],
            ..CurlProfile::default()
        };
        let frames: Vec<PoseFrame> = SyntheticCurl::new(profile, 7).collect();
        assert_eq!(frames.len(), 120);
        let lost = frames.iter().filter(|f| f.landmarks.is_none()).count();
        assert_eq!(lost, 8);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a: Vec<PoseFrame> = SyntheticCurl::new(CurlProfile::default(), 3).take(20).collect();
        let b: Vec<PoseFrame> = SyntheticCurl::new(CurlProfile::default(), 3).take(20).collect();
        assert_eq!(a, b);
    }
}
