//! Joint angle measurement
//!
//! Uses the dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
//! with v1 = a - b and v2 = c - b, so the angle is measured at `b`.
//! Bad geometry never fails the frame: it reads as a fixed fallback angle
//! with reduced confidence.

use super::landmarks::{AngleKind, Landmark, ANGLE_COUNT, LANDMARK_COUNT};
use crate::error::FrameError;

/// Angle reported for degenerate geometry
pub const FALLBACK_ANGLE: f32 = 90.0;

/// Confidence multiplier applied to degenerate readings
pub const DEGENERATE_CONFIDENCE: f32 = 0.25;

/// Segments shorter than this are treated as zero-length
const MIN_SEGMENT: f32 = 1e-6;

/// One angle measurement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleReading {
    pub degrees: f32,
    pub degenerate: bool,
}

/// Measure the angle at `b` formed by `a` and `c`, clamped to [0, 180]
pub fn measure(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> AngleReading {
    let v1 = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    let v2 = [c[0] - b[0], c[1] - b[1], c[2] - b[2]];

    let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
    let mag1 = (v1[0] * v1[0] + v1[1] * v1[1] + v1[2] * v1[2]).sqrt();
    let mag2 = (v2[0] * v2[0] + v2[1] * v2[1] + v2[2] * v2[2]).sqrt();

    // NaN fails every comparison, so non-finite input lands here too
    if !(mag1 >= MIN_SEGMENT && mag2 >= MIN_SEGMENT) || !dot.is_finite() {
        return AngleReading {
            degrees: FALLBACK_ANGLE,
            degenerate: true,
        };
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees().clamp(0.0, 180.0);

    if degrees.is_finite() {
        AngleReading {
            degrees,
            degenerate: false,
        }
    } else {
        AngleReading {
            degrees: FALLBACK_ANGLE,
            degenerate: true,
        }
    }
}

/// Angle in degrees at `b`; degenerate input yields exactly `FALLBACK_ANGLE`
pub fn joint_angle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
    measure(a, b, c).degrees
}

/// The 8 semantic angles of one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleFrame {
    /// Capture time in seconds
    pub timestamp: f64,
    /// Degrees, indexed by `AngleKind::index`
    pub angles: [f32; ANGLE_COUNT],
    /// Mean per-angle landmark confidence (0-1)
    pub confidence: f32,
}

impl AngleFrame {
    pub fn new(timestamp: f64, angles: [f32; ANGLE_COUNT], confidence: f32) -> Self {
        Self {
            timestamp,
            angles,
            confidence,
        }
    }

    pub fn get(&self, kind: AngleKind) -> f32 {
        self.angles[kind.index()]
    }

    /// Mean of the given angles (all angles when `kinds` is empty)
    pub fn mean_of(&self, kinds: &[AngleKind]) -> f32 {
        if kinds.is_empty() {
            return self.angles.iter().sum::<f32>() / ANGLE_COUNT as f32;
        }
        kinds.iter().map(|&k| self.get(k)).sum::<f32>() / kinds.len() as f32
    }
}

/// Turns raw landmarks into an `AngleFrame`
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleExtractor {
    use_depth: bool,
}

impl AngleExtractor {
    pub fn new(use_depth: bool) -> Self {
        Self { use_depth }
    }

    pub fn extract(&self, landmarks: &[Landmark], timestamp: f64) -> Result<AngleFrame, FrameError> {
        if landmarks.len() < LANDMARK_COUNT {
            return Err(FrameError::MissingLandmarks {
                expected: LANDMARK_COUNT,
                got: landmarks.len(),
            });
        }

        let mut angles = [FALLBACK_ANGLE; ANGLE_COUNT];
        let mut confidence_sum = 0.0;

        for kind in AngleKind::ALL {
            let (ia, ib, ic) = kind.triple();
            let (a, b, c) = (&landmarks[ia], &landmarks[ib], &landmarks[ic]);
            let reading = measure(
                a.point(self.use_depth),
                b.point(self.use_depth),
                c.point(self.use_depth),
            );

            let visibility = a.visibility.min(b.visibility).min(c.visibility);
            let visibility = if visibility.is_finite() {
                visibility.clamp(0.0, 1.0)
            } else {
                0.0
            };

            angles[kind.index()] = reading.degrees;
            confidence_sum += if reading.degenerate {
                visibility * DEGENERATE_CONFIDENCE
            } else {
                visibility
            };
        }

        Ok(AngleFrame::new(
            timestamp,
            angles,
            confidence_sum / ANGLE_COUNT as f32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> [f32; 3] {
        [x, y, 0.0]
    }

    #[test]
    fn test_straight_limb() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_degenerate_returns_fallback() {
        // vertex coincides with an endpoint
        let reading = measure(p(0.5, 0.5), p(0.5, 0.5), p(1.0, 0.0));
        assert_eq!(reading.degrees, 90.0);
        assert!(reading.degenerate);

        // all three points identical
        assert_eq!(joint_angle(p(0.3, 0.3), p(0.3, 0.3), p(0.3, 0.3)), 90.0);
    }

    #[test]
    fn test_nan_input_returns_fallback() {
        let angle = joint_angle(p(f32::NAN, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert_eq!(angle, 90.0);
        assert!(!angle.is_nan());

        let angle = joint_angle(p(0.0, 0.0), p(0.5, f32::INFINITY), p(1.0, 0.0));
        assert_eq!(angle, 90.0);
    }

    #[test]
    fn test_depth_changes_measurement() {
        let a = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(0.5, 0.0, 0.0, 1.0);
        let c = Landmark::new(0.5, 0.0, 0.5, 1.0);
        // planar: c collapses onto b
        assert!(measure(a.point(false), b.point(false), c.point(false)).degenerate);
        let spatial = measure(a.point(true), b.point(true), c.point(true));
        assert!((spatial.degrees - 90.0).abs() < 0.01);
        assert!(!spatial.degenerate);
    }

    #[test]
    fn test_extract_requires_full_pose() {
        let extractor = AngleExtractor::new(false);
        let result = extractor.extract(&[Landmark::default(); 10], 0.0);
        assert!(matches!(
            result,
            Err(FrameError::MissingLandmarks { expected: 33, got: 10 })
        ));
    }

    #[test]
    fn test_extract_degenerate_lowers_confidence() {
        let extractor = AngleExtractor::new(false);
        // every landmark at the same point: all angles degenerate
        let landmarks = [Landmark::new(0.5, 0.5, 0.0, 1.0); LANDMARK_COUNT];
        let frame = extractor.extract(&landmarks, 1.0).unwrap();
        assert!(frame.angles.iter().all(|&a| a == FALLBACK_ANGLE));
        assert!((frame.confidence - DEGENERATE_CONFIDENCE).abs() < 1e-6);
    }

    #[test]
    fn test_mean_of() {
        let mut angles = [100.0; ANGLE_COUNT];
        angles[AngleKind::LeftElbow.index()] = 60.0;
        let frame = AngleFrame::new(0.0, angles, 1.0);
        let mean = frame.mean_of(&[AngleKind::LeftElbow, AngleKind::RightElbow]);
        assert!((mean - 80.0).abs() < 1e-6);
    }
}
