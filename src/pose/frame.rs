//! One timestamped observation from the pose extractor

use super::landmarks::Landmark;
use serde::{Deserialize, Serialize};

/// A pose frame as delivered by the landmark extractor.
/// `landmarks` is `None` when no pose was detected in the image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Capture time in seconds
    pub timestamp: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl PoseFrame {
    pub fn detected(timestamp: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks: Some(landmarks),
        }
    }

    pub fn lost(timestamp: f64) -> Self {
        Self {
            timestamp,
            landmarks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lost_frame() {
        let frame: PoseFrame = serde_json::from_str(r#"{"timestamp": 1.5, "landmarks": null}"#).unwrap();
        assert_eq!(frame, PoseFrame::lost(1.5));

        let frame: PoseFrame = serde_json::from_str(r#"{"timestamp": 2.0}"#).unwrap();
        assert!(frame.landmarks.is_none());
    }
}
