use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Detection represents a bounding box detection in a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in left, top, right, bottom format.
    bbox: BoundingBox,
    /// Class name reported by the detector.
    class_name: String,
    /// Detection confidence score.
    score: f32,
}

impl Detection {
    /// Returns a new Detection
    ///
    /// # Parameters
    ///
    /// * `bbox`: A bounding box object.
    /// * `class_name`: The detected class.
    /// * `score`: Detection confidence score.
    pub fn new(bbox: BoundingBox, class_name: impl Into<String>, score: f32) -> Detection {
        Detection {
            bbox,
            class_name: class_name.into(),
            score,
        }
    }

    /// Returns a BoundingBox of the detection co-ordinates
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the class name of the detection
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the score of the detection
    pub fn score(&self) -> f32 {
        self.score
    }
}
