use crate::Detection;
use anyhow::Result;

/// Common interface for object detection backends.
///
/// The tracker never sees which backend produced a batch: anything that turns an input (an image, a tensor, a
/// recorded frame) into detections can feed it.
pub trait Detector {
    /// What the backend consumes per frame.
    type Input: ?Sized;

    /// Detect objects in a single frame
    fn detect(&mut self, input: &Self::Input) -> Result<Vec<Detection>>;

    /// Get the detector name (for logging/debugging)
    fn name(&self) -> &str;
}
