use crate::{BoundingBox, Track};

/// One row of a frame's output.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject<'a> {
    pub track_id: u32,
    pub bbox: &'a BoundingBox,
    pub score: f32,
    pub label: &'a str,
}

/// The stable output of one frame as parallel sequences, ready for a renderer.
///
/// Row `i` of `boxes`, `scores` and `labels` describes the same detection. Labels have the form
/// `"<class_name> #<track_id>"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    track_ids: Vec<u32>,
    boxes: Vec<BoundingBox>,
    scores: Vec<f32>,
    labels: Vec<String>,
}

impl FrameOutput {
    pub(crate) fn with_capacity(capacity: usize) -> FrameOutput {
        FrameOutput {
            track_ids: Vec::with_capacity(capacity),
            boxes: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, bbox: BoundingBox, score: f32, track: &Track) {
        self.track_ids.push(track.track_id());
        self.boxes.push(bbox);
        self.scores.push(score);
        self.labels.push(track.label());
    }

    /// Returns the box of every emitted detection
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Returns the detector score of every emitted detection
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Returns the display label of every emitted detection
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the track identifier of every emitted detection
    pub fn track_ids(&self) -> &[u32] {
        &self.track_ids
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate the rows in detection order.
    pub fn iter(&self) -> impl Iterator<Item = TrackedObject<'_>> {
        self.track_ids
            .iter()
            .zip(self.boxes.iter())
            .zip(self.scores.iter())
            .zip(self.labels.iter())
            .map(|(((track_id, bbox), score), label)| TrackedObject {
                track_id: *track_id,
                bbox,
                score: *score,
                label,
            })
    }

    /// Split into the `(boxes, scores, labels)` sequences consumed by a renderer.
    pub fn into_parts(self) -> (Vec<BoundingBox>, Vec<f32>, Vec<String>) {
        (self.boxes, self.scores, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::time::Instant;

    #[test]
    fn rows_are_parallel() {
        let now = Instant::now();
        let first = Track::new(
            1,
            &Detection::new(BoundingBox::new(0, 0, 10, 10), "person", 0.9),
            now,
        );
        let second = Track::new(
            5,
            &Detection::new(BoundingBox::new(20, 0, 30, 10), "cat", 0.6),
            now,
        );

        let mut output = FrameOutput::with_capacity(2);
        output.push(*first.bbox(), 0.9, &first);
        output.push(*second.bbox(), 0.6, &second);

        assert_eq!(output.len(), 2);
        assert_eq!(output.track_ids(), &[1, 5]);

        let rows = output.iter().collect::<Vec<_>>();
        assert_eq!(
            rows[1],
            TrackedObject {
                track_id: 5,
                bbox: &BoundingBox::new(20, 0, 30, 10),
                score: 0.6,
                label: "cat #5",
            }
        );

        let (boxes, scores, labels) = output.into_parts();
        assert_eq!(boxes.len(), 2);
        assert_eq!(scores, vec![0.9, 0.6]);
        assert_eq!(labels, vec!["person #1".to_string(), "cat #5".to_string()]);
    }
}
