use crate::*;
use ndarray::*;
use std::collections::HashSet;

lazy_static! {
    /**
    Class ids of the COCO SSD label map that are never reported.
    Taken from the filter list of the mobile detection app these outputs were tuned against.
    */
    pub static ref DEFAULT_EXCLUDED_CLASS_IDS: HashSet<usize> = HashSet::from([66, 68, 69, 71, 82]);

    /// Class names that are never reported, whatever id the label map gives them.
    pub static ref DEFAULT_EXCLUDED_LABELS: HashSet<String> =
        HashSet::from(["refrigerator".to_string(), "banana".to_string()]);
}

/// Raw outputs of an SSD style detection head for a single image.
#[derive(Debug, Clone)]
pub struct SsdOutputs {
    /// One row per detection, normalized to [0.0, 1.0], in `(top, left, bottom, right)` order.
    boxes: Array2<f32>,
    /// Class id per detection. Models emit these as floats.
    classes: Array1<f32>,
    /// Score per detection.
    scores: Array1<f32>,
}

impl SsdOutputs {
    /// Returns new SsdOutputs
    ///
    /// # Parameters
    ///
    /// * `boxes`: An `N x 4` matrix of normalized `(top, left, bottom, right)` boxes.
    /// * `classes`: `N` class ids.
    /// * `scores`: `N` scores.
    pub fn new(boxes: Array2<f32>, classes: Array1<f32>, scores: Array1<f32>) -> Result<SsdOutputs> {
        if boxes.ncols() != 4 {
            return Err(Error::ShapeMismatch {
                what: "box columns",
                expected: 4,
                actual: boxes.ncols(),
            });
        }
        if classes.len() != boxes.nrows() {
            return Err(Error::ShapeMismatch {
                what: "classes",
                expected: boxes.nrows(),
                actual: classes.len(),
            });
        }
        if scores.len() != boxes.nrows() {
            return Err(Error::ShapeMismatch {
                what: "scores",
                expected: boxes.nrows(),
                actual: scores.len(),
            });
        }

        Ok(SsdOutputs {
            boxes,
            classes,
            scores,
        })
    }

    pub fn len(&self) -> usize {
        self.boxes.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.nrows() == 0
    }
}

/// Which rows of the detector output are reported.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Rows must score strictly above this value. Default `0.5`.
    pub score_threshold: f32,
    /// Class ids that are dropped. Default `DEFAULT_EXCLUDED_CLASS_IDS`.
    pub excluded_class_ids: HashSet<usize>,
    /// Class names that are dropped. Default `DEFAULT_EXCLUDED_LABELS`.
    pub excluded_labels: HashSet<String>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            excluded_class_ids: DEFAULT_EXCLUDED_CLASS_IDS.clone(),
            excluded_labels: DEFAULT_EXCLUDED_LABELS.clone(),
        }
    }
}

/// Where the decoded boxes will be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Width of the display surface in pixels.
    pub surface_width: u32,
    /// Height of the display surface in pixels.
    pub surface_height: u32,
    /// Width of the captured image before it was resized for the model.
    pub image_width: u32,
    /// Height of the captured image before it was resized for the model.
    pub image_height: u32,
    /// Rotation applied to the image before inference, in degrees.
    pub rotation_degrees: u32,
}

impl FrameGeometry {
    /// Whole-number ratio of the captured image width to its height. Portrait images yield `0`.
    pub fn aspect_ratio(&self) -> f32 {
        self.image_width.checked_div(self.image_height).unwrap_or(0) as f32
    }
}

/// Decode the outputs of an SSD detection head into detections in surface pixel coordinates.
///
/// The model sees a square resize of the captured image, so boxes come back squashed along the long side of the
/// image. Each box is stretched by a quarter of its extent, times the image aspect ratio, on both sides of that
/// axis: horizontally when the image was rotated by 90 degrees, vertically otherwise.
///
/// # Parameters
///
/// * `outputs`: The raw model outputs.
/// * `labels`: The label map of the model.
/// * `options`: Score threshold and class filters.
/// * `geometry`: Display surface and capture dimensions.
///
/// # Returns
///
/// The detections in output row order. Rows whose class id has no label are dropped.
pub fn decode_ssd(
    outputs: &SsdOutputs,
    labels: &LabelMap,
    options: &DecodeOptions,
    geometry: &FrameGeometry,
) -> Vec<Detection> {
    let width = geometry.surface_width as f32;
    let height = geometry.surface_height as f32;
    let aspect_ratio = geometry.aspect_ratio();

    outputs
        .boxes
        .outer_iter()
        .zip(outputs.classes.iter())
        .zip(outputs.scores.iter())
        .filter(|(_, score)| **score > options.score_threshold)
        .filter_map(|((bbox, class), score)| {
            let class_id = *class as usize;
            if options.excluded_class_ids.contains(&class_id) {
                return None;
            }
            let class_name = labels.get(class_id)?;
            if options.excluded_labels.contains(class_name) {
                return None;
            }

            let mut top = bbox[0] * height;
            let mut left = bbox[1] * width;
            let mut bottom = bbox[2] * height;
            let mut right = bbox[3] * width;

            if geometry.rotation_degrees == 90 {
                let stretch = (right - left) / 4.0 * aspect_ratio;
                left -= stretch;
                right += stretch;
            } else {
                let stretch = (bottom - top) / 4.0 * aspect_ratio;
                top -= stretch;
                bottom += stretch;
            }

            Some(Detection::new(
                BoundingBox::new(left as i32, top as i32, right as i32, bottom as i32),
                class_name,
                *score,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::*;
    use ndarray::*;

    fn labels() -> LabelMap {
        LabelMap::new(vec!["person".into(), "banana".into(), "car".into()]).unwrap()
    }

    fn outputs() -> SsdOutputs {
        SsdOutputs::new(
            arr2(&[
                [0.25, 0.5, 0.75, 1.0],
                [0.0, 0.0, 0.5, 0.5],
                [0.0, 0.0, 0.5, 0.5],
                [0.0, 0.0, 0.5, 0.5],
                [0.0, 0.0, 0.5, 0.5],
                [0.0, 0.0, 0.5, 0.5],
            ]),
            // person, person (low score), banana, excluded id, unknown id, car at the threshold
            arr1(&[0.0, 0.0, 1.0, 66.0, 7.0, 2.0]),
            arr1(&[0.9, 0.4, 0.9, 0.9, 0.9, 0.5]),
        )
        .unwrap()
    }

    fn geometry(image_width: u32, image_height: u32, rotation_degrees: u32) -> FrameGeometry {
        FrameGeometry {
            surface_width: 200,
            surface_height: 400,
            image_width,
            image_height,
            rotation_degrees,
        }
    }

    #[test]
    fn decode_landscape() {
        let detections = decode_ssd(
            &outputs(),
            &labels(),
            &DecodeOptions::default(),
            &geometry(640, 480, 0),
        );
        assert_eq!(
            detections,
            vec![Detection::new(BoundingBox::new(100, 50, 200, 350), "person", 0.9)]
        );
    }

    #[test]
    fn decode_rotated() {
        let detections = decode_ssd(
            &outputs(),
            &labels(),
            &DecodeOptions::default(),
            &geometry(640, 480, 90),
        );
        assert_eq!(
            detections,
            vec![Detection::new(BoundingBox::new(75, 100, 225, 300), "person", 0.9)]
        );
    }

    #[test]
    fn decode_portrait_is_not_stretched() {
        let detections = decode_ssd(
            &outputs(),
            &labels(),
            &DecodeOptions::default(),
            &geometry(480, 640, 0),
        );
        assert_eq!(detections[0].bbox(), &BoundingBox::new(100, 100, 200, 300));
    }

    #[test]
    fn custom_filters() {
        let options = DecodeOptions {
            score_threshold: 0.3,
            excluded_class_ids: Default::default(),
            excluded_labels: Default::default(),
        };
        let detections = decode_ssd(&outputs(), &labels(), &options, &geometry(480, 640, 0));
        let names = detections
            .iter()
            .map(|detection| detection.class_name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["person", "person", "banana", "car"]);
    }

    #[test]
    fn shape_mismatch() {
        let result = SsdOutputs::new(
            Array2::zeros((2, 4)),
            Array1::zeros(2),
            Array1::zeros(3),
        );
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                what: "scores",
                expected: 2,
                actual: 3
            })
        ));

        let result = SsdOutputs::new(Array2::zeros((2, 3)), Array1::zeros(2), Array1::zeros(2));
        assert!(matches!(result, Err(Error::ShapeMismatch { expected: 4, .. })));
    }

    #[test]
    fn empty_outputs() {
        let outputs =
            SsdOutputs::new(Array2::zeros((0, 4)), Array1::zeros(0), Array1::zeros(0)).unwrap();
        assert!(outputs.is_empty());
        assert!(decode_ssd(
            &outputs,
            &labels(),
            &DecodeOptions::default(),
            &geometry(640, 480, 0)
        )
        .is_empty());
    }
}
