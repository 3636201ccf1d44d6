use anyhow::{Context, Result};
use idtrack::{BoundingBox, Detection, Detector};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

/// One row of a detection recording.
///
/// A row with an empty `label` marks a frame in which nothing was detected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionRecord {
    pub frame: u64,
    pub timestamp_ms: u64,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub label: String,
    pub score: f32,
}

/// The detections of one recorded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub frame: u64,
    pub timestamp_ms: u64,
    pub detections: Vec<Detection>,
}

/// Read every row of a `frame,timestamp_ms,left,top,right,bottom,label,score` recording.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<DetectionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader
        .deserialize::<DetectionRecord>()
        .enumerate()
        .map(|(index, record)| record.with_context(|| format!("invalid record {}", index + 1)))
        .collect::<Result<Vec<_>>>()?;
    Ok(records)
}

/// Group rows into frames, keeping frames in first-seen order and detections in row order.
///
/// A frame takes the timestamp of its first row.
pub fn group_frames(records: Vec<DetectionRecord>) -> Vec<RecordedFrame> {
    let mut frames = IndexMap::<u64, RecordedFrame>::new();

    records.into_iter().for_each(|record| {
        let frame = frames.entry(record.frame).or_insert_with(|| RecordedFrame {
            frame: record.frame,
            timestamp_ms: record.timestamp_ms,
            detections: vec![],
        });

        if !record.label.is_empty() {
            frame.detections.push(Detection::new(
                BoundingBox::new(record.left, record.top, record.right, record.bottom),
                record.label,
                record.score,
            ));
        }
    });

    let frames = frames.into_values().collect::<Vec<_>>();
    frames.windows(2).for_each(|pair| {
        if pair[1].timestamp_ms < pair[0].timestamp_ms {
            warn!(
                frame = pair[1].frame,
                previous = pair[0].frame,
                "timestamp goes backwards"
            );
        }
    });
    frames
}

/// A detector backend that serves recorded detections by frame number.
#[derive(Debug, Default)]
pub struct RecordedDetector {
    frames: IndexMap<u64, RecordedFrame>,
}

impl RecordedDetector {
    pub fn new(frames: Vec<RecordedFrame>) -> RecordedDetector {
        RecordedDetector {
            frames: frames
                .into_iter()
                .map(|frame| (frame.frame, frame))
                .collect(),
        }
    }

    /// Returns `(frame, timestamp_ms)` of every recorded frame in replay order.
    pub fn schedule(&self) -> Vec<(u64, u64)> {
        self.frames
            .values()
            .map(|frame| (frame.frame, frame.timestamp_ms))
            .collect()
    }
}

impl Detector for RecordedDetector {
    type Input = u64;

    /// Frames that were never recorded have no detections.
    fn detect(&mut self, frame: &u64) -> Result<Vec<Detection>> {
        Ok(self
            .frames
            .get(frame)
            .map(|frame| frame.detections.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = "\
frame,timestamp_ms,left,top,right,bottom,label,score
1,0,0,0,100,100,person,0.9
1,0,200,0,300,100,car,0.75
3,66,10,0,110,100,person,0.8
2,33,0,0,100,100,person,0.85
4,100,0,0,0,0,,0
";

    #[test]
    fn read() -> Result<()> {
        let records = read_records(RECORDING.as_bytes())?;
        assert_eq!(records.len(), 5);
        assert_eq!(
            records[1],
            DetectionRecord {
                frame: 1,
                timestamp_ms: 0,
                left: 200,
                top: 0,
                right: 300,
                bottom: 100,
                label: "car".into(),
                score: 0.75,
            }
        );
        assert!(records[4].label.is_empty());
        Ok(())
    }

    #[test]
    fn read_rejects_bad_rows() {
        let recording = "frame,timestamp_ms,left,top,right,bottom,label,score\n1,0,a,0,1,1,person,0.5\n";
        let error = read_records(recording.as_bytes()).unwrap_err();
        assert_eq!(error.to_string(), "invalid record 1");
    }

    #[test]
    fn group_keeps_first_seen_order() -> Result<()> {
        let frames = group_frames(read_records(RECORDING.as_bytes())?);

        let order = frames.iter().map(|frame| frame.frame).collect::<Vec<_>>();
        assert_eq!(order, vec![1, 3, 2, 4]);
        assert_eq!(frames[0].detections.len(), 2);
        assert_eq!(frames[0].detections[1].class_name(), "car");
        assert_eq!(frames[1].timestamp_ms, 66);
        assert!(frames[3].detections.is_empty());
        Ok(())
    }

    #[test]
    fn recorded_detector() -> Result<()> {
        let mut detector = RecordedDetector::new(group_frames(read_records(RECORDING.as_bytes())?));

        assert_eq!(detector.schedule(), vec![(1, 0), (3, 66), (2, 33), (4, 100)]);
        assert_eq!(detector.detect(&1)?.len(), 2);
        assert!(detector.detect(&4)?.is_empty());
        assert!(detector.detect(&42)?.is_empty());
        assert_eq!(detector.name(), "recording");
        Ok(())
    }
}
