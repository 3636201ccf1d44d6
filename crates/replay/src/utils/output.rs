use anyhow::Result;
use idtrack::FrameOutput;
use serde::Serialize;
use std::io::Write;

/// One row of the replay output.
#[derive(Debug, Serialize)]
pub struct TrackRecord<'a> {
    pub frame: u64,
    pub track_id: u32,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub score: f32,
    pub label: &'a str,
}

/// Write the output of one frame, returning the number of rows written.
pub fn write_frame<W: Write>(
    writer: &mut csv::Writer<W>,
    frame: u64,
    output: &FrameOutput,
) -> Result<usize> {
    output.iter().try_for_each(|row| {
        writer.serialize(TrackRecord {
            frame,
            track_id: row.track_id,
            left: row.bbox.left(),
            top: row.bbox.top(),
            right: row.bbox.right(),
            bottom: row.bbox.bottom(),
            score: row.score,
            label: row.label,
        })
    })?;

    Ok(output.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idtrack::{BoundingBox, Detection, Tracker};

    #[test]
    fn writes_header_and_rows() -> Result<()> {
        let mut tracker = Tracker::default();
        let output = tracker.update(&[
            Detection::new(BoundingBox::new(0, 0, 100, 100), "person", 0.9),
            Detection::new(BoundingBox::new(200, 0, 300, 100), "car", 0.5),
        ]);

        let mut writer = csv::Writer::from_writer(vec![]);
        assert_eq!(write_frame(&mut writer, 7, &output)?, 2);

        writer.flush()?;
        let text = String::from_utf8(writer.get_ref().clone())?;
        assert_eq!(
            text,
            "frame,track_id,left,top,right,bottom,score,label\n\
             7,1,0,0,100,100,0.9,person #1\n\
             7,2,200,0,300,100,0.5,car #2\n"
        );
        Ok(())
    }
}
