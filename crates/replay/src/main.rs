mod utils;
use anyhow::{Context, Result};
use clap::Parser;
use idtrack::{Detector, Tracker, TrackerConfig};
use itertools::Itertools;
use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;
use utils::*;

/// Replay recorded detections through the tracker and write the identity-augmented output
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The recording, a csv with header `frame,timestamp_ms,left,top,right,bottom,label,score`
    #[arg(short, long)]
    input: PathBuf,

    /// The output csv. Written to stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// A json tracker configuration. Flags below take precedence over its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Blended score a match must exceed for a stationary target
    #[arg(long)]
    base_threshold: Option<f32>,

    /// Multiplier of the box-relative displacement that lowers the threshold of moving targets
    #[arg(long)]
    scale_factor: Option<f32>,

    /// Penalty applied to matches the prediction did not anticipate
    #[arg(long)]
    bias_factor: Option<f32>,

    /// Milliseconds a track may go unobserved before eviction
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Largest track identifier
    #[arg(long)]
    max_track_id: Option<u32>,
}

impl Args {
    fn tracker_config(&self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open config {}", path.display()))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => TrackerConfig::default(),
        };

        if let Some(base_threshold) = self.base_threshold {
            config.with_base_threshold(base_threshold);
        }
        if let Some(scale_factor) = self.scale_factor {
            config.with_scale_factor(scale_factor);
        }
        if let Some(bias_factor) = self.bias_factor {
            config.with_bias_factor(bias_factor);
        }
        if let Some(ttl_ms) = self.ttl_ms {
            config.with_ttl(Duration::from_millis(ttl_ms));
        }
        if let Some(max_track_id) = self.max_track_id {
            config.with_max_track_id(max_track_id);
        }

        Ok(config)
    }
}

/// Counters of a replay run.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    frames: usize,
    detections: usize,
    rows: usize,
    distinct_ids: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut tracker = Tracker::new(args.tracker_config()?)?;
    info!(config = ?tracker.config(), "tracker ready");

    let input = File::open(&args.input)
        .with_context(|| format!("cannot open recording {}", args.input.display()))?;
    let frames = recording::group_frames(recording::read_records(input)?);
    let mut detector = recording::RecordedDetector::new(frames);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(writer);

    let summary = replay(&mut detector, &mut tracker, &mut writer)?;
    writer.flush()?;

    info!(
        detector = detector.name(),
        frames = summary.frames,
        detections = summary.detections,
        rows = summary.rows,
        distinct_ids = summary.distinct_ids,
        "replay finished"
    );

    Ok(())
}

/// Feed every recorded frame to the tracker at its recorded time and write the output rows.
fn replay<W: Write>(
    detector: &mut recording::RecordedDetector,
    tracker: &mut Tracker,
    writer: &mut csv::Writer<W>,
) -> Result<Summary> {
    let start = Instant::now();
    let mut summary = Summary::default();
    let mut track_ids = vec![];

    detector
        .schedule()
        .into_iter()
        .try_for_each(|(frame, timestamp_ms)| {
            let detections = detector.detect(&frame)?;
            let tracked =
                tracker.update_at(&detections, start + Duration::from_millis(timestamp_ms));

            summary.frames += 1;
            summary.detections += detections.len();
            summary.rows += output::write_frame(writer, frame, &tracked)?;
            track_ids.extend_from_slice(tracked.track_ids());

            Ok::<_, anyhow::Error>(())
        })?;

    summary.distinct_ids = track_ids.into_iter().unique().count();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = "\
frame,timestamp_ms,left,top,right,bottom,label,score
1,0,0,0,100,100,person,0.9
2,33,0,0,100,100,person,0.9
3,66,10,0,110,100,person,0.9
4,1100,0,0,0,0,,0
5,1133,500,500,600,600,dog,0.7
";

    fn run(recording: &str, tracker: &mut Tracker) -> Result<(Summary, String)> {
        let frames = recording::group_frames(recording::read_records(recording.as_bytes())?);
        let mut detector = recording::RecordedDetector::new(frames);
        let mut writer = csv::Writer::from_writer(vec![]);

        let summary = replay(&mut detector, tracker, &mut writer)?;
        writer.flush()?;
        Ok((summary, String::from_utf8(writer.get_ref().clone())?))
    }

    #[test]
    fn replay_evicts_and_reuses_identifiers() -> Result<()> {
        let mut tracker = Tracker::default();
        let (summary, text) = run(RECORDING, &mut tracker)?;

        assert_eq!(
            summary,
            Summary {
                frames: 5,
                detections: 4,
                rows: 4,
                distinct_ids: 1,
            }
        );
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "frame,track_id,left,top,right,bottom,score,label",
                "1,1,0,0,100,100,0.9,person #1",
                "2,1,0,0,100,100,0.9,person #1",
                "3,1,10,0,110,100,0.9,person #1",
                "5,1,500,500,600,600,0.7,dog #1",
            ]
        );
        Ok(())
    }

    #[test]
    fn exhausted_pool_leaves_rows_out() -> Result<()> {
        let mut config = TrackerConfig::default();
        config.with_max_track_id(1);
        let mut tracker = Tracker::new(config)?;

        let recording = "\
frame,timestamp_ms,left,top,right,bottom,label,score
1,0,0,0,100,100,person,0.9
1,0,200,0,300,100,car,0.75
";
        let (summary, text) = run(recording, &mut tracker)?;
        assert_eq!(summary.detections, 2);
        assert_eq!(summary.rows, 1);
        assert!(text.ends_with("1,1,0,0,100,100,0.9,person #1\n"));
        Ok(())
    }

    #[test]
    fn flags_override_config() -> Result<()> {
        let args = Args::try_parse_from([
            "replay",
            "--input",
            "detections.csv",
            "--ttl-ms",
            "250",
            "--max-track-id",
            "12",
        ])?;
        let config = args.tracker_config()?;
        assert_eq!(args.output, None);
        assert_eq!(config.ttl, Duration::from_millis(250));
        assert_eq!(config.max_track_id, 12);
        assert_eq!(config.base_threshold, 0.75);
        Ok(())
    }

    #[test]
    fn missing_config_file() {
        let args = Args::try_parse_from([
            "replay",
            "-i",
            "detections.csv",
            "-c",
            "/nonexistent/tracker.json",
        ])
        .unwrap();
        assert!(args.tracker_config().is_err());
    }
}
