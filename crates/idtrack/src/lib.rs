#[macro_use]
extern crate lazy_static;

mod bounding_box;
mod confidence;
mod config;
mod detection;
mod detector;
mod error;
mod frame_output;
mod id_pool;
pub mod iou_matching;
mod label_map;
pub mod matching;
pub mod postprocessing;
mod shared_tracker;
mod track;
mod tracker;

pub use bounding_box::{BoundingBox, Velocity};
pub use confidence::Confidence;
pub use config::{TrackerConfig, MAX_TRACK_ID_LIMIT};
pub use detection::Detection;
pub use detector::Detector;
pub use error::{Error, Result};
pub use frame_output::{FrameOutput, TrackedObject};
pub use id_pool::IdPool;
pub use label_map::LabelMap;
pub use matching::{Match, MatchSource};
pub use postprocessing::{decode_ssd, DecodeOptions, FrameGeometry, SsdOutputs};
pub use shared_tracker::SharedTracker;
pub use track::Track;
pub use tracker::Tracker;
