pub mod output;
pub mod recording;
