use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use crate::*;
use tracing::{debug, trace};

/// This is the multi-target tracker.
///
/// It owns every track, the one-step-ahead prediction of each track, and the pool the track identifiers are drawn
/// from. Both maps are keyed and iterated by identifier so matching is deterministic.
///
/// # Examples
///
/// ```
/// use idtrack::{BoundingBox, Detection, Tracker};
///
/// // instantiate tracker with default parameters
/// let mut tracker = Tracker::default();
///
/// // submit the detections of one frame
/// let detection = Detection::new(BoundingBox::new(0, 0, 100, 100), "person", 0.9);
/// let output = tracker.update(&[detection]);
///
/// assert_eq!(output.labels(), &["person #1".to_string()]);
///
/// // print tracks
/// for track in tracker.tracks() {
///     println!(
///         "{} {} {:?} {:?}",
///         track.track_id(),
///         track.confidence().value(),
///         track.velocity(),
///         track.bbox().to_tlbr(),
///     );
/// };
///```
#[derive(Debug)]
pub struct Tracker {
    /// Tunable constants.
    config: TrackerConfig,
    /// The active tracks by identifier.
    tracks: BTreeMap<u32, Track>,
    /// The prediction of each track that has been matched at least once, by identifier.
    predictions: BTreeMap<u32, Track>,
    /// Used to allocate identifiers to new tracks.
    id_pool: IdPool,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::from_config(TrackerConfig::default())
    }
}

impl Tracker {
    /// Returns a new Tracker
    ///
    /// # Arguments
    ///
    /// * `config`: The tunable constants. Rejected if `TrackerConfig::validate` fails.
    pub fn new(config: TrackerConfig) -> Result<Tracker> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: TrackerConfig) -> Tracker {
        Tracker {
            id_pool: IdPool::new(config.max_track_id),
            config,
            tracks: BTreeMap::new(),
            predictions: BTreeMap::new(),
        }
    }

    /// Return the configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Return the active tracks in identifier order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Return the predictions in identifier order
    pub fn predictions(&self) -> impl Iterator<Item = &Track> {
        self.predictions.values()
    }

    /// Return the track with the given identifier
    pub fn track(&self, track_id: u32) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Return the prediction of the track with the given identifier
    pub fn prediction(&self, track_id: u32) -> Option<&Track> {
        self.predictions.get(&track_id)
    }

    /// Return the identifier pool
    pub fn id_pool(&self) -> &IdPool {
        &self.id_pool
    }

    /// Return the number of active tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Return true if there are no active tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Remove every track and prediction and release every identifier.
    pub fn clear(&mut self) {
        debug!(tracks = self.tracks.len(), "clearing tracker");
        self.tracks.clear();
        self.predictions.clear();
        self.id_pool.clear();
    }

    /// Perform association and track management at the current time.
    ///
    /// # Parameters
    ///
    /// * `detections`: A list of detections at the current time step.
    pub fn update(&mut self, detections: &[Detection]) -> FrameOutput {
        self.update_at(detections, Instant::now())
    }

    /// Perform association and track management.
    ///
    /// Each detection, in order, is associated with a prediction or a track (see `matching::associate`). A matched
    /// track takes the detection as its new position and gets a new prediction. An unmatched detection starts a new
    /// track unless the identifier pool is exhausted, in which case it is left out of the output. Tracks not observed
    /// for longer than the ttl are then evicted.
    ///
    /// # Parameters
    ///
    /// * `detections`: A list of detections at the current time step.
    /// * `now`: The monotonic time of the frame.
    pub fn update_at(&mut self, detections: &[Detection], now: Instant) -> FrameOutput {
        let mut output = FrameOutput::with_capacity(detections.len());
        let mut claimed = HashSet::with_capacity(detections.len());

        detections.iter().for_each(|detection| {
            let matched = matching::associate(
                detection,
                &self.predictions,
                &self.tracks,
                &claimed,
                &self.config,
            );

            let track = match matched {
                Some(matched) => self.apply(detection, matched, now),
                None => self.activate(detection, now),
            };

            if let Some(track) = track {
                claimed.insert(track.track_id());
                output.push(*detection.bbox(), detection.score(), track);
            }
        });

        self.evict(now);

        output
    }

    fn apply(&mut self, detection: &Detection, matched: Match, now: Instant) -> Option<&Track> {
        let track = self.tracks.get_mut(&matched.track_id)?;

        // a prediction holds the same mean as its track, so both sources continue the track's history
        let mut confidence = track.take_confidence();
        match matched.source {
            MatchSource::Predicted { iou } => confidence.record(iou),
            MatchSource::Tracked { iou } => confidence.record(iou - self.config.bias_factor),
        }
        confidence.settle();

        let velocity = iou_matching::center_delta(detection.bbox(), track.bbox());
        track.update(detection, velocity, confidence, matched.source, now);
        trace!(
            track_id = matched.track_id,
            source = ?matched.source,
            confidence = track.confidence().value(),
            "matched detection"
        );

        self.predictions.insert(matched.track_id, track.predict());
        self.tracks.get(&matched.track_id)
    }

    fn activate(&mut self, detection: &Detection, now: Instant) -> Option<&Track> {
        let Some(track_id) = self.id_pool.allocate() else {
            debug!(
                class_name = detection.class_name(),
                capacity = self.id_pool.capacity(),
                "identifier pool exhausted, dropping detection"
            );
            return None;
        };

        debug!(track_id, class_name = detection.class_name(), "new track");
        let track = Track::new(track_id, detection, now);
        Some(self.tracks.entry(track_id).or_insert(track))
    }

    fn evict(&mut self, now: Instant) {
        let expired = self
            .tracks
            .values()
            .filter(|track| track.is_expired(now, self.config.ttl))
            .map(|track| track.track_id())
            .collect::<Vec<_>>();

        expired.into_iter().for_each(|track_id| {
            self.tracks.remove(&track_id);
            self.predictions.remove(&track_id);
            self.id_pool.release(track_id);
            debug!(track_id, "evicted track");
        });
    }
}
