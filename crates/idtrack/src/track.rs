use std::time::{Duration, Instant};

use crate::*;

/// A single target track: the last accepted observation of one physical object together with its identity, motion
/// and confidence history.
///
/// The same type describes the one-step-ahead prediction of a track, see `Track::predict`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// A unique track identifier drawn from the tracker's `IdPool`. Never `0`.
    track_id: u32,
    /// Last accepted position, or the extrapolated position for a prediction.
    bbox: BoundingBox,
    /// Center displacement between the previous and the last accepted position.
    velocity: Velocity,
    /// The class every matched detection must carry.
    class_name: String,
    /// Detector score of the last accepted observation.
    score: f32,
    /// Match-quality history.
    confidence: Confidence,
    /// The latest match source. `None` for a track that has only been seen once.
    match_source: Option<MatchSource>,
    /// Time of the last accepted observation.
    last_seen: Instant,
}

impl Track {
    /// Returns a new Track for a first sighting
    ///
    /// # Parameters
    ///
    /// * `track_id`: A unique track identifier.
    /// * `detection`: The detection this track originates from.
    /// * `now`: Time of the observation.
    pub fn new(track_id: u32, detection: &Detection, now: Instant) -> Track {
        Track {
            track_id,
            bbox: *detection.bbox(),
            velocity: Velocity::default(),
            class_name: detection.class_name().to_owned(),
            score: detection.score(),
            confidence: Confidence::seeded(),
            match_source: None,
            last_seen: now,
        }
    }

    /// Return the identifier of the track
    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// Returns the track position bounding box
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Return the last observed velocity of the track
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Return the class name of the track
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Return the detector score of the last accepted observation
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Return the confidence history of the track
    pub fn confidence(&self) -> &Confidence {
        &self.confidence
    }

    /// Return the match source of the track
    pub fn match_source(&self) -> Option<MatchSource> {
        self.match_source
    }

    /// Return the time of the last accepted observation
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Returns the display label `"<class_name> #<track_id>"`.
    pub fn label(&self) -> String {
        format!("{} #{}", self.class_name, self.track_id)
    }

    /// Returns true if the track has gone unobserved for longer than `ttl` at `now`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > ttl
    }

    /// Returns the constant-velocity prediction of this track: the same track with its box shifted by `-velocity`.
    /// The prediction is the pre-match target for the next frame.
    ///
    /// The prediction carries a snapshot of the confidence, so the sample history is not copied.
    pub fn predict(&self) -> Track {
        Track {
            track_id: self.track_id,
            bbox: self
                .bbox
                .translate(self.velocity.dx.saturating_neg(), self.velocity.dy.saturating_neg()),
            velocity: self.velocity,
            class_name: self.class_name.clone(),
            score: self.score,
            confidence: self.confidence.snapshot(),
            match_source: self.match_source,
            last_seen: self.last_seen,
        }
    }

    /// Removes the confidence history from the track, leaving a fresh seed in its place.
    pub(crate) fn take_confidence(&mut self) -> Confidence {
        std::mem::take(&mut self.confidence)
    }

    /// Accept `detection` as the new position of this track.
    ///
    /// # Parameters
    ///
    /// * `detection`: The associated detection. Its class must equal the track class.
    /// * `velocity`: Center displacement from the previous position to `detection`.
    /// * `confidence`: The updated confidence history.
    /// * `match_source`: How the detection was associated.
    /// * `now`: Time of the observation.
    pub fn update(
        &mut self,
        detection: &Detection,
        velocity: Velocity,
        confidence: Confidence,
        match_source: MatchSource,
        now: Instant,
    ) -> &Self {
        debug_assert_eq!(detection.class_name(), self.class_name);

        self.bbox = *detection.bbox();
        self.velocity = velocity;
        self.score = detection.score();
        self.confidence = confidence;
        self.match_source = Some(match_source);
        self.last_seen = now;

        self
    }
}
