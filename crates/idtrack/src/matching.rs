use crate::*;
use std::collections::{BTreeMap, HashSet};

/// Enumeration type for the source of the match
///
/// * `Predicted` means matched via the constant-velocity prediction of the track.
/// * `Tracked` means matched via the last accepted position of the track only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchSource {
    Predicted { iou: f32 },
    Tracked { iou: f32 },
}

/// The best entity of one pass for a detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The identifier of the matched entity.
    pub track_id: u32,
    /// Intersection over union between the detection and the entity.
    pub iou: f32,
    /// `(iou + confidence) / 2`, the score compared against the threshold.
    pub blended: f32,
}

/// The association of a detection with a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub track_id: u32,
    pub source: MatchSource,
}

/// Returns the blended score an entity must exceed to accept a match.
///
/// Larger recent motion, relative to the box size, lowers the bar so fast-moving targets tolerate prediction drift.
pub fn match_threshold(entity: &Track, config: &TrackerConfig) -> f32 {
    config.base_threshold
        - iou_matching::scaled_displacement(&entity.velocity(), entity.bbox(), config.scale_factor)
}

/// Scan `entities` for the best candidate for `detection`.
///
/// # Parameters
///
/// * `detection`: The detection to associate.
/// * `entities`: Tracked or predicted entities in a stable order.
/// * `claimed`: Identifiers already associated during this frame. They are skipped.
/// * `config`: The tracker configuration.
///
/// # Returns
///
/// The entity with the highest blended score above its threshold whose class equals the detection class. On equal
/// scores the entity seen first wins.
pub fn best_candidate<'a>(
    detection: &Detection,
    entities: impl IntoIterator<Item = &'a Track>,
    claimed: &HashSet<u32>,
    config: &TrackerConfig,
) -> Option<Candidate> {
    entities
        .into_iter()
        .filter(|entity| !claimed.contains(&entity.track_id()))
        .filter(|entity| entity.class_name() == detection.class_name())
        .filter_map(|entity| {
            let iou = iou_matching::intersection_over_union(detection.bbox(), entity.bbox());
            let blended = (iou + entity.confidence().value()) / 2.0;
            (blended > match_threshold(entity, config)).then_some(Candidate {
                track_id: entity.track_id(),
                iou,
                blended,
            })
        })
        .fold(None, |best: Option<Candidate>, candidate| match best {
            Some(best) if best.blended >= candidate.blended => Some(best),
            _ => Some(candidate),
        })
}

/// Associate a detection with a track using the prediction pass followed by the tracked pass.
///
/// # Parameters
///
/// * `detection`: The detection to associate.
/// * `predictions`: Predicted entities by identifier.
/// * `tracks`: Tracked entities by identifier.
/// * `claimed`: Identifiers already associated during this frame.
/// * `config`: The tracker configuration.
///
/// # Returns
///
/// `None` if neither pass produced a candidate. When both passes pick the same track the match is `Predicted`. When
/// they pick different tracks the higher blended score wins, ties going to the tracked pass.
pub fn associate(
    detection: &Detection,
    predictions: &BTreeMap<u32, Track>,
    tracks: &BTreeMap<u32, Track>,
    claimed: &HashSet<u32>,
    config: &TrackerConfig,
) -> Option<Match> {
    let predicted = best_candidate(detection, predictions.values(), claimed, config)
        .filter(|candidate| tracks.contains_key(&candidate.track_id));
    let tracked = best_candidate(detection, tracks.values(), claimed, config);

    let predicted_match = |candidate: Candidate| Match {
        track_id: candidate.track_id,
        source: MatchSource::Predicted { iou: candidate.iou },
    };
    let tracked_match = |candidate: Candidate| Match {
        track_id: candidate.track_id,
        source: MatchSource::Tracked { iou: candidate.iou },
    };

    match (predicted, tracked) {
        (None, None) => None,
        (Some(predicted), None) => Some(predicted_match(predicted)),
        (None, Some(tracked)) => Some(tracked_match(tracked)),
        (Some(predicted), Some(tracked)) => {
            if predicted.track_id == tracked.track_id || predicted.blended > tracked.blended {
                Some(predicted_match(predicted))
            } else {
                Some(tracked_match(tracked))
            }
        }
    }
}
