use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Instant;

use crate::*;
use tracing::{debug, warn};

/// A `Tracker` that can be driven from several producer threads.
///
/// At most one frame is in flight: a frame submitted while another frame is being tracked is dropped rather than
/// queued, so the output never lags behind the camera.
#[derive(Debug, Default)]
pub struct SharedTracker {
    inner: Mutex<Tracker>,
}

impl SharedTracker {
    pub fn new(tracker: Tracker) -> SharedTracker {
        SharedTracker {
            inner: Mutex::new(tracker),
        }
    }

    /// Track a frame stamped with the current time, or drop it if a frame is already in flight.
    pub fn try_update(&self, detections: &[Detection]) -> Option<FrameOutput> {
        self.try_update_at(detections, Instant::now())
    }

    /// Track a frame, or drop it if a frame is already in flight.
    ///
    /// # Returns
    ///
    /// `None` if the frame was dropped.
    pub fn try_update_at(&self, detections: &[Detection], now: Instant) -> Option<FrameOutput> {
        match self.inner.try_lock() {
            Ok(mut tracker) => Some(tracker.update_at(detections, now)),
            Err(TryLockError::WouldBlock) => {
                debug!(detections = detections.len(), "frame in flight, dropping frame");
                None
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                let mut tracker = self.recover(poisoned.into_inner());
                Some(tracker.update_at(detections, now))
            }
        }
    }

    /// Remove every track, waiting for an in-flight frame to finish.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Run `f` against the tracker, waiting for an in-flight frame to finish.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&Tracker) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Tracker> {
        match self.inner.lock() {
            Ok(tracker) => tracker,
            Err(poisoned) => self.recover(poisoned.into_inner()),
        }
    }

    /// A frame that panicked may have left the maps half updated. An empty tracker is the only state known to be
    /// consistent.
    fn recover<'a>(&'a self, mut tracker: MutexGuard<'a, Tracker>) -> MutexGuard<'a, Tracker> {
        warn!("tracker lock poisoned, resetting tracks");
        tracker.clear();
        self.inner.clear_poison();
        tracker
    }
}
