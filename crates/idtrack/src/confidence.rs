/// Running quality score of a track, built from match-quality samples.
///
/// Samples form an ordered multiset: identical observations are all kept. `value` is the arithmetic mean of the
/// samples as of the last call to `record`. The mean is kept from a running sum, so recording is constant time
/// however long the history grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Confidence {
    samples: Vec<f32>,
    /// Sum of every sample, including those a snapshot no longer holds.
    sum: f64,
    /// Number of samples, including those a snapshot no longer holds.
    count: usize,
    value: f32,
}

impl Default for Confidence {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Confidence {
    /// Returns a Confidence holding the single seed sample `1.0` given to a first sighting.
    pub fn seeded() -> Confidence {
        Confidence {
            samples: vec![1.0],
            sum: 1.0,
            count: 1,
            value: 1.0,
        }
    }

    /// Returns a copy carrying the running mean but no sample history.
    ///
    /// Recording into a snapshot continues the same mean.
    pub fn snapshot(&self) -> Confidence {
        Confidence {
            samples: vec![],
            sum: self.sum,
            count: self.count,
            value: self.value,
        }
    }

    /// Returns the current confidence
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Returns the recorded samples in insertion order. Empty for a snapshot.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the number of samples the mean is taken over
    pub fn count(&self) -> usize {
        self.count
    }

    /// Append a match-quality sample and recompute the mean.
    pub fn record(&mut self, sample: f32) {
        self.push(sample);
        self.value = (self.sum / self.count as f64) as f32;
    }

    /// Append the trailing `0.0` sample every accepted match carries.
    ///
    /// The zero is folded into `value` by the next `record`, so a track that stops being reinforced drifts down.
    pub fn settle(&mut self) {
        self.push(0.0);
    }

    fn push(&mut self, sample: f32) {
        self.samples.push(sample);
        self.sum += sample as f64;
        self.count += 1;
    }
}
