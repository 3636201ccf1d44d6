use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound of `TrackerConfig::max_track_id`. The identifier pool holds one bit per identifier and is scanned
/// from the bottom on every allocation.
pub const MAX_TRACK_ID_LIMIT: u32 = 1 << 16;

/// Tunable constants of the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Blended score a candidate must exceed when the target is not moving. Default `0.75`.
    pub base_threshold: f32,
    /// Multiplier applied to the box-relative displacement that lowers the threshold of moving targets. Default `2.0`.
    pub scale_factor: f32,
    /// Penalty subtracted from the IoU sample of a match the prediction did not anticipate. Default `0.2`.
    pub bias_factor: f32,
    /// Maximum time a track may go unobserved before it is evicted. Default `1000ms`.
    #[serde(rename = "ttl_ms", with = "duration_ms")]
    pub ttl: Duration,
    /// Largest identifier handed out to a track. Identifiers are drawn from `[1, max_track_id]`. Default `98`.
    pub max_track_id: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_threshold: 0.75,
            scale_factor: 2.0,
            bias_factor: 0.2,
            ttl: Duration::from_millis(1000),
            max_track_id: 98,
        }
    }
}

impl TrackerConfig {
    /// Set base_threshold
    pub fn with_base_threshold(&mut self, base_threshold: f32) -> &mut Self {
        self.base_threshold = base_threshold;
        self
    }

    /// Set scale_factor
    pub fn with_scale_factor(&mut self, scale_factor: f32) -> &mut Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set bias_factor
    pub fn with_bias_factor(&mut self, bias_factor: f32) -> &mut Self {
        self.bias_factor = bias_factor;
        self
    }

    /// Set ttl
    pub fn with_ttl(&mut self, ttl: Duration) -> &mut Self {
        self.ttl = ttl;
        self
    }

    /// Set max_track_id
    pub fn with_max_track_id(&mut self, max_track_id: u32) -> &mut Self {
        self.max_track_id = max_track_id;
        self
    }

    /// Check that every constant is usable by the tracker.
    pub fn validate(&self) -> Result<()> {
        if !self.base_threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "base_threshold must be finite, got {}",
                self.base_threshold
            )));
        }
        if !self.scale_factor.is_finite() || self.scale_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "scale_factor must be a non-negative number, got {}",
                self.scale_factor
            )));
        }
        if !self.bias_factor.is_finite() || self.bias_factor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bias_factor must be a non-negative number, got {}",
                self.bias_factor
            )));
        }
        if self.ttl.is_zero() {
            return Err(Error::InvalidConfig("ttl must be greater than zero".into()));
        }
        if self.max_track_id == 0 || self.max_track_id > MAX_TRACK_ID_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "max_track_id must be in [1, {MAX_TRACK_ID_LIMIT}], got {}",
                self.max_track_id
            )));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::time::Duration;

    #[test]
    fn default_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = TrackerConfig::default()
            .with_base_threshold(0.6)
            .with_ttl(Duration::from_millis(250))
            .with_max_track_id(10)
            .to_owned();
        assert_eq!(config.base_threshold, 0.6);
        assert_eq!(config.ttl, Duration::from_millis(250));
        assert_eq!(config.max_track_id, 10);
        assert_eq!(config.scale_factor, 2.0);
    }

    #[test]
    fn rejects_invalid_values() {
        let invalid = [
            TrackerConfig::default().with_base_threshold(f32::NAN).to_owned(),
            TrackerConfig::default().with_scale_factor(-1.0).to_owned(),
            TrackerConfig::default().with_bias_factor(f32::INFINITY).to_owned(),
            TrackerConfig::default().with_ttl(Duration::ZERO).to_owned(),
            TrackerConfig::default().with_max_track_id(0).to_owned(),
            TrackerConfig::default()
                .with_max_track_id(MAX_TRACK_ID_LIMIT + 1)
                .to_owned(),
            TrackerConfig::default().with_max_track_id(u32::MAX).to_owned(),
        ];
        invalid.iter().for_each(|config| {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        });
    }

    #[test]
    fn largest_pool_is_accepted() {
        let mut config = TrackerConfig::default();
        config.with_max_track_id(MAX_TRACK_ID_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserialize_partial_json() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{ "ttl_ms": 500, "max_track_id": 20 }"#).unwrap();
        assert_eq!(config.ttl, Duration::from_millis(500));
        assert_eq!(config.max_track_id, 20);
        assert_eq!(config.base_threshold, 0.75);
    }

    #[test]
    fn serialize_ttl_as_millis() {
        let json = serde_json::to_value(TrackerConfig::default()).unwrap();
        assert_eq!(json["ttl_ms"], 1000);
    }
}
