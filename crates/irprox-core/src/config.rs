use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::gpio::{ActiveLevel, PinId};
use crate::sensors::MAX_SENSORS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to decode config: {0}")]
    Decode(postcard::Error),
    #[error("Failed to encode config: {0}")]
    Encode(postcard::Error),
    #[error("Poll interval must be at least 1 ms")]
    InvalidPollInterval,
}

/// Wiring and polling settings for one proximity array.
///
/// Persisted as postcard bytes so it fits in a flash sector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityConfig {
    /// Sensor pins, left to right. Slots `<= 0` are empty.
    pub pins: [i32; MAX_SENSORS],
    /// How often the scheduler should poll the array.
    pub poll_interval_ms: u32,
    pub active_level: ActiveLevel,
}

impl ProximityConfig {
    pub const DEFAULT_POLL_INTERVAL_MS: u32 = 50;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }

    /// Decodes and validates a stored configuration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }

    /// Configured sensor pins with empty slots removed.
    pub fn sensor_pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.iter().copied().filter_map(PinId::from_slot)
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            pins: [0; MAX_SENSORS],
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            active_level: ActiveLevel::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProximityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensor_pins().count(), 0);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let config = ProximityConfig {
            poll_interval_ms: 0,
            ..ProximityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPollInterval)
        ));
    }

    #[test]
    fn test_sensor_pins_skip_empty_slots() {
        let config = ProximityConfig {
            pins: [4, 0, 5, -2, 6, 0],
            ..ProximityConfig::default()
        };
        let pins: heapless::Vec<u8, 6> = config.sensor_pins().map(PinId::get).collect();
        assert_eq!(pins.as_slice(), &[4, 5, 6]);
    }

    #[test]
    fn test_config_survives_storage() {
        let config = ProximityConfig {
            pins: [12, 13, 14, 15, 0, 0],
            poll_interval_ms: 20,
            active_level: ActiveLevel::High,
        };
        let bytes = config.to_bytes().unwrap();
        assert_eq!(ProximityConfig::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_stored_zero_interval_fails_validation() {
        let config = ProximityConfig {
            poll_interval_ms: 0,
            ..ProximityConfig::default()
        };
        let bytes = config.to_bytes().unwrap();
        assert!(matches!(
            ProximityConfig::from_bytes(&bytes),
            Err(ConfigError::InvalidPollInterval)
        ));
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        assert!(matches!(
            ProximityConfig::from_bytes(&[1, 2]),
            Err(ConfigError::Decode(_))
        ));
    }
}
