use heapless::Vec;
use thiserror_no_std::Error;

use crate::gpio::PinId;

/// Maximum number of proximity sensors in one array.
pub const MAX_SENSORS: usize = 6;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Sensor array is full ({capacity} sensors)")]
    Full { capacity: usize },
    #[error("Pin {pin} is already registered at index {index}")]
    DuplicatePin { pin: PinId, index: usize },
}

/// Ordered, append-only set of sensor pins.
///
/// Index 0 is the left-most sensor. Each sensor maps to a weight evenly
/// spaced over `[-1, +1]`:
///
/// ```text
/// 5 sensors => 4 gaps => delta = 2 / 4 = 0.5
///
/// index:   0     1     2     3     4
/// weight: -1.0  -0.5   0.0  +0.5  +1.0
/// ```
///
/// The span of 2 is the width of the `[-1, +1]` output range. With 0 or 1
/// sensors the gap count is clamped to 1 so `delta` stays finite.
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    pins: Vec<PinId, MAX_SENSORS>,
    delta: f32,
}

impl SensorRegistry {
    pub const fn new() -> Self {
        Self {
            pins: Vec::new(),
            delta: 2.0,
        }
    }

    /// Appends `pin` as the next sensor to the right and returns its index.
    ///
    /// Sensors must be added in physical left-to-right order. This cannot be
    /// checked here; a misordered array still produces readings in range, they
    /// just point the wrong way.
    pub fn push(&mut self, pin: PinId) -> Result<usize, RegistryError> {
        if self.is_full() {
            return Err(RegistryError::Full {
                capacity: MAX_SENSORS,
            });
        }
        if let Some(index) = self.index_of(pin) {
            return Err(RegistryError::DuplicatePin { pin, index });
        }

        let index = self.pins.len();
        self.pins.push(pin).map_err(|_| RegistryError::Full {
            capacity: MAX_SENSORS,
        })?;
        self.delta = Self::delta_for(self.pins.len());

        Ok(index)
    }

    /// Normalization step for an array of `count` sensors.
    pub fn delta_for(count: usize) -> f32 {
        let gaps = count.saturating_sub(1).max(1);
        2.0 / gaps as f32
    }

    /// Reading distance between adjacent sensors.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Directional weight of the sensor at `index`.
    pub fn weight(&self, index: usize) -> f32 {
        index as f32 * self.delta - 1.0
    }

    pub fn index_of(&self, pin: PinId) -> Option<usize> {
        self.pins.iter().position(|p| *p == pin)
    }

    /// Registered pins, left to right.
    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pins.len() == MAX_SENSORS
    }

    pub const fn capacity(&self) -> usize {
        MAX_SENSORS
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(n: u8) -> PinId {
        PinId::new(n).unwrap()
    }

    fn registry_with(count: u8) -> SensorRegistry {
        let mut registry = SensorRegistry::new();
        for n in 1..=count {
            registry.push(pin(n)).unwrap();
        }
        registry
    }

    #[test]
    fn test_delta_for_each_count() {
        assert_eq!(SensorRegistry::delta_for(0), 2.0);
        assert_eq!(SensorRegistry::delta_for(1), 2.0);
        assert_eq!(SensorRegistry::delta_for(2), 2.0);
        assert_eq!(SensorRegistry::delta_for(3), 1.0);
        assert_eq!(SensorRegistry::delta_for(5), 0.5);
        assert_eq!(SensorRegistry::delta_for(4), 2.0 / 3.0);
        assert_eq!(SensorRegistry::delta_for(6), 0.4);
    }

    #[test]
    fn test_outer_weights_are_exact() {
        for n in 1..=MAX_SENSORS as u8 {
            let registry = registry_with(n);
            assert_eq!(registry.delta(), SensorRegistry::delta_for(n as usize));
            assert_eq!(registry.weight(0), -1.0, "left weight for {} sensors", n);
            if n > 1 {
                assert_eq!(
                    registry.weight(n as usize - 1),
                    1.0,
                    "right weight for {} sensors",
                    n
                );
            }
        }
    }

    #[test]
    fn test_three_sensor_weights() {
        let registry = registry_with(3);
        assert_eq!(registry.delta(), 1.0);
        assert_eq!(registry.weight(0), -1.0);
        assert_eq!(registry.weight(1), 0.0);
        assert_eq!(registry.weight(2), 1.0);
    }

    #[test]
    fn test_push_returns_index_in_order() {
        let mut registry = SensorRegistry::new();
        assert_eq!(registry.push(pin(8)), Ok(0));
        assert_eq!(registry.push(pin(3)), Ok(1));
        assert_eq!(registry.pins(), &[pin(8), pin(3)]);
        assert_eq!(registry.index_of(pin(3)), Some(1));
    }

    #[test]
    fn test_seventh_sensor_is_rejected() {
        let mut registry = registry_with(6);
        assert!(registry.is_full());

        let delta = registry.delta();
        assert_eq!(
            registry.push(pin(7)),
            Err(RegistryError::Full { capacity: 6 })
        );
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.delta(), delta);
    }

    #[test]
    fn test_duplicate_pin_is_rejected() {
        let mut registry = registry_with(2);
        assert_eq!(
            registry.push(pin(2)),
            Err(RegistryError::DuplicatePin {
                pin: pin(2),
                index: 1
            })
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.delta(), 2.0);
    }
}
