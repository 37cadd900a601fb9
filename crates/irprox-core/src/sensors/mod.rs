//! Proximity sensor array: registry, fusion, and readings

mod proximity_array;
mod reading;
mod registry;

pub use proximity_array::{DetectionState, ProximityArray};
pub use reading::{NO_DETECTION, Reading, Side};
pub use registry::{MAX_SENSORS, RegistryError, SensorRegistry};
