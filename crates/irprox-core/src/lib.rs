//! Hardware-independent core library for irprox
//!
//! This crate turns an arc of up to six binary IR proximity sensors into a
//! single directional reading and reports changes to it as events. It owns
//! the sensor registry, the fusion algorithm, the event types, the GPIO seam
//! and configuration.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod events;
pub mod gpio;
pub mod poll;
pub mod sensors;

pub use config::{ConfigError, ProximityConfig};
pub use events::{EventKind, EventSink, ProximityEvent};
pub use gpio::{ActiveLevel, GpioBank, InputPinBank, PinId};
pub use poll::Pollable;
pub use sensors::{
    DetectionState, MAX_SENSORS, NO_DETECTION, ProximityArray, Reading, RegistryError, Side,
};
