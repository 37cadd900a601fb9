use log::{debug, info, warn};

use super::reading::Reading;
use super::registry::{MAX_SENSORS, RegistryError, SensorRegistry};
use crate::config::ProximityConfig;
use crate::events::{EventKind, EventSink, ProximityEvent};
use crate::gpio::{ActiveLevel, GpioBank, PinId};
use crate::poll::Pollable;

/// Detection state tracked between poll cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionState {
    NoDetection,
    Detecting(Reading),
}

impl From<Reading> for DetectionState {
    fn from(reading: Reading) -> Self {
        if reading.is_detection() {
            Self::Detecting(reading)
        } else {
            Self::NoDetection
        }
    }
}

/// An arc of up to six IR proximity sensors reporting the direction of an
/// obstacle.
///
/// The classic use is a robot's obstacle detector, with the sensors arranged
/// left to right in an arc facing forward. [`read`](Self::read) fuses the
/// triggered sensors into a single [`Reading`]: the average weight of every
/// triggered sensor, so simultaneous detections blend toward their centre.
///
/// [`poll`](Self::poll) is meant to be called by a scheduler. It publishes a
/// [`ProximityEvent`] to the sink only when the reading changes.
///
/// ## Usage
///
/// ```rust,ignore
/// static CHANNEL: ProximityChannel<CriticalSectionRawMutex> = PubSubChannel::new();
///
/// let publisher = CHANNEL.publisher().unwrap();
/// let mut array = ProximityArray::with_pins(gpio, publisher, [4, 5, 6, 0, 0, 0]);
///
/// loop {
///     array.poll();
///     ticker.next().await;
/// }
/// ```
pub struct ProximityArray<G, S> {
    registry: SensorRegistry,
    gpio: G,
    sink: S,
    kind: EventKind,
    active_level: ActiveLevel,
    /// The last reading published
    last_reading: Reading,
}

impl<G, S> ProximityArray<G, S>
where
    G: GpioBank,
    S: EventSink<ProximityEvent>,
{
    /// Creates an array with no sensors.
    pub fn new(gpio: G, sink: S) -> Self {
        Self {
            registry: SensorRegistry::new(),
            gpio,
            sink,
            kind: EventKind::proximity(),
            active_level: ActiveLevel::Low,
            last_reading: Reading::NO_DETECTION,
        }
    }

    /// Creates an array from positional pin slots, left to right.
    ///
    /// Slots `<= 0` mean "no sensor here" and are skipped.
    pub fn with_pins(gpio: G, sink: S, slots: [i32; MAX_SENSORS]) -> Self {
        let mut array = Self::new(gpio, sink);
        for raw in slots {
            match PinId::from_slot(raw) {
                // Failures are already logged by add_sensor
                Some(pin) => {
                    let _ = array.add_sensor(pin);
                }
                None if raw > 0 => warn!("Ignoring pin slot {}: not a GPIO line", raw),
                None => {}
            }
        }
        info!(
            "ProximityArray ready with {} sensors (delta={})",
            array.registry.len(),
            array.registry.delta()
        );
        array
    }

    /// Creates an array from a loaded configuration.
    pub fn from_config(gpio: G, sink: S, config: &ProximityConfig) -> Self {
        Self::with_pins(gpio, sink, config.pins).with_active_level(config.active_level)
    }

    /// Sets which line level counts as triggered.
    pub fn with_active_level(mut self, level: ActiveLevel) -> Self {
        self.active_level = level;
        self
    }

    /// Adds a sensor on `pin` to the right of those already registered and
    /// configures the line as an input.
    ///
    /// Sensors must be added in left-to-right order for readings to make
    /// sense. Returns the sensor's index, or an error if the array is full or
    /// the pin is already used; the array is unchanged on error.
    pub fn add_sensor(&mut self, pin: PinId) -> Result<usize, RegistryError> {
        let index = self.registry.push(pin).map_err(|e| {
            warn!("AddSensor => pin={} rejected: {}", pin, e);
            e
        })?;
        self.gpio.set_input_mode(pin);

        debug!("AddSensor => IR sensor[{}] added on pin={}", index, pin);

        Ok(index)
    }

    /// Takes a reading without affecting change detection.
    ///
    /// Returns the average weight of all triggered sensors, or
    /// [`Reading::NO_DETECTION`] when none are triggered (always the case
    /// with no sensors registered).
    pub fn read(&mut self) -> Reading {
        let mut sum = 0.0_f32;
        let mut triggered = 0_u8;

        for (index, &pin) in self.registry.pins().iter().enumerate() {
            if self.active_level.is_triggered(self.gpio.read_digital(pin)) {
                triggered += 1;
                sum += self.registry.weight(index);
            }
        }

        if triggered > 0 {
            Reading::new(sum / f32::from(triggered))
        } else {
            Reading::NO_DETECTION
        }
    }

    /// Takes a reading and publishes it if it differs from the last one.
    ///
    /// Returns the published event, if any.
    pub fn poll(&mut self) -> Option<ProximityEvent> {
        let reading = self.read();

        if reading == self.last_reading {
            return None;
        }

        debug!(
            "Poll => reading={}, last_reading={}",
            reading, self.last_reading
        );

        self.last_reading = reading;
        let event = ProximityEvent {
            kind: self.kind,
            reading,
        };
        self.sink.publish(event);

        Some(event)
    }

    /// Forgets the last reading so the next detection is reported fresh.
    ///
    /// Publishes nothing. If the next poll also sees nothing, it stays quiet.
    pub fn reset(&mut self) {
        self.last_reading = Reading::NO_DETECTION;
    }

    /// The last published reading.
    pub fn last_reading(&self) -> Reading {
        self.last_reading
    }

    pub fn state(&self) -> DetectionState {
        self.last_reading.into()
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.active_level
    }

    /// Kind carried by the events this array publishes.
    pub fn event_kind(&self) -> EventKind {
        self.kind
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<G, S> Pollable for ProximityArray<G, S>
where
    G: GpioBank,
    S: EventSink<ProximityEvent>,
{
    fn poll(&mut self) {
        let _ = ProximityArray::poll(self);
    }
}
