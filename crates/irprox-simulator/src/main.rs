//! Desktop simulator for the irprox directional IR proximity array.
//!
//! Drives an [`irprox_core::ProximityArray`] with a simulated obstacle that
//! sweeps back and forth in front of a five-sensor arc, and logs every
//! proximity event delivered through the pub-sub channel.
//!
//! The obstacle swings past both ends of the arc and periodically disappears,
//! so the log shows single-sensor hits, blended two-sensor readings, and
//! transitions to and from "no detection".
//!
//! Run with `RUST_LOG=debug` to also see the array's own poll logging.

use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::PubSubChannel;
use embedded_hal::digital::PinState;
use log::{debug, error, info, warn};

use irprox_core::events::ProximityChannel;
use irprox_core::{
    GpioBank, MAX_SENSORS, PinId, Pollable, ProximityArray, ProximityConfig, ProximityEvent,
};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Pins of the simulated sensors, left to right.
const SENSOR_PINS: [i32; MAX_SENSORS] = [2, 3, 4, 5, 6, 0];

/// Angle covered by the sensor arc; outer sensors face `±ARC_DEGREES / 2`.
const ARC_DEGREES: f32 = 120.0;

/// Half-width of each sensor's detection cone. Wider than half the sensor
/// spacing, so neighbouring sensors overlap.
const SENSOR_HALF_FOV_DEG: f32 = 20.0;

/// Readings within this distance of zero are reported as "ahead".
const AHEAD_DEAD_ZONE: f32 = 0.2;

/// Total simulated run time.
const SIMULATION_DURATION: Duration = Duration::from_secs(30);

/// Interval between forced resets of the array.
const RESET_INTERVAL: Duration = Duration::from_secs(10);

/// Global pub-sub channel for proximity events
static PROXIMITY_CHANNEL: ProximityChannel<CriticalSectionRawMutex> = PubSubChannel::new();

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// One IR sensor in the simulated arc.
struct SimulatedSensor {
    pin: PinId,
    /// Direction the sensor faces, in degrees (negative is left).
    facing_deg: f32,
    configured: bool,
}

/// GPIO bank whose lines go low when the obstacle is inside a sensor's cone.
struct SimulatedBank {
    sensors: Vec<SimulatedSensor>,
    /// Bearing of the obstacle in degrees, `None` when out of range.
    obstacle: Option<f32>,
}

impl SimulatedBank {
    /// Spreads the configured sensors evenly over the arc.
    fn new(config: &ProximityConfig, arc_degrees: f32) -> Self {
        let pins: Vec<PinId> = config.sensor_pins().collect();
        let spacing = arc_degrees / (pins.len().saturating_sub(1).max(1)) as f32;
        let first = if pins.len() > 1 { -arc_degrees / 2.0 } else { 0.0 };

        let sensors = pins
            .into_iter()
            .enumerate()
            .map(|(i, pin)| SimulatedSensor {
                pin,
                facing_deg: first + i as f32 * spacing,
                configured: false,
            })
            .collect();

        Self {
            sensors,
            obstacle: None,
        }
    }

    fn sensor_mut(&mut self, pin: PinId) -> Option<&mut SimulatedSensor> {
        self.sensors.iter_mut().find(|s| s.pin == pin)
    }
}

impl GpioBank for SimulatedBank {
    fn set_input_mode(&mut self, pin: PinId) {
        match self.sensor_mut(pin) {
            Some(sensor) => {
                sensor.configured = true;
                debug!("Pin {} facing {:+.0}° set to input", pin, sensor.facing_deg);
            }
            None => warn!("Pin {} has no simulated sensor", pin),
        }
    }

    fn read_digital(&mut self, pin: PinId) -> PinState {
        let obstacle = self.obstacle;
        let triggered = match (self.sensor_mut(pin), obstacle) {
            (Some(sensor), Some(bearing)) if sensor.configured => {
                (bearing - sensor.facing_deg).abs() <= SENSOR_HALF_FOV_DEG
            }
            _ => false,
        };

        if triggered {
            PinState::Low
        } else {
            PinState::High
        }
    }
}

// ---------------------------------------------------------------------------
// Mock obstacle generation
// ---------------------------------------------------------------------------

/// Moves a synthetic obstacle across the front of the robot.
struct MockObstacle {
    elapsed_secs: f64,
}

impl MockObstacle {
    fn new() -> Self {
        Self { elapsed_secs: 0.0 }
    }

    /// Advance the internal clock and return the obstacle bearing, if visible.
    fn next_bearing(&mut self, dt_secs: f64) -> Option<f32> {
        self.elapsed_secs += dt_secs;
        let t = self.elapsed_secs;

        // Sweep ±80°, a little past the outer sensors' cones
        let bearing = 80.0 * (t / 3.0).sin();

        // Out of range roughly a third of the time
        let visible = (t / 7.0).cos() > -0.5;

        visible.then_some(bearing as f32)
    }
}

fn report(event: &ProximityEvent) {
    let reading = event.reading;
    match (
        reading.bearing_degrees(ARC_DEGREES),
        reading.side(AHEAD_DEAD_ZONE),
    ) {
        (Some(bearing), Some(side)) => info!(
            "[kind {}] Obstacle {} at {:+.0}° (reading {})",
            event.kind.id(),
            side.label(),
            bearing,
            reading
        ),
        _ => info!("[kind {}] Obstacle cleared", event.kind.id()),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting irprox simulator");

    let config = ProximityConfig {
        pins: SENSOR_PINS,
        ..ProximityConfig::default()
    };
    if let Err(e) = config.validate() {
        error!("Invalid simulator config: {}", e);
        return;
    }

    let mut subscriber = match PROXIMITY_CHANNEL.subscriber() {
        Ok(subscriber) => subscriber,
        Err(e) => {
            error!("Failed to subscribe to proximity events: {:?}", e);
            return;
        }
    };
    let publisher = match PROXIMITY_CHANNEL.publisher() {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("Failed to create proximity publisher: {:?}", e);
            return;
        }
    };

    let bank = SimulatedBank::new(&config, ARC_DEGREES);
    let mut array = ProximityArray::from_config(bank, publisher, &config);
    info!(
        "Arc: {} sensors over {}°, polling every {} ms",
        array.registry().len(),
        ARC_DEGREES,
        config.poll_interval_ms
    );

    let mut obstacle = MockObstacle::new();
    let poll_interval = Duration::from_millis(config.poll_interval_ms.into());
    let start = Instant::now();
    let mut last_reset = start;

    // -----------------------------------------------------------------------
    // Poll loop: stands in for the firmware's ticker
    // -----------------------------------------------------------------------
    while start.elapsed() < SIMULATION_DURATION {
        let cycle_start = Instant::now();

        array.gpio_mut().obstacle = obstacle.next_bearing(poll_interval.as_secs_f64());

        let component: &mut dyn Pollable = &mut array;
        component.poll();

        while let Some(event) = subscriber.try_next_message_pure() {
            report(&event);
        }

        if last_reset.elapsed() >= RESET_INTERVAL {
            info!("Resetting array (last reading {})", array.last_reading());
            array.reset();
            last_reset = Instant::now();
        }

        // --- Cycle pacing -------------------------------------------------
        let elapsed = cycle_start.elapsed();
        if elapsed < poll_interval {
            std::thread::sleep(poll_interval - elapsed);
        }
    }

    info!("Simulator exiting");
}
