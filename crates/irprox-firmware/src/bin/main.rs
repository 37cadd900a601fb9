#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::PubSubChannel;
use embassy_time::{Duration, Ticker};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{AnyPin, Input, InputConfig, Pull};
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};

use irprox_core::events::ProximityChannel;
use irprox_core::{ActiveLevel, InputPinBank, MAX_SENSORS, ProximityArray, ProximityConfig};

/// Angle covered by the sensor arc on the robot's front bumper.
const ARC_DEGREES: f32 = 120.0;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Global pub-sub channel for proximity events
static PROXIMITY_CHANNEL: ProximityChannel<CriticalSectionRawMutex> = PubSubChannel::new();

type SensorBank = InputPinBank<Input<'static>, MAX_SENSORS>;

/// Parses the comma separated pin list baked in by the build script.
fn parse_pins(raw: &str) -> [i32; MAX_SENSORS] {
    let mut pins = [0; MAX_SENSORS];
    for (slot, value) in pins.iter_mut().zip(raw.split(',')) {
        *slot = value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring pin entry {:?} in IRPROX_PINS", value);
            0
        });
    }
    pins
}

fn load_config() -> ProximityConfig {
    let config = ProximityConfig {
        pins: parse_pins(env!("IRPROX_PINS")),
        poll_interval_ms: env!("IRPROX_POLL_MS")
            .parse()
            .unwrap_or(ProximityConfig::DEFAULT_POLL_INTERVAL_MS),
        active_level: if env!("IRPROX_ACTIVE_HIGH") == "true" {
            ActiveLevel::High
        } else {
            ActiveLevel::Low
        },
    };

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            error!("Invalid proximity config ({}), using default poll interval", e);
            ProximityConfig {
                poll_interval_ms: ProximityConfig::DEFAULT_POLL_INTERVAL_MS,
                ..config
            }
        }
    }
}

/// Claims each configured GPIO as a pulled input.
fn build_bank(config: &ProximityConfig) -> SensorBank {
    // Pull toward the idle level so a disconnected sensor never triggers
    let pull = match config.active_level {
        ActiveLevel::Low => Pull::Up,
        ActiveLevel::High => Pull::Down,
    };

    let mut bank = SensorBank::new();
    for pin in config.sensor_pins() {
        // SAFETY: every sensor pin is claimed exactly once, here, and no other
        // driver in this firmware touches it.
        let line = unsafe { AnyPin::steal(pin.get()) };
        let input = Input::new(line, InputConfig::default().with_pull(pull));
        if bank.insert(pin, input).is_err() {
            warn!("Pin {} listed twice in IRPROX_PINS, ignoring", pin);
        }
    }
    bank
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // irprox-core links alloc for config persistence
    esp_alloc::heap_allocator!(size: 16 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let proximity_config = load_config();
    let bank = build_bank(&proximity_config);

    let mut subscriber = PROXIMITY_CHANNEL
        .subscriber()
        .expect("Failed to create subscriber");
    let publisher = PROXIMITY_CHANNEL
        .publisher()
        .expect("Failed to create publisher");

    let mut array = ProximityArray::from_config(bank, publisher, &proximity_config);
    info!(
        "Proximity array: {} sensors, polling every {} ms",
        array.registry().len(),
        proximity_config.poll_interval_ms
    );

    // Everything runs in main; nothing else to spawn yet
    let _ = spawner;

    let mut ticker = Ticker::every(Duration::from_millis(
        proximity_config.poll_interval_ms.into(),
    ));

    loop {
        array.poll();

        while let Some(event) = subscriber.try_next_message_pure() {
            match event.reading.bearing_degrees(ARC_DEGREES) {
                Some(bearing) => info!("Obstacle at {:+.0} deg ({})", bearing, event.reading),
                None => info!("Obstacle cleared"),
            }
        }

        ticker.next().await;
    }
}
