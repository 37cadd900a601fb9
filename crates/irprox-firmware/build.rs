//! Bakes the proximity array wiring from `.env` into the firmware image.
//!
//! Recognised keys (all optional):
//! - `IRPROX_PINS`: comma separated GPIO numbers, left to right, `0` for an empty slot
//! - `IRPROX_POLL_MS`: poll interval in milliseconds
//! - `IRPROX_ACTIVE_HIGH`: `true` if the sensors drive their output high on detection

const SETTINGS: [(&str, &str); 3] = [
    ("IRPROX_PINS", "4,5,6,7,15,0"),
    ("IRPROX_POLL_MS", "50"),
    ("IRPROX_ACTIVE_HIGH", "false"),
];

fn main() {
    // No .env just means defaults
    let _ = dotenvy::dotenv();
    println!("cargo:rerun-if-changed=.env");

    for (key, default) in SETTINGS {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={key}={value}");
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
