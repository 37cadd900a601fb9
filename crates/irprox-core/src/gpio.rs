//! GPIO seam for the proximity array
//!
//! The array addresses its sensors by pin number, the way a board's wiring
//! diagram does. [`GpioBank`] is the pin-addressed view the estimator reads
//! through, and [`InputPinBank`] adapts a fixed set of `embedded-hal` input
//! pins to it so any HAL can be plugged in.

use core::convert::Infallible;
use core::fmt;
use core::num::NonZeroU8;

use embedded_hal::digital::{InputPin, PinState};
use heapless::Vec;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Identifier of the GPIO line a sensor is wired to.
///
/// Pin `0` is reserved as "no sensor" and cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(NonZeroU8);

impl PinId {
    /// Creates a pin identifier, returning `None` for pin `0`.
    pub const fn new(pin: u8) -> Option<Self> {
        match NonZeroU8::new(pin) {
            Some(pin) => Some(Self(pin)),
            None => None,
        }
    }

    /// Interprets a positional constructor slot.
    ///
    /// Values `<= 0` mean "no sensor at this slot". Values above 255 do not
    /// name a GPIO line either and are also treated as empty.
    pub fn from_slot(raw: i32) -> Option<Self> {
        u8::try_from(raw).ok().and_then(Self::new)
    }

    /// The raw pin number.
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Line level that counts as "obstacle detected".
///
/// Most IR obstacle modules pull their output low on detection.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    #[default]
    Low,
    High,
}

impl ActiveLevel {
    /// Whether a line in `state` is triggered at this active level.
    pub fn is_triggered(self, state: PinState) -> bool {
        state == PinState::from(self)
    }
}

impl From<ActiveLevel> for PinState {
    fn from(level: ActiveLevel) -> Self {
        match level {
            ActiveLevel::Low => PinState::Low,
            ActiveLevel::High => PinState::High,
        }
    }
}

/// Pin-addressed digital inputs.
///
/// Reads are infallible: the proximity array has no failure path for a
/// hardware read, so implementations must resolve errors themselves.
pub trait GpioBank {
    /// Configures `pin` as a digital input. Called once per sensor at registration.
    fn set_input_mode(&mut self, pin: PinId);

    /// Samples the current level of `pin`.
    fn read_digital(&mut self, pin: PinId) -> PinState;
}

impl<G: GpioBank + ?Sized> GpioBank for &mut G {
    fn set_input_mode(&mut self, pin: PinId) {
        (**self).set_input_mode(pin)
    }

    fn read_digital(&mut self, pin: PinId) -> PinState {
        (**self).read_digital(pin)
    }
}

/// [`GpioBank`] over a fixed set of `embedded-hal` input pins.
///
/// HAL input types are already in input mode when constructed, so
/// [`GpioBank::set_input_mode`] only checks that the line is wired. A pin
/// that was never inserted reads as [`PinState::High`], the released level
/// of a pulled-up line.
pub struct InputPinBank<P, const N: usize> {
    pins: Vec<(PinId, P), N>,
}

impl<P, const N: usize> InputPinBank<P, N>
where
    P: InputPin<Error = Infallible>,
{
    pub const fn new() -> Self {
        Self { pins: Vec::new() }
    }

    /// Wires `input` as `pin`. Hands the input back if the bank is full or
    /// the pin is already wired.
    pub fn insert(&mut self, pin: PinId, input: P) -> Result<(), P> {
        if self.contains(pin) {
            return Err(input);
        }
        self.pins.push((pin, input)).map_err(|(_, input)| input)
    }

    pub fn contains(&self, pin: PinId) -> bool {
        self.pins.iter().any(|(id, _)| *id == pin)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<P, const N: usize> Default for InputPinBank<P, N>
where
    P: InputPin<Error = Infallible>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: usize> GpioBank for InputPinBank<P, N>
where
    P: InputPin<Error = Infallible>,
{
    fn set_input_mode(&mut self, pin: PinId) {
        if self.contains(pin) {
            debug!("InputPinBank: pin {} ready as input", pin);
        } else {
            warn!("InputPinBank: pin {} is not wired, it will never trigger", pin);
        }
    }

    fn read_digital(&mut self, pin: PinId) -> PinState {
        let Some((_, input)) = self.pins.iter_mut().find(|(id, _)| *id == pin) else {
            return PinState::High;
        };

        match input.is_low() {
            Ok(true) => PinState::Low,
            Ok(false) => PinState::High,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;

    struct FakePin {
        low: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low)
        }
    }

    fn pin(n: u8) -> PinId {
        PinId::new(n).unwrap()
    }

    #[test]
    fn test_pin_zero_is_not_a_pin() {
        assert!(PinId::new(0).is_none());
        assert_eq!(PinId::new(7).map(PinId::get), Some(7));
    }

    #[test]
    fn test_slot_values_at_or_below_zero_are_empty() {
        assert!(PinId::from_slot(0).is_none());
        assert!(PinId::from_slot(-3).is_none());
        assert!(PinId::from_slot(256).is_none());
        assert_eq!(PinId::from_slot(12), Some(pin(12)));
    }

    #[test]
    fn test_active_level() {
        assert!(ActiveLevel::Low.is_triggered(PinState::Low));
        assert!(!ActiveLevel::Low.is_triggered(PinState::High));
        assert!(ActiveLevel::High.is_triggered(PinState::High));
        assert_eq!(ActiveLevel::default(), ActiveLevel::Low);
    }

    #[test]
    fn test_input_pin_bank_reads_wired_pins() {
        let mut bank: InputPinBank<FakePin, 4> = InputPinBank::new();
        assert!(bank.insert(pin(3), FakePin { low: true }).is_ok());
        assert!(bank.insert(pin(4), FakePin { low: false }).is_ok());

        assert_eq!(bank.read_digital(pin(3)), PinState::Low);
        assert_eq!(bank.read_digital(pin(4)), PinState::High);
        // Unwired lines read as released.
        assert_eq!(bank.read_digital(pin(9)), PinState::High);
    }

    #[test]
    fn test_input_pin_bank_rejects_duplicates_and_overflow() {
        let mut bank: InputPinBank<FakePin, 2> = InputPinBank::new();
        assert!(bank.insert(pin(1), FakePin { low: false }).is_ok());
        assert!(bank.insert(pin(1), FakePin { low: true }).is_err());
        assert!(bank.insert(pin(2), FakePin { low: false }).is_ok());
        assert!(bank.insert(pin(3), FakePin { low: false }).is_err());
        assert_eq!(bank.len(), 2);
    }
}
