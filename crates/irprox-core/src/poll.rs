//! Scheduler seam

/// A component driven by periodic polling.
///
/// The scheduler owns the cadence. Implementations do their work
/// synchronously and return; they must not block or be re-entered.
pub trait Pollable {
    fn poll(&mut self);
}

impl<P: Pollable + ?Sized> Pollable for &mut P {
    fn poll(&mut self) {
        (**self).poll()
    }
}
