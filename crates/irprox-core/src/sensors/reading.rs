//! Directional readings produced by the proximity array

use core::fmt;

/// Raw sentinel value reported when no sensor is triggered.
pub const NO_DETECTION: f32 = -99.0;

/// A normalized directional estimate.
///
/// Either a value in `[-1.0, +1.0]` (negative is left, positive is right,
/// zero is straight ahead) or [`Reading::NO_DETECTION`]. Equality is exact
/// `f32` equality, which is what change detection relies on.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Reading(f32);

impl Reading {
    /// Nothing was detected.
    pub const NO_DETECTION: Self = Self(NO_DETECTION);
    /// Obstacle at the left-most sensor.
    pub const FAR_LEFT: Self = Self(-1.0);
    /// Obstacle straight ahead.
    pub const AHEAD: Self = Self(0.0);
    /// Obstacle at the right-most sensor.
    pub const FAR_RIGHT: Self = Self(1.0);

    pub(crate) const fn new(raw: f32) -> Self {
        Self(raw)
    }

    /// Validates a raw value received from elsewhere, e.g. an event payload
    /// that went through a serial link.
    pub fn from_raw(raw: f32) -> Option<Self> {
        if raw == NO_DETECTION || (-1.0..=1.0).contains(&raw) {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw value, sentinel included.
    pub const fn raw(self) -> f32 {
        self.0
    }

    pub fn is_detection(self) -> bool {
        self.0 != NO_DETECTION
    }

    /// The directional value, or `None` when nothing was detected.
    pub fn value(self) -> Option<f32> {
        self.is_detection().then_some(self.0)
    }

    /// Converts the reading to a bearing in degrees for an arc spanning
    /// `arc_degrees`, with the outermost sensors at `±arc_degrees / 2`.
    ///
    /// Only meaningful when the sensors are spaced evenly over the arc.
    pub fn bearing_degrees(self, arc_degrees: f32) -> Option<f32> {
        self.value().map(|v| v * arc_degrees / 2.0)
    }

    /// Coarse side of the detection. Values within `±dead_zone` count as ahead.
    pub fn side(self, dead_zone: f32) -> Option<Side> {
        self.value().map(|v| {
            if v < -dead_zone {
                Side::Left
            } else if v > dead_zone {
                Side::Right
            } else {
                Side::Ahead
            }
        })
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::NO_DETECTION
    }
}

impl From<Reading> for f32 {
    fn from(reading: Reading) -> Self {
        reading.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{:+.3}", v),
            None => f.write_str("none"),
        }
    }
}

/// Coarse direction of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Ahead,
    Right,
}

impl Side {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Ahead => "ahead",
            Self::Right => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_detection() {
        assert_eq!(Reading::default(), Reading::NO_DETECTION);
        assert!(!Reading::NO_DETECTION.is_detection());
        assert_eq!(Reading::NO_DETECTION.value(), None);
        assert_eq!(f32::from(Reading::NO_DETECTION), -99.0);
    }

    #[test]
    fn test_from_raw_accepts_range_and_sentinel() {
        assert_eq!(Reading::from_raw(-1.0), Some(Reading::FAR_LEFT));
        assert_eq!(Reading::from_raw(0.25).map(Reading::raw), Some(0.25));
        assert_eq!(Reading::from_raw(-99.0), Some(Reading::NO_DETECTION));
        assert_eq!(Reading::from_raw(1.5), None);
        assert_eq!(Reading::from_raw(-50.0), None);
        assert_eq!(Reading::from_raw(f32::NAN), None);
    }

    #[test]
    fn test_bearing_over_arc() {
        assert_eq!(Reading::FAR_LEFT.bearing_degrees(180.0), Some(-90.0));
        assert_eq!(Reading::AHEAD.bearing_degrees(180.0), Some(0.0));
        assert_eq!(Reading::new(0.5).bearing_degrees(120.0), Some(30.0));
        assert_eq!(Reading::NO_DETECTION.bearing_degrees(180.0), None);
    }

    #[test]
    fn test_side_with_dead_zone() {
        assert_eq!(Reading::new(-0.6).side(0.2), Some(Side::Left));
        assert_eq!(Reading::new(0.1).side(0.2), Some(Side::Ahead));
        assert_eq!(Reading::new(-0.2).side(0.2), Some(Side::Ahead));
        assert_eq!(Reading::FAR_RIGHT.side(0.2), Some(Side::Right));
        assert_eq!(Reading::NO_DETECTION.side(0.2), None);
        assert_eq!(Side::Right.label(), "right");
    }
}
