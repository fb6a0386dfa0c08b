//! Frame-unit time
//!
//! Every timer in the simulation counts nominal 60 Hz frames, not seconds.
//! The wall-clock delta the host measures is converted once at the boundary
//! and stays in frame units from there on, so fade rates, recharge timers,
//! and drag all scale uniformly when a frame runs long or short.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Nominal simulation frame rate all durations are expressed against.
pub const FRAMES_PER_SECOND: f32 = 60.0;

/// A duration or countdown measured in nominal frames.
///
/// Wrapping the float keeps seconds and frame units from being mixed by
/// accident; conversion goes through [`Frames::from_secs`] exactly once.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Frames(f32);

impl Frames {
    pub const ZERO: Self = Frames(0.0);

    #[inline]
    pub const fn new(frames: f32) -> Self {
        Frames(frames)
    }

    /// Convert a duration in seconds to frame units.
    #[inline]
    pub fn from_secs(secs: f32) -> Self {
        Frames(secs * FRAMES_PER_SECOND)
    }

    /// Raw frame count, for scaling per-frame quantities.
    #[inline]
    pub const fn get(self) -> f32 {
        self.0
    }

    /// True once a countdown has run out.
    #[inline]
    pub fn expired(self) -> bool {
        self.0 <= 0.0
    }

    /// Countdowns never go negative once observed as expired.
    #[inline]
    pub fn floor_zero(self) -> Self {
        Frames(self.0.max(0.0))
    }
}

impl Add for Frames {
    type Output = Frames;
    fn add(self, rhs: Frames) -> Frames {
        Frames(self.0 + rhs.0)
    }
}

impl Sub for Frames {
    type Output = Frames;
    fn sub(self, rhs: Frames) -> Frames {
        Frames(self.0 - rhs.0)
    }
}

impl AddAssign for Frames {
    fn add_assign(&mut self, rhs: Frames) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Frames {
    fn sub_assign(&mut self, rhs: Frames) {
        self.0 -= rhs.0;
    }
}

impl Mul<f32> for Frames {
    type Output = Frames;
    fn mul(self, rhs: f32) -> Frames {
        Frames(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_conversion() {
        assert_eq!(Frames::from_secs(1.0), Frames::new(60.0));
        assert_eq!(Frames::from_secs(0.25), Frames::new(15.0));
    }

    #[test]
    fn test_countdown() {
        let mut timer = Frames::from_secs(0.5);
        assert!(!timer.expired());
        timer -= Frames::new(30.0);
        assert!(timer.expired());
        timer -= Frames::new(5.0);
        assert_eq!(timer.floor_zero(), Frames::ZERO);
    }
}
