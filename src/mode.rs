//! Effect modes and their frame timing.

use embassy_time::Duration;

/// Frame interval for the static pattern modes.
pub const PATTERN_FRAME: Duration = Duration::from_millis(100);
/// Frame interval while sampling the accelerometer.
pub const MOTION_FRAME: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectMode {
    #[default]
    Rainbow,
    Fillup,
    Shake,
}

impl EffectMode {
    pub const ALL: [Self; 3] = [Self::Rainbow, Self::Fillup, Self::Shake];

    /// Cyclic successor: Rainbow → Fillup → Shake → Rainbow.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Rainbow => Self::Fillup,
            Self::Fillup => Self::Shake,
            Self::Shake => Self::Rainbow,
        }
    }

    pub const fn frame_interval(self) -> Duration {
        match self {
            Self::Rainbow | Self::Fillup => PATTERN_FRAME,
            Self::Shake => MOTION_FRAME,
        }
    }
}
