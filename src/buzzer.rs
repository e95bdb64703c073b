//! Passive piezo buzzer driven by toggling a GPIO.

use embassy_time::{
    Duration,
    Instant,
    Timer,
};
use esp_hal::gpio::{
    Level,
    Output,
    OutputConfig,
};

use crate::{
    BuzzerResources,
    feedback::Tone,
};

/// Square-wave tone output for the onboard piezo.
pub struct Buzzer {
    pin: Output<'static>,
}

impl From<BuzzerResources<'static>> for Buzzer {
    fn from(res: BuzzerResources<'static>) -> Self {
        Self {
            pin: Output::new(res.pin, Level::Low, OutputConfig::default()),
        }
    }
}

impl Buzzer {
    /// Play a square wave at the tone's pitch for its duration, then go quiet.
    pub async fn play(&mut self, tone: Tone) {
        let hz = tone.pitch.to_Hz().max(1);
        let half_period = Duration::from_micros(500_000 / u64::from(hz));
        let end = Instant::now() + tone.duration;

        while Instant::now() < end {
            self.pin.toggle();
            Timer::after(half_period).await;
        }
        self.off();
    }

    pub fn off(&mut self) {
        self.pin.set_low();
    }
}
