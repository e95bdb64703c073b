//! Status-array colors and buzzer tones for the shake mode.

use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Sender};
use embassy_time::Duration;
use fugit::HertzU32;
use palette::Srgb;

use crate::motion::{Classification, MotionEvent, MotionState};

pub const GREEN: Srgb<u8> = Srgb::new(0, 255, 0);
pub const ORANGE: Srgb<u8> = Srgb::new(255, 165, 0);
pub const RED: Srgb<u8> = Srgb::new(255, 0, 0);
pub const OFF: Srgb<u8> = Srgb::new(0, 0, 0);

/// Red/off pairs shown when a shake is detected.
pub const BLINK_PAIRS: u8 = 3;
/// Classifier ticks each blink frame stays on the array.
pub const BLINK_FRAME_TICKS: u8 = 3;

const BLINK_TOTAL_TICKS: u8 = BLINK_PAIRS * 2 * BLINK_FRAME_TICKS;

/// Capacity of the tone queue between the control loop and the buzzer task.
pub const TONE_QUEUE_DEPTH: usize = 4;

/// A tone request for the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    pub pitch: HertzU32,
    pub duration: Duration,
}

impl Tone {
    /// Low tone played when a shake is detected.
    pub const BLEEP: Self = Self {
        pitch: HertzU32::from_raw(262),
        duration: Duration::from_millis(200),
    };

    /// Short high tone played when the shake hold runs out.
    pub const BLIP: Self = Self {
        pitch: HertzU32::from_raw(2093),
        duration: Duration::from_millis(40),
    };
}

/// Fire-and-forget tone output. Implementations must never block.
pub trait ToneSink {
    fn play(&mut self, tone: Tone);
}

impl<M: RawMutex, const N: usize> ToneSink for Sender<'_, M, Tone, N> {
    fn play(&mut self, tone: Tone) {
        if self.try_send(tone).is_err() {
            warn!("tone queue full, dropping {}", tone);
        }
    }
}

impl<T: ToneSink + ?Sized> ToneSink for &mut T {
    fn play(&mut self, tone: Tone) {
        (**self).play(tone);
    }
}

/// Color for a classified motion state.
pub const fn state_color(state: MotionState) -> Srgb<u8> {
    match state {
        MotionState::Normal => GREEN,
        MotionState::Movement => ORANGE,
        MotionState::Shake => RED,
    }
}

/// Drives the status array from classifier output.
#[derive(Debug, Clone, Default)]
pub struct StatusLights {
    /// Ticks left in the blink sequence; counts down to zero.
    blink: u8,
}

impl StatusLights {
    pub const fn new() -> Self {
        Self { blink: 0 }
    }

    pub const fn is_blinking(&self) -> bool {
        self.blink > 0
    }

    /// Shake-entry feedback: restart the blink sequence and bleep.
    pub fn flash(&mut self, tones: &mut impl ToneSink) {
        self.blink = BLINK_TOTAL_TICKS;
        tones.play(Tone::BLEEP);
    }

    /// Turn classifier output into a frame on `buf` and any tones.
    pub fn dispatch(
        &mut self,
        classification: Classification,
        buf: &mut [Srgb<u8>],
        tones: &mut impl ToneSink,
    ) {
        match classification.event {
            Some(MotionEvent::ShakeDetected) => self.flash(tones),
            Some(MotionEvent::ShakeEnded) => tones.play(Tone::BLIP),
            None => {}
        }
        self.render(classification.state, buf);
    }

    /// Write the current frame: a blink frame while the sequence runs, the
    /// state color afterwards.
    pub fn render(&mut self, state: MotionState, buf: &mut [Srgb<u8>]) {
        let color = match self.blink_frame() {
            Some(color) => {
                self.blink -= 1;
                color
            }
            None => state_color(state),
        };
        buf.fill(color);
    }

    fn blink_frame(&self) -> Option<Srgb<u8>> {
        if self.blink == 0 {
            return None;
        }
        let elapsed = BLINK_TOTAL_TICKS - self.blink;
        if (elapsed / BLINK_FRAME_TICKS) % 2 == 0 {
            Some(RED)
        } else {
            Some(OFF)
        }
    }
}
