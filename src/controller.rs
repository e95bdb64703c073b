//! The control loop's owned state and its per-frame step.

use embassy_time::Duration;
use palette::Srgb;

use crate::{
    button::{
        ButtonInput,
        EdgeLatch,
    },
    effects::{
        Fillup,
        Rainbow,
    },
    feedback::{
        OFF,
        StatusLights,
        ToneSink,
    },
    mode::EffectMode,
    motion::{
        Accelerometer,
        MotionClassifier,
        MotionConfig,
        MotionState,
    },
};

/// Pixels on the main effect strip.
pub const STRIP_LEN: usize = 53;
/// Pixels on the status array.
pub const STATUS_LEN: usize = 10;

/// Controller sized for the main strip plus the status array.
pub type EffectsController = Controller<STRIP_LEN, STATUS_LEN>;

/// Everything the effects loop keeps between frames.
///
/// `STRIP` pixels carry the rainbow and fill-up patterns; `STATUS` pixels
/// carry the motion state in shake mode.
pub struct Controller<const STRIP: usize, const STATUS: usize> {
    mode: EffectMode,
    button: EdgeLatch,
    rainbow: Rainbow,
    fillup: Fillup,
    classifier: MotionClassifier,
    lights: StatusLights,
    strip: [Srgb<u8>; STRIP],
    status: [Srgb<u8>; STATUS],
}

impl<const STRIP: usize, const STATUS: usize> Controller<STRIP, STATUS> {
    /// `seed` feeds the fill-up color picker.
    pub fn new(seed: u32) -> Self {
        Self::with_config(seed, MotionConfig::DEFAULT)
    }

    pub fn with_config(seed: u32, config: MotionConfig) -> Self {
        Self {
            mode: EffectMode::Rainbow,
            button: EdgeLatch::new(),
            rainbow: Rainbow::new(),
            fillup: Fillup::new(seed),
            classifier: MotionClassifier::new(config),
            lights: StatusLights::new(),
            strip: [OFF; STRIP],
            status: [OFF; STATUS],
        }
    }

    pub const fn mode(&self) -> EffectMode {
        self.mode
    }

    pub const fn strip(&self) -> &[Srgb<u8>; STRIP] {
        &self.strip
    }

    pub const fn status(&self) -> &[Srgb<u8>; STATUS] {
        &self.status
    }

    pub const fn rainbow(&self) -> &Rainbow {
        &self.rainbow
    }

    pub const fn fillup(&self) -> &Fillup {
        &self.fillup
    }

    pub const fn classifier(&self) -> &MotionClassifier {
        &self.classifier
    }

    /// Run one frame: sample the button, switch modes on a fresh press, then
    /// render the active mode. Returns how long to wait before the next frame.
    ///
    /// The accelerometer is only read in shake mode, and not on the frame
    /// that enters it. Without a sensor the status array stays at
    /// [`MotionState::Normal`] and the classifier is left untouched.
    pub fn tick(
        &mut self,
        button: &mut impl ButtonInput,
        accel: &mut impl Accelerometer,
        tones: &mut impl ToneSink,
    ) -> Duration {
        if self.button.update(button.is_pressed()) {
            self.advance_mode(tones);
            if self.mode == EffectMode::Shake {
                return self.mode.frame_interval();
            }
        }

        match self.mode {
            EffectMode::Rainbow => self.rainbow.render(&mut self.strip),
            EffectMode::Fillup => self.fillup.render(&mut self.strip),
            EffectMode::Shake => match accel.read_raw() {
                Some(sample) => {
                    let classification = self.classifier.update(sample);
                    self.lights
                        .dispatch(classification, &mut self.status, tones);
                }
                None => self.lights.render(MotionState::Normal, &mut self.status),
            },
        }

        self.mode.frame_interval()
    }

    fn advance_mode(&mut self, tones: &mut impl ToneSink) {
        let next = self.mode.next();
        info!("mode: {} -> {}", self.mode, next);
        self.mode = next;

        match next {
            EffectMode::Rainbow => self.status.fill(OFF),
            EffectMode::Fillup => self.fillup.reset(),
            EffectMode::Shake => {
                // Confirm the switch right away; the classifier's first frame
                // follows on the next tick.
                self.lights.flash(tones);
                self.lights.render(MotionState::Shake, &mut self.status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feedback::{
            RED,
            Tone,
        },
        motion::MotionSample,
    };

    struct Level(bool);

    impl ButtonInput for Level {
        fn is_pressed(&mut self) -> bool {
            self.0
        }
    }

    struct Still;

    impl Accelerometer for Still {
        fn read_raw(&mut self) -> Option<MotionSample> {
            Some(MotionSample::new(0, 0, 16384))
        }
    }

    #[derive(Default)]
    struct Tones(Vec<Tone>);

    impl ToneSink for Tones {
        fn play(&mut self, tone: Tone) {
            self.0.push(tone);
        }
    }

    type Small = Controller<8, 4>;

    fn press(ctl: &mut Small, tones: &mut Tones) -> Duration {
        ctl.tick(&mut Level(false), &mut Still, tones);
        ctl.tick(&mut Level(true), &mut Still, tones);
        ctl.tick(&mut Level(false), &mut Still, tones)
    }

    #[test]
    fn starts_in_rainbow_at_pattern_rate() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        let interval = ctl.tick(&mut Level(false), &mut Still, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Rainbow);
        assert_eq!(interval, Duration::from_millis(100));
        assert_eq!(ctl.rainbow().phase(), 1);
    }

    #[test]
    fn held_button_advances_once() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        ctl.tick(&mut Level(false), &mut Still, &mut tones);
        for _ in 0..25 {
            ctl.tick(&mut Level(true), &mut Still, &mut tones);
        }
        assert_eq!(ctl.mode(), EffectMode::Fillup);
    }

    #[test]
    fn entering_fillup_restarts_the_counter() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        press(&mut ctl, &mut tones);
        for _ in 0..3 {
            ctl.tick(&mut Level(false), &mut Still, &mut tones);
        }
        assert_eq!(ctl.fillup().counter(), 5);

        press(&mut ctl, &mut tones);
        press(&mut ctl, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Rainbow);
        ctl.tick(&mut Level(true), &mut Still, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Fillup);
        // Reset on entry, then the entry frame itself advances once.
        assert_eq!(ctl.fillup().counter(), 1);
    }

    #[test]
    fn entering_shake_flashes_and_bleeps_immediately() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        press(&mut ctl, &mut tones);
        ctl.tick(&mut Level(true), &mut Still, &mut tones);

        assert_eq!(ctl.mode(), EffectMode::Shake);
        assert_eq!(ctl.status(), &[RED; 4]);
        assert_eq!(tones.0, [Tone::BLEEP]);
        assert_eq!(ctl.classifier().smoothed(), 0.0);
        assert_eq!(ctl.classifier().hold_remaining(), 0);
    }

    #[test]
    fn shake_mode_samples_at_motion_rate() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        press(&mut ctl, &mut tones);
        press(&mut ctl, &mut tones);
        let interval = ctl.tick(&mut Level(false), &mut Still, &mut tones);
        assert_eq!(interval, Duration::from_millis(20));
        assert!(ctl.classifier().smoothed() > 0.0);
    }

    #[test]
    fn button_held_through_boot_does_not_switch() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        for _ in 0..5 {
            ctl.tick(&mut Level(true), &mut Still, &mut tones);
        }
        assert_eq!(ctl.mode(), EffectMode::Rainbow);
        press(&mut ctl, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Fillup);
    }

    #[test]
    fn leaving_shake_clears_the_status_array() {
        let mut ctl = Small::new(1);
        let mut tones = Tones::default();
        press(&mut ctl, &mut tones);
        press(&mut ctl, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Shake);
        press(&mut ctl, &mut tones);
        assert_eq!(ctl.mode(), EffectMode::Rainbow);
        assert!(ctl.status().iter().all(|c| *c == OFF));
    }
}
