//! # shakelights
//!
//! Motion-reactive LED effects for an addressable RGB strip, a status array
//! and a piezo buzzer.
//!
//! The effect core is hardware independent and owned by a single
//! [`Controller`]:
//! - **Rainbow**: a scrolling color wheel along the strip
//! - **Fill-up**: the strip fills with one color, picking a new one each lap
//! - **Shake**: accelerometer samples are classified as still, moving or
//!   shaken and shown on the status array, with a bleep on a shake and a
//!   blip once it settles
//!
//! With the `badge` feature the crate also provides the ESP32-S3 board
//! layer: WS2812 LEDs over RMT, the buzzer, the accelerometer and the mode
//! button.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = shakelights::init();
//! let resources = shakelights::split_resources!(peripherals);
//!
//! let (mut strip, mut status) = shakelights::leds::split(resources.leds);
//! let mut button: shakelights::ModeButton = resources.button.into();
//! let mut controller = shakelights::EffectsController::new(seed);
//!
//! loop {
//!     let interval = controller.tick(&mut button, &mut accel, &mut tones);
//!     strip.fill_from_slice(controller.strip());
//!     status.fill_from_slice(controller.status());
//!     embassy_futures::join::join(strip.update(), status.update()).await;
//!     Timer::after(interval).await;
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod accel;
pub mod button;
pub mod controller;
pub mod effects;
pub mod feedback;
pub mod mode;
pub mod motion;

#[cfg(feature = "badge")]
mod mode_button;
#[cfg(feature = "badge")]
mod buzzer;
#[cfg(feature = "badge")]
pub mod leds;

pub use accel::MotionSensor;
pub use button::{
    ButtonInput,
    EdgeLatch,
};
pub use controller::{
    Controller,
    EffectsController,
    STATUS_LEN,
    STRIP_LEN,
};
pub use feedback::{
    TONE_QUEUE_DEPTH,
    Tone,
    ToneSink,
};
pub use mode::EffectMode;
pub use motion::{
    Accelerometer,
    MotionConfig,
    MotionSample,
    MotionState,
};

#[cfg(feature = "badge")]
pub use mode_button::ModeButton;
#[cfg(feature = "badge")]
pub use buzzer::Buzzer;
#[cfg(feature = "badge")]
use esp_hal::{
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    rom,
};
#[cfg(feature = "badge")]
pub use leds::Leds;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

// ── Pin / peripheral assignments ────────────────────────────────────────────

#[cfg(feature = "badge")]
assign_resources! {
    pub Resources<'d> {
        button: ButtonResources<'d> {
            pin: GPIO38,
        },
        leds: LedResources<'d> {
            power: GPIO17,
            status_io: GPIO18,
            strip_io: GPIO40,
            rmt: RMT,
        },
        buzzer: BuzzerResources<'d> {
            pin: GPIO39,
        },
        accel: AccelResources<'d> {
            sda: GPIO9,
            scl: GPIO10,
            i2c: I2C0,
        },
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Minimal CPU clock switcher for ESP32-S3.
///
/// Steps through an intermediate frequency before reaching the target,
/// which is required by the hardware.
#[cfg(feature = "badge")]
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                CpuClock::_240MHz => 2,
                _ => panic!("Unsupported CPU clock speed"),
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Initialise the board and return the raw peripheral set.
///
/// Call this once at the top of `main`, then break the peripherals into
/// typed groups with [`split_resources!`].
#[cfg(feature = "badge")]
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

// ── Resource → peripheral conversions ───────────────────────────────────────

#[cfg(feature = "badge")]
impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
    fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
        split_resources!(peripherals)
    }
}
