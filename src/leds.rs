//! WS2812 addressable LED driver using the RMT peripheral.
//!
//! Two chains share one RMT block: the status array on channel 0 and the
//! main effect strip on channel 1.

extern crate alloc;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    rmt::{
        PulseCode,
        Rmt,
        Tx,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    time::Rate,
};
use palette::Srgb;

use crate::{
    LedResources,
    STATUS_LEN,
    STRIP_LEN,
    feedback::RED,
};

type Channel<'a> = esp_hal::rmt::Channel<'a, Blocking, Tx>;

/// WS2812 chain driver.
///
/// Maintains an in-memory framebuffer that is flushed to hardware
/// with [`update`](Leds::update).
pub struct Leds<'a, const N: usize> {
    channel: Option<Channel<'a>>,
    framebuffer: [Srgb<u8>; N],
}

/// Bring up the LED power rail and both RMT channels.
///
/// Returns `(strip, status)`.
pub fn split(res: LedResources<'_>) -> (Leds<'_, STRIP_LEN>, Leds<'_, STATUS_LEN>) {
    let _ws_power = Output::new(res.power, Level::High, OutputConfig::default());
    let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).unwrap();
    let tx_config = TxChannelConfig::default().with_clk_divider(1);
    let status = rmt.channel0.configure_tx(res.status_io, tx_config).unwrap();
    let strip = rmt.channel1.configure_tx(res.strip_io, tx_config).unwrap();
    (Leds::new(strip), Leds::new(status))
}

impl<'a, const N: usize> Leds<'a, N> {
    pub const fn new(channel: Channel<'a>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [Srgb::new(0, 0, 0); N],
        }
    }

    /// Flush the framebuffer to the physical LEDs.
    pub async fn update(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return;
        };

        let pulses = self
            .framebuffer
            .iter()
            .flat_map(|color| {
                // WS2812 expects GRB byte order
                [
                    Self::byte_to_pulses(color.green),
                    Self::byte_to_pulses(color.red),
                    Self::byte_to_pulses(color.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("RMT transmit failed: {}", e);
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((err, ch)) => {
                error!("RMT transaction failed: {}", err);
                ch
            }
        });

        // WS2812 reset time
        Timer::after(Duration::from_micros(50)).await;
    }

    /// Fill all LEDs with one colour.
    pub fn fill(&mut self, color: Srgb<u8>) {
        self.framebuffer.fill(color);
    }

    /// Turn all LEDs off.
    pub fn clear(&mut self) {
        self.fill(Srgb::new(0, 0, 0));
    }

    /// Copy a whole frame, e.g. one of the controller's buffers.
    pub fn fill_from_slice(&mut self, frame: &[Srgb<u8>; N]) {
        self.framebuffer = *frame;
    }

    // ── Internal helpers ────────────────────────────────────────────────

    /// WS2812 bit timing at 40 MHz RMT clock.
    const fn bit_to_pulse(bit: bool) -> PulseCode {
        if bit {
            // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
            PulseCode::new(Level::High, 32, Level::Low, 18)
        } else {
            // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
            PulseCode::new(Level::High, 16, Level::Low, 34)
        }
    }

    fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
        let mut pulses = [PulseCode::default(); 8];
        for (i, pulse) in pulses.iter_mut().enumerate() {
            *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
        }
        pulses
    }
}

/// Status-array fault signal: three red blinks, then dark.
pub async fn signal_fault(leds: &mut Leds<'_, STATUS_LEN>) {
    for _ in 0..3 {
        leds.fill(RED);
        leds.update().await;
        Timer::after(Duration::from_millis(250)).await;
        leds.clear();
        leds.update().await;
        Timer::after(Duration::from_millis(250)).await;
    }
}
