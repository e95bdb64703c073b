//! Pattern generators for the main LED strip.
//!
//! Both generators render into a caller-owned buffer in place. Fill-up is an
//! accumulating effect: pixels past the fill counter keep whatever the last
//! frame left there.

use palette::Srgb;

/// Map a hue index onto a three-band red → green → blue color wheel.
///
/// The wheel has a period of 256 and every channel moves by 3 per step, so
/// adjacent indices never differ by more than 3 on any channel.
pub const fn wheel(hue: u8) -> Srgb<u8> {
    if hue < 85 {
        Srgb::new(hue * 3, 255 - hue * 3, 0)
    } else if hue < 170 {
        let h = hue - 85;
        Srgb::new(255 - h * 3, 0, h * 3)
    } else {
        let h = hue - 170;
        Srgb::new(0, h * 3, 255 - h * 3)
    }
}

/// Scrolling rainbow: pixel `i` shows `wheel(phase + i)`.
#[derive(Debug, Clone, Default)]
pub struct Rainbow {
    phase: u8,
}

impl Rainbow {
    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Draw the current frame and advance the phase by one.
    pub fn render(&mut self, buf: &mut [Srgb<u8>]) {
        for (i, led) in buf.iter_mut().enumerate() {
            // Hue wraps every 256 pixels; truncation is the wrap.
            *led = wheel(self.phase.wrapping_add(i as u8));
        }
        self.phase = self.phase.wrapping_add(1);
    }
}

// ── Simple RNG (xorshift) ───────────────────────────────────────────────────

/// xorshift32 generator used to pick fill colors.
#[derive(Debug, Clone)]
pub struct Rng(u32);

impl Rng {
    /// A zero state would lock xorshift at zero forever.
    pub const fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    pub fn next_u8(&mut self) -> u8 {
        (self.next() >> 24) as u8
    }
}

/// Fill-up: paints the first `counter` pixels with one color, one more pixel
/// per frame, and picks a fresh color each time the strip wraps.
#[derive(Debug, Clone)]
pub struct Fillup {
    counter: usize,
    color: Srgb<u8>,
    rng: Rng,
}

impl Fillup {
    pub fn new(seed: u32) -> Self {
        let mut rng = Rng::new(seed);
        let color = wheel(rng.next_u8());
        Self {
            counter: 0,
            color,
            rng,
        }
    }

    pub const fn counter(&self) -> usize {
        self.counter
    }

    pub const fn color(&self) -> Srgb<u8> {
        self.color
    }

    /// Mode entry: start filling from the origin again.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Draw the current frame and advance the counter, wrapping at the
    /// buffer length.
    pub fn render(&mut self, buf: &mut [Srgb<u8>]) {
        let filled = self.counter.min(buf.len());
        buf[..filled].fill(self.color);

        self.counter += 1;
        if self.counter >= buf.len() {
            self.counter = 0;
            self.reroll();
        }
    }

    // Several hues land on the same color (0 and 255 are both pure green),
    // so compare colors rather than hue indices.
    fn reroll(&mut self) {
        let previous = self.color;
        loop {
            let color = wheel(self.rng.next_u8());
            if color != previous {
                self.color = color;
                trace!("fillup: new fill color {}", (color.red, color.green, color.blue));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 53;

    fn channel_step(a: u8, b: u8) -> u8 {
        a.abs_diff(b)
    }

    #[test]
    fn wheel_band_edges() {
        assert_eq!(wheel(0), Srgb::new(0, 255, 0));
        assert_eq!(wheel(84), Srgb::new(252, 3, 0));
        assert_eq!(wheel(85), Srgb::new(255, 0, 0));
        assert_eq!(wheel(169), Srgb::new(3, 0, 252));
        assert_eq!(wheel(170), Srgb::new(0, 0, 255));
        assert_eq!(wheel(255), Srgb::new(0, 255, 0));
    }

    #[test]
    fn wheel_is_continuous_including_wraparound() {
        for h in 0..=255u8 {
            let a = wheel(h);
            let b = wheel(h.wrapping_add(1));
            assert!(channel_step(a.red, b.red) <= 3, "red jump at {h}");
            assert!(channel_step(a.green, b.green) <= 3, "green jump at {h}");
            assert!(channel_step(a.blue, b.blue) <= 3, "blue jump at {h}");
        }
    }

    #[test]
    fn rainbow_is_shift_invariant() {
        let mut reference = [Srgb::new(0, 0, 0); 256];
        Rainbow::new().render(&mut reference);

        let mut rainbow = Rainbow::new();
        let mut buf = [Srgb::new(0, 0, 0); N];
        for p in 0..600usize {
            assert_eq!(rainbow.phase(), (p % 256) as u8);
            rainbow.render(&mut buf);
            for (i, led) in buf.iter().enumerate() {
                assert_eq!(*led, reference[(p + i) % 256]);
            }
        }
    }

    #[test]
    fn fillup_counter_climbs_then_wraps() {
        let mut fill = Fillup::new(7);
        let mut buf = [Srgb::new(0, 0, 0); N];
        for expected in 1..N {
            fill.render(&mut buf);
            assert_eq!(fill.counter(), expected);
        }
        fill.render(&mut buf);
        assert_eq!(fill.counter(), 0);
    }

    #[test]
    fn fillup_paints_prefix_and_leaves_the_rest() {
        let stale = Srgb::new(1, 2, 3);
        let mut buf = [stale; N];
        let mut fill = Fillup::new(99);
        let color = fill.color();
        for _ in 0..5 {
            fill.render(&mut buf);
        }
        // Fifth frame paints indices 0..4.
        assert!(buf[..4].iter().all(|c| *c == color));
        assert!(buf[4..].iter().all(|c| *c == stale));
    }

    #[test]
    fn fillup_color_changes_on_every_wrap() {
        let mut fill = Fillup::new(0xDEAD_BEEF);
        let mut buf = [Srgb::new(0, 0, 0); N];
        for _ in 0..50 {
            let before = fill.color();
            for _ in 0..N {
                fill.render(&mut buf);
            }
            assert_eq!(fill.counter(), 0);
            assert_ne!(fill.color(), before);
        }
    }

    #[test]
    fn fillup_reset_keeps_color() {
        let mut fill = Fillup::new(3);
        let mut buf = [Srgb::new(0, 0, 0); N];
        for _ in 0..10 {
            fill.render(&mut buf);
        }
        let color = fill.color();
        fill.reset();
        assert_eq!(fill.counter(), 0);
        assert_eq!(fill.color(), color);
    }

    #[test]
    fn zero_seed_still_produces_values() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.next(), 0);
    }
}
