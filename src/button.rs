//! Press detection for the mode button.

/// Logical button level, polarity already resolved by the implementor.
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

impl<B: ButtonInput + ?Sized> ButtonInput for &mut B {
    fn is_pressed(&mut self) -> bool {
        (**self).is_pressed()
    }
}

/// Turns a sampled level into a one-shot press event.
///
/// There is no time-based filtering; sampling once per frame (20–100 ms) is
/// slow enough to ride over contact bounce. The latch starts out pressed, so
/// a button already down at power-on only counts once it has been released.
#[derive(Debug, Clone)]
pub struct EdgeLatch {
    was_pressed: bool,
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self { was_pressed: true }
    }

    /// Returns true only on the sample where the button goes down.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}
