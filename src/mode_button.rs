//! Mode-select push button.

use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    button::ButtonInput,
};

/// The mode button: active low against an internal pull-up.
pub struct ModeButton {
    pin: Input<'static>,
}

impl From<ButtonResources<'static>> for ModeButton {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            pin: Input::new(res.pin, pull_up),
        }
    }
}

impl ModeButton {
    /// Wait for the button to go down (falling edge).
    pub async fn wait_for_press(&mut self) {
        self.pin.wait_for_falling_edge().await;
    }
}

impl ButtonInput for ModeButton {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low()
    }
}
