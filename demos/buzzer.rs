//! Plays the shake bleep followed by the settle blip on every button press.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
#[allow(clippy::wildcard_imports)]
use shakelights::*;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn buzzer_task(buzzer: &'static mut Buzzer, button: &'static mut ModeButton) {
    info!("Buzzer task started, press the mode button");

    loop {
        button.wait_for_press().await;
        info!("Bleep");
        buzzer.play(Tone::BLEEP).await;
        Timer::after(Duration::from_millis(300)).await;
        info!("Blip");
        buzzer.play(Tone::BLIP).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = shakelights::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let buzzer = mk_static!(Buzzer, resources.buzzer.into());
    let button = mk_static!(ModeButton, resources.button.into());
    spawner.must_spawn(buzzer_task(buzzer, button));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
