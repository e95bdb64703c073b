//! Logs raw accelerometer samples and their classification, and mirrors the
//! motion state on the status array.

#![no_std]
#![no_main]

use defmt::{
    error,
    info,
};
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    Blocking,
    i2c::master::I2c,
    timer::timg::TimerGroup,
};
use esp_println as _;
#[allow(clippy::wildcard_imports)]
use shakelights::*;
use shakelights::{
    feedback::state_color,
    motion::MotionClassifier,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

// Log every 25th frame (twice a second) to keep the console readable.
const LOG_EVERY: u32 = 25;

#[embassy_executor::task]
async fn accel_task(
    sensor: &'static mut MotionSensor<I2c<'static, Blocking>>,
    status: &'static mut Leds<'static, STATUS_LEN>,
) {
    info!("Accel task started, shake the board");

    let mut classifier = MotionClassifier::default();
    let mut frame = 0u32;
    loop {
        if let Some(sample) = sensor.read_raw() {
            let classification = classifier.update(sample);

            if let Some(event) = classification.event {
                info!("{}", event);
            }
            if frame % LOG_EVERY == 0 {
                info!(
                    "{} deviation {} -> {}",
                    sample,
                    classifier.deviation(),
                    classification.state
                );
            }
            frame = frame.wrapping_add(1);

            status.fill(state_color(classification.state));
            status.update().await;
        }
        Timer::after(EffectMode::Shake.frame_interval()).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = shakelights::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let (_strip, status) = leds::split(resources.leds);
    let status = mk_static!(Leds<'static, STATUS_LEN>, status);

    match MotionSensor::new(I2c::from(resources.accel)) {
        Ok(sensor) => {
            let sensor = mk_static!(MotionSensor<I2c<'static, Blocking>>, sensor);
            spawner.must_spawn(accel_task(sensor, status));
        }
        Err((e, _)) => {
            error!("Accelerometer setup failed: {}", defmt::Debug2Format(&e));
            leds::signal_fault(status).await;
        }
    }

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
