//! Effects firmware: rainbow, fill-up and shake modes on the LED strip and
//! status array. The mode button cycles through them.

#![no_std]
#![no_main]

use defmt::{
    info,
    warn,
};
use embassy_executor::Spawner;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{
        Channel,
        Receiver,
    },
};
use embassy_time::Timer;
use esp_backtrace as _;
use esp_hal::{
    Blocking,
    i2c::master::I2c,
    rng::Rng,
    timer::timg::TimerGroup,
};
use esp_println as _;
#[allow(clippy::wildcard_imports)]
use shakelights::*;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

// ── Tone events ─────────────────────────────────────────────────────────────
static TONE_CHANNEL: Channel<CriticalSectionRawMutex, Tone, TONE_QUEUE_DEPTH> = Channel::new();

#[embassy_executor::task]
async fn buzzer_task(
    buzzer: &'static mut Buzzer,
    tones: Receiver<'static, CriticalSectionRawMutex, Tone, TONE_QUEUE_DEPTH>,
) {
    info!("Buzzer task started");
    loop {
        let tone = tones.receive().await;
        buzzer.play(tone).await;
    }
}

#[embassy_executor::task]
async fn effects_task(
    strip: &'static mut Leds<'static, STRIP_LEN>,
    status: &'static mut Leds<'static, STATUS_LEN>,
    button: &'static mut ModeButton,
    mut accel: Option<MotionSensor<I2c<'static, Blocking>>>,
    seed: u32,
) {
    info!("Effects task started, press the mode button to switch effects");

    let mut controller = EffectsController::new(seed);
    let mut tones = TONE_CHANNEL.sender();

    loop {
        let interval = controller.tick(button, &mut accel, &mut tones);

        strip.fill_from_slice(controller.strip());
        status.fill_from_slice(controller.status());
        embassy_futures::join::join(strip.update(), status.update()).await;

        Timer::after(interval).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = shakelights::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let (strip, status) = leds::split(resources.leds);
    let strip = mk_static!(Leds<'static, STRIP_LEN>, strip);
    let status = mk_static!(Leds<'static, STATUS_LEN>, status);
    let button = mk_static!(ModeButton, resources.button.into());
    let buzzer = mk_static!(Buzzer, resources.buzzer.into());

    let accel = match MotionSensor::new(I2c::from(resources.accel)) {
        Ok(sensor) => Some(sensor),
        Err((e, _)) => {
            warn!("Accelerometer setup failed: {}", defmt::Debug2Format(&e));
            leds::signal_fault(status).await;
            None
        }
    };

    let seed = Rng::new().random();

    spawner.must_spawn(buzzer_task(buzzer, TONE_CHANNEL.receiver()));
    spawner.must_spawn(effects_task(strip, status, button, accel, seed));

    loop {
        Timer::after(embassy_time::Duration::from_secs(600)).await;
    }
}
