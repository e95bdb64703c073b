//! LIS3DH accelerometer over I2C.
//!
//! Configured for ±2 g full scale in high-resolution mode, where the
//! left-justified 16-bit output reads about 16384 per g.

use embedded_hal::i2c::I2c;

use crate::motion::{
    Accelerometer,
    MotionSample,
};

/// SDO pulled high, as on the Circuit Playground wiring.
pub const LIS3DH_ADDRESS: u8 = 0x19;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL1: u8 = 0x20;
const REG_CTRL4: u8 = 0x23;
const REG_OUT_X_L: u8 = 0x28;

// Set on the register address to auto-increment across a burst read.
const AUTO_INCREMENT: u8 = 0x80;

const WHO_AM_I_EXPECTED: u8 = 0x33;

// CTRL1: 100 Hz ODR, normal power, X/Y/Z enabled.
const CTRL1_ODR_100HZ_XYZ: u8 = 0x57;
// CTRL4: block data update, ±2 g, high resolution.
const CTRL4_BDU_2G_HR: u8 = 0x88;

#[derive(Debug)]
pub enum Error<E> {
    I2c(E),
    InvalidWhoAmI(u8),
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

pub struct Lis3dh<I> {
    i2c: I,
    addr: u8,
}

impl<I, E> Lis3dh<I>
where
    I: I2c<Error = E>,
{
    pub const fn new(i2c: I) -> Self {
        Self {
            i2c,
            addr: LIS3DH_ADDRESS,
        }
    }

    pub fn init(&mut self) -> Result<(), Error<E>> {
        let who = self.read_who_am_i()?;
        if who != WHO_AM_I_EXPECTED {
            return Err(Error::InvalidWhoAmI(who));
        }

        self.i2c.write(self.addr, &[REG_CTRL1, CTRL1_ODR_100HZ_XYZ])?;
        self.i2c.write(self.addr, &[REG_CTRL4, CTRL4_BDU_2G_HR])?;
        Ok(())
    }

    pub fn read_who_am_i(&mut self) -> Result<u8, Error<E>> {
        let mut data = [0u8; 1];
        self.i2c.write_read(self.addr, &[REG_WHO_AM_I], &mut data)?;
        Ok(data[0])
    }

    /// Raw (X, Y, Z) counts.
    pub fn read_raw(&mut self) -> Result<MotionSample, Error<E>> {
        let mut data = [0u8; 6];
        // X_L, X_H, Y_L, Y_H, Z_L, Z_H
        self.i2c
            .write_read(self.addr, &[REG_OUT_X_L | AUTO_INCREMENT], &mut data)?;

        Ok(MotionSample::new(
            i16::from_le_bytes([data[0], data[1]]),
            i16::from_le_bytes([data[2], data[3]]),
            i16::from_le_bytes([data[4], data[5]]),
        ))
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

/// Infallible sample source for the classifier.
///
/// A failed bus read repeats the last good sample so one glitch does not
/// show up as a spike.
pub struct MotionSensor<I> {
    device: Lis3dh<I>,
    last: MotionSample,
}

impl<I, E> MotionSensor<I>
where
    I: I2c<Error = E>,
{
    /// Probe and configure the sensor. On failure the bus comes back with the
    /// error so the caller can signal it.
    pub fn new(i2c: I) -> Result<Self, (Error<E>, I)> {
        let mut device = Lis3dh::new(i2c);
        match device.init() {
            Ok(()) => Ok(Self {
                device,
                last: MotionSample::default(),
            }),
            Err(e) => Err((e, device.release())),
        }
    }
}

impl<I, E> Accelerometer for MotionSensor<I>
where
    I: I2c<Error = E>,
{
    fn read_raw(&mut self) -> Option<MotionSample> {
        match self.device.read_raw() {
            Ok(sample) => self.last = sample,
            Err(_) => warn!("accel: read failed, repeating {}", self.last),
        }
        Some(self.last)
    }
}

#[cfg(feature = "badge")]
impl From<crate::AccelResources<'static>>
    for esp_hal::i2c::master::I2c<'static, esp_hal::Blocking>
{
    fn from(res: crate::AccelResources<'static>) -> Self {
        let config = esp_hal::i2c::master::Config::default()
            .with_frequency(esp_hal::time::Rate::from_khz(400));
        esp_hal::i2c::master::I2c::new(res.i2c, config)
            .unwrap()
            .with_sda(res.sda)
            .with_scl(res.scl)
    }
}
