/*
 *  display/drivers/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bus transports for OLED controllers (I2C, SPI, recording mock)
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::display::error::DisplayError;

pub mod i2c;
pub mod spi;

// Recording transport for tests and dry runs
pub mod mock;

pub use i2c::I2cTransport;
pub use spi::SpiTransport;
pub use mock::{RecordingTransport, Sent, TransportLog};

/// Tries per bus write before the error reaches the controller
pub const BUS_WRITE_ATTEMPTS: u32 = 3;
/// Backoff after a failed write, scaled by the attempt number
pub const BUS_RETRY_BACKOFF_MS: u32 = 2;

/// Optional reset line plus the delay source used around it.
pub struct ResetLine<RST, D> {
    pin: Option<RST>,
    delay: D,
}

impl<RST: OutputPin, D: DelayNs> ResetLine<RST, D> {
    pub fn new(pin: Option<RST>, delay: D) -> Self {
        Self { pin, delay }
    }

    /// high, 1ms, low, 10ms, high
    pub fn pulse(&mut self) -> Result<(), DisplayError> {
        let Some(pin) = self.pin.as_mut() else {
            return Ok(());
        };
        let gpio = |e: RST::Error| DisplayError::Gpio(format!("reset line: {:?}", e));
        pin.set_high().map_err(gpio)?;
        self.delay.delay_ms(1);
        pin.set_low().map_err(gpio)?;
        self.delay.delay_ms(10);
        pin.set_high().map_err(gpio)?;
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Runs `op` up to [`BUS_WRITE_ATTEMPTS`] times, backing off between
    /// tries. The last error is returned unchanged.
    pub fn retry<T, E: Debug>(&mut self, what: &str, mut op: impl FnMut() -> Result<T, E>) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if attempt < BUS_WRITE_ATTEMPTS => {
                    warn!("{} failed (attempt {}/{}): {:?}", what, attempt, BUS_WRITE_ATTEMPTS, e);
                    self.delay.delay_ms(BUS_RETRY_BACKOFF_MS * attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
