/*
 *  display/drivers/i2c.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  I2C transport - control byte prefix selects command or data
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

use arrayvec::ArrayVec;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::info;

use crate::display::drivers::ResetLine;
use crate::display::error::DisplayError;
use crate::display::protocol::commands::{I2C_CONTROL_COMMAND, I2C_CONTROL_DATA};
use crate::display::traits::{BusKind, DisplayTransport};

/// Largest payload sent in one addressed write
pub const I2C_MAX_PAYLOAD: usize = 32;

pub struct I2cTransport<I2C, RST, D> {
    i2c: I2C,
    address: u8,
    reset: ResetLine<RST, D>,
}

impl<I2C, RST, D> I2cTransport<I2C, RST, D>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(i2c: I2C, address: u8, reset_pin: Option<RST>, delay: D) -> Self {
        info!("I2C transport at address 0x{:02X}", address);
        Self { i2c, address, reset: ResetLine::new(reset_pin, delay) }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// One addressed write per chunk, each led by `control`.
    fn write_prefixed(&mut self, control: u8, bytes: &[u8]) -> Result<(), DisplayError> {
        for chunk in bytes.chunks(I2C_MAX_PAYLOAD) {
            let mut frame: ArrayVec<u8, { I2C_MAX_PAYLOAD + 1 }> = ArrayVec::new();
            frame.push(control);
            // chunk never exceeds the remaining capacity
            let _ = frame.try_extend_from_slice(chunk);
            let (i2c, address) = (&mut self.i2c, self.address);
            self.reset
                .retry("I2C write", || i2c.write(address, &frame))
                .map_err(|e| DisplayError::I2c(format!("write to 0x{:02X}: {:?}", address, e)))?;
        }
        Ok(())
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, RST, D> DisplayTransport for I2cTransport<I2C, RST, D>
where
    I2C: I2c + Send,
    RST: OutputPin + Send,
    D: DelayNs + Send,
{
    fn bus_kind(&self) -> BusKind {
        BusKind::I2c
    }

    fn send_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.write_prefixed(I2C_CONTROL_COMMAND, bytes)
    }

    fn send_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.write_prefixed(I2C_CONTROL_DATA, bytes)
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.reset.pulse()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.reset.delay_ms(ms);
    }
}
