/*
 *  display/error.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the OLED display subsystem
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

use thiserror::Error;

/// Unified error type for all display operations
#[derive(Debug, Error)]
pub enum DisplayError {
    /// I2C communication error
    #[error("I2C communication error: {0}")]
    I2c(String),

    /// SPI communication error
    #[error("SPI communication error: {0}")]
    Spi(String),

    /// GPIO pin error (DC or reset line)
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Panel id outside the known catalogue
    #[error("Unknown panel type: {0}")]
    UnknownPanel(u8),

    /// Unsupported operation for this controller family
    #[error("Operation not supported by this display")]
    UnsupportedOperation,

    /// Operation issued before the controller reached the required state
    #[error("Display not ready: {0}")]
    NotReady(&'static str),

    /// Framebuffer size mismatch
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Screen component does not fit the area it was given
    #[error("Layout too small: {0}")]
    LayoutTooSmall(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DisplayError {
    /// True for failures raised by the bus itself, as opposed to caller mistakes.
    pub fn is_bus_error(&self) -> bool {
        matches!(self, DisplayError::I2c(_) | DisplayError::Spi(_) | DisplayError::Gpio(_))
    }
}

// Conversion from Linux I2C errors
impl From<linux_embedded_hal::I2CError> for DisplayError {
    fn from(err: linux_embedded_hal::I2CError) -> Self {
        DisplayError::I2c(format!("{:?}", err))
    }
}

impl From<linux_embedded_hal::SPIError> for DisplayError {
    fn from(err: linux_embedded_hal::SPIError) -> Self {
        DisplayError::Spi(format!("{:?}", err))
    }
}

impl From<linux_embedded_hal::CdevPinError> for DisplayError {
    fn from(err: linux_embedded_hal::CdevPinError) -> Self {
        DisplayError::Gpio(format!("{:?}", err))
    }
}

impl From<linux_embedded_hal::gpio_cdev::Error> for DisplayError {
    fn from(err: linux_embedded_hal::gpio_cdev::Error) -> Self {
        DisplayError::Gpio(err.to_string())
    }
}
