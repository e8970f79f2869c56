/*
 *  display/traits.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions: pixel sinks and controller transports
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

use embedded_graphics::pixelcolor::BinaryColor;
use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;

/// Color depth of the panel's native buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 1-bit per pixel
    /// Used by: SSD1306, SH1106
    Monochrome,

    /// 4-bit grayscale (16 levels)
    /// Used by: SSD1327
    Gray4,
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth (monochrome or grayscale)
    pub color_depth: ColorDepth,

    /// Whether the controller has a hardware scroll engine
    pub supports_hw_scroll: bool,

    /// Maximum recommended frame rate
    pub max_fps: u32,
}

/// Which wire a transport speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    I2c,
    Spi,
}

/// Minimal pixel sink consumed by the shape and text routines.
///
/// Writes outside `[0, width) x [0, height)` must be silently dropped;
/// callers routinely draw partly off screen while scrolling.
pub trait PixelTarget {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor);

    /// Horizontal run starting at `(x, y)`, `w` pixels wide.
    fn hline(&mut self, x: i32, y: i32, w: i32, color: BinaryColor) {
        for i in x..x.saturating_add(w) {
            self.set_pixel(i, y, color);
        }
    }

    /// Vertical run starting at `(x, y)`, `h` pixels tall.
    fn vline(&mut self, x: i32, y: i32, h: i32, color: BinaryColor) {
        for j in y..y.saturating_add(h) {
            self.set_pixel(x, j, color);
        }
    }
}

impl<T: PixelTarget + ?Sized> PixelTarget for &mut T {
    fn width(&self) -> u32 { (**self).width() }
    fn height(&self) -> u32 { (**self).height() }
    fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        (**self).set_pixel(x, y, color)
    }
    fn hline(&mut self, x: i32, y: i32, w: i32, color: BinaryColor) {
        (**self).hline(x, y, w, color)
    }
    fn vline(&mut self, x: i32, y: i32, h: i32, color: BinaryColor) {
        (**self).vline(x, y, h, color)
    }
}

/// Byte pipe to a display controller.
///
/// Thin adapter over the bus: SPI toggles the DC line, I2C prefixes a
/// control byte. No buffering, no retries.
pub trait DisplayTransport: Send {
    /// The bus this transport drives
    fn bus_kind(&self) -> BusKind;

    /// Send controller command bytes (opcode plus operands)
    fn send_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Send display RAM bytes
    fn send_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Pulse the hardware reset line, if one is wired
    fn reset(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Block for `ms` milliseconds between bring-up steps
    fn delay_ms(&mut self, _ms: u32) {}
}

impl<T: DisplayTransport + ?Sized> DisplayTransport for Box<T> {
    fn bus_kind(&self) -> BusKind { (**self).bus_kind() }
    fn send_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        (**self).send_command(bytes)
    }
    fn send_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        (**self).send_data(bytes)
    }
    fn reset(&mut self) -> Result<(), DisplayError> {
        (**self).reset()
    }
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
