/*
 *  display/protocol/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Controller protocol strategies - one per controller family
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

use log::debug;

use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;
use crate::display::panel::{PanelFamily, PanelType};
use crate::display::traits::DisplayTransport;

pub mod commands;
pub mod sh1106;
pub mod ssd1306;
pub mod ssd1327;

pub use commands::ScrollSpeed;
pub use sh1106::Sh1106Protocol;
pub use ssd1306::Ssd1306Protocol;
pub use ssd1327::Ssd1327Protocol;

use commands::{DATA_BURST, DEACTIVATE_SCROLL, INVERSE_DISPLAY, SET_CONTRAST};

/// Direction the hardware scroll engine moves the picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Horizontal only, or horizontal plus vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    Horizontal,
    Diagonal,
}

/// Arguments for a hardware scroll.
///
/// Rows are pages on the mono families and pixel rows on SSD1327; the
/// column range is only used by SSD1327.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub direction: ScrollDirection,
    pub kind: ScrollKind,
    pub start_row: u8,
    pub end_row: u8,
    pub start_col: u8,
    pub end_col: u8,
    pub speed: ScrollSpeed,
}

impl ScrollRequest {
    pub fn horizontal(direction: ScrollDirection, start_row: u8, end_row: u8) -> Self {
        Self {
            direction,
            kind: ScrollKind::Horizontal,
            start_row,
            end_row,
            start_col: 0,
            end_col: 0,
            speed: ScrollSpeed::default(),
        }
    }

    pub fn diagonal(direction: ScrollDirection, start_row: u8, end_row: u8) -> Self {
        Self { kind: ScrollKind::Diagonal, ..Self::horizontal(direction, start_row, end_row) }
    }

    pub fn with_columns(mut self, start_col: u8, end_col: u8) -> Self {
        self.start_col = start_col;
        self.end_col = end_col;
        self
    }

    pub fn with_speed(mut self, speed: ScrollSpeed) -> Self {
        self.speed = speed;
        self
    }
}

/// Family specific command set.
///
/// Resolved once per panel selection; the controller only ever talks to
/// the panel through one of these.
pub trait ControllerProtocol: Send {
    fn family(&self) -> PanelFamily;

    fn panel(&self) -> PanelType;

    /// Family register setup, from the first command up to (not including)
    /// the contrast setting that every family shares.
    fn configure(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError>;

    /// Opcode that turns inversion back off
    fn normal_display_opcode(&self) -> u8;

    /// Push the whole buffer, resetting the RAM write window first.
    fn flush(&self, bus: &mut dyn DisplayTransport, fb: &PixelBuffer) -> Result<(), DisplayError>;

    fn start_scroll(&self, bus: &mut dyn DisplayTransport, request: &ScrollRequest) -> Result<(), DisplayError>;

    fn stop_scroll(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        bus.send_command(&[DEACTIVATE_SCROLL])
    }

    fn set_contrast(&self, bus: &mut dyn DisplayTransport, contrast: u8) -> Result<(), DisplayError> {
        bus.send_command(&[SET_CONTRAST, contrast])
    }

    fn invert(&self, bus: &mut dyn DisplayTransport, inverted: bool) -> Result<(), DisplayError> {
        let opcode = if inverted { INVERSE_DISPLAY } else { self.normal_display_opcode() };
        bus.send_command(&[opcode])
    }

    /// Move the controller's text cursor (grayscale direct text only)
    fn set_text_xy(&self, _bus: &mut dyn DisplayTransport, _row: u8, _col: u8) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Write one glyph straight to display RAM at the text cursor
    fn put_char(&self, _bus: &mut dyn DisplayTransport, _code: u8, _gray: (u8, u8)) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }
}

/// Pick the strategy for a panel
pub fn protocol_for(panel: PanelType) -> Box<dyn ControllerProtocol> {
    debug!("protocol for {}: {:?}", panel, panel.family());
    match panel.family() {
        PanelFamily::Ssd1306 => Box::new(Ssd1306Protocol::new(panel)),
        PanelFamily::Sh1106 => Box::new(Sh1106Protocol::new(panel)),
        PanelFamily::Ssd1327 => Box::new(Ssd1327Protocol::new(panel)),
    }
}

/// Stream display RAM in fixed bursts, stopping at the first failed write.
pub(crate) fn stream(bus: &mut dyn DisplayTransport, bytes: &[u8]) -> Result<(), DisplayError> {
    for burst in bytes.chunks(DATA_BURST) {
        bus.send_data(burst)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::{RecordingTransport, Sent};
    use crate::display::traits::BusKind;

    #[test]
    fn test_factory_matches_family() {
        for panel in PanelType::ALL {
            let proto = protocol_for(panel);
            assert_eq!(proto.family(), panel.family());
            assert_eq!(proto.panel(), panel);
        }
    }

    #[test]
    fn test_invert_opcode_differs_by_family() {
        let mut bus = RecordingTransport::new(BusKind::I2c);
        let log = bus.log();
        protocol_for(PanelType::AdafruitI2c128x64).invert(&mut bus, false).unwrap();
        protocol_for(PanelType::SeeedI2c96x96).invert(&mut bus, false).unwrap();
        protocol_for(PanelType::Sh1106I2c128x64).invert(&mut bus, true).unwrap();
        assert_eq!(log.lock().unwrap().command_bytes(), vec![0xA6, 0xA4, 0xA7]);
    }

    #[test]
    fn test_stream_stops_on_first_failure() {
        let mut bus = RecordingTransport::new(BusKind::Spi);
        let log = bus.log();
        log.lock().unwrap().fail_after = Some(3);
        let err = stream(&mut bus, &[0u8; 100]).unwrap_err();
        assert!(err.is_bus_error());
        let log = log.lock().unwrap();
        assert_eq!(log.sent.len(), 3);
        assert_eq!(log.failed_writes, 1);
        assert!(log.sent.iter().all(|s| matches!(s, Sent::Data(d) if d.len() == DATA_BURST)));
    }

    #[test]
    fn test_scroll_request_builders() {
        let r = ScrollRequest::diagonal(ScrollDirection::Left, 0, 7).with_speed(ScrollSpeed::Frames2);
        assert_eq!(r.kind, ScrollKind::Diagonal);
        assert_eq!(r.speed.code(), 0x07);
        let r = ScrollRequest::horizontal(ScrollDirection::Right, 0, 95).with_columns(0, 47);
        assert_eq!((r.start_col, r.end_col), (0, 47));
    }
}
