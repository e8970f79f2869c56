/*
 *  display/protocol/ssd1327.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1327 command set - 4-bit gray, nibble packed RAM, direct text
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
use crate::display::glyphs::glyph;
use crate::display::panel::{PanelFamily, PanelType};
use crate::display::protocol::commands::ssd1327::*;
use crate::display::protocol::commands::{
    ACTIVATE_SCROLL, DISPLAY_OFF, LEFT_HORIZONTAL_SCROLL, RIGHT_HORIZONTAL_SCROLL, SET_MULTIPLEX,
};
use crate::display::protocol::{stream, ControllerProtocol, ScrollDirection, ScrollKind, ScrollRequest};
use crate::display::traits::DisplayTransport;

/// Text cells on the 96x96 glass (8x8 glyphs)
pub const TEXT_ROWS: u8 = 12;
pub const TEXT_COLS: u8 = 12;

/// Seeed 96x96 grayscale module
#[derive(Debug, Clone, Copy)]
pub struct Ssd1327Protocol {
    panel: PanelType,
}

impl Ssd1327Protocol {
    pub fn new(panel: PanelType) -> Self {
        Self { panel }
    }

    fn full_window(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        bus.send_command(&[SET_ROW_ADDRESS, 0x00, ROW_END])?;
        bus.send_command(&[SET_COLUMN_ADDRESS, COLUMN_OFFSET, COLUMN_END])
    }
}

/// Two glyph columns per byte: left column in the high nibble.
pub fn glyph_gray_bytes(code: u8, (gray_h, gray_l): (u8, u8)) -> [u8; 32] {
    let g = glyph(code);
    let mut out = [0u8; 32];
    for (pair, cols) in g.chunks(2).enumerate() {
        for bit in 0..8 {
            let mut b = 0;
            if (cols[0] >> bit) & 1 != 0 {
                b |= gray_h;
            }
            if (cols[1] >> bit) & 1 != 0 {
                b |= gray_l;
            }
            out[pair * 8 + bit] = b;
        }
    }
    out
}

impl ControllerProtocol for Ssd1327Protocol {
    fn family(&self) -> PanelFamily {
        PanelFamily::Ssd1327
    }

    fn panel(&self) -> PanelType {
        self.panel
    }

    fn configure(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        let params = self.panel.bring_up_params();

        // everything before the unlock is ignored by the chip
        bus.send_command(&[SET_COMMAND_LOCK, UNLOCK])?;
        bus.send_command(&[DISPLAY_OFF])?;
        bus.send_command(&[SET_MULTIPLEX, params.multiplex])?;
        bus.send_command(&[SET_CLOCK_DIV, 0x01])?;
        bus.send_command(&[SET_START_LINE, 0x00])?;
        bus.send_command(&[SET_DISPLAY_OFFSET, 0x60])?;
        bus.send_command(&[SET_REMAP, REMAP])?;
        bus.send_command(&[FUNCTION_SELECT_A, 0x01])?;
        bus.send_command(&[SET_PHASE_LENGTH, 0x51])?;
        bus.send_command(&[LINEAR_GRAY_TABLE])?;
        bus.send_command(&[SET_PRECHARGE_VOLTAGE, 0x08])?;
        bus.send_command(&[SET_VCOMH, 0x07])?;
        bus.send_command(&[SET_SECOND_PRECHARGE_PERIOD, 0x01])?;
        bus.send_command(&[FUNCTION_SELECT_B, 0x62])?;
        bus.send_command(&[NORMAL_DISPLAY])?;
        self.full_window(bus)?;
        bus.send_command(&[SET_REMAP, REMAP])
    }

    fn normal_display_opcode(&self) -> u8 {
        NORMAL_DISPLAY
    }

    fn flush(&self, bus: &mut dyn DisplayTransport, fb: &PixelBuffer) -> Result<(), DisplayError> {
        self.full_window(bus)?;
        stream(bus, fb.as_bytes())
    }

    /// Horizontal only. Right and left opcodes are swapped relative to SSD1306.
    fn start_scroll(&self, bus: &mut dyn DisplayTransport, request: &ScrollRequest) -> Result<(), DisplayError> {
        if request.kind == ScrollKind::Diagonal {
            return Err(DisplayError::UnsupportedOperation);
        }
        let opcode = match request.direction {
            ScrollDirection::Right => LEFT_HORIZONTAL_SCROLL,
            ScrollDirection::Left => RIGHT_HORIZONTAL_SCROLL,
        };
        debug!("ssd1327 scroll {:?}", request);
        bus.send_command(&[
            opcode,
            0x00,
            request.start_row,
            request.speed.code(),
            request.end_row,
            request.start_col.saturating_add(COLUMN_OFFSET),
            request.end_col.saturating_add(COLUMN_OFFSET),
            0x00,
        ])?;
        bus.send_command(&[ACTIVATE_SCROLL])
    }

    fn set_text_xy(&self, bus: &mut dyn DisplayTransport, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= TEXT_ROWS || col >= TEXT_COLS {
            return Err(DisplayError::InvalidConfiguration(format!(
                "text cell {row},{col} outside {TEXT_ROWS}x{TEXT_COLS}"
            )));
        }
        bus.send_command(&[SET_COLUMN_ADDRESS, COLUMN_OFFSET + col * 4, COLUMN_END])?;
        bus.send_command(&[SET_ROW_ADDRESS, row * 8, 0x07 + row * 8])
    }

    fn put_char(&self, bus: &mut dyn DisplayTransport, code: u8, gray: (u8, u8)) -> Result<(), DisplayError> {
        stream(bus, &glyph_gray_bytes(code, gray))
    }
}
