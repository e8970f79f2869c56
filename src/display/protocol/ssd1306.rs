/*
 *  display/protocol/ssd1306.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 command set - horizontal addressing, window reset per frame
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
use crate::display::protocol::commands::ssd1306::*;
use crate::display::protocol::commands::{
    ACTIVATE_SCROLL, DISPLAY_OFF, LEFT_HORIZONTAL_SCROLL, RIGHT_HORIZONTAL_SCROLL, SET_MULTIPLEX,
};
use crate::display::protocol::{stream, ControllerProtocol, ScrollDirection, ScrollKind, ScrollRequest};
use crate::display::traits::DisplayTransport;

/// SSD1306 panels (Adafruit and Seeed 128x64/128x32)
#[derive(Debug, Clone, Copy)]
pub struct Ssd1306Protocol {
    panel: PanelType,
}

impl Ssd1306Protocol {
    pub fn new(panel: PanelType) -> Self {
        Self { panel }
    }

    fn last_column(&self) -> u8 {
        (self.panel.width() - 1) as u8
    }

    fn last_page(&self) -> u8 {
        (self.panel.height() / 8 - 1) as u8
    }

    /// Full panel column and page window; rewinds the RAM pointer to 0,0
    fn reset_window(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        bus.send_command(&[SET_COLUMN_ADDRESS, 0x00, self.last_column()])?;
        bus.send_command(&[SET_PAGE_ADDRESS, 0x00, self.last_page()])
    }
}

impl ControllerProtocol for Ssd1306Protocol {
    fn family(&self) -> PanelFamily {
        PanelFamily::Ssd1306
    }

    fn panel(&self) -> PanelType {
        self.panel
    }

    fn configure(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        let params = self.panel.bring_up_params();
        debug!("ssd1306 bring-up {:?}", params);

        bus.send_command(&[DISPLAY_OFF])?;
        bus.send_command(&[SET_MULTIPLEX, params.multiplex])?;
        bus.send_command(&[CHARGE_PUMP, params.charge_pump])?;
        bus.send_command(&[SET_MEMORY_MODE, MEMORY_MODE_HORIZONTAL])?;
        bus.send_command(&[SET_CLOCK_DIV, 0x80])?;
        bus.send_command(&[SET_DISPLAY_OFFSET, 0x00])?;
        bus.send_command(&[SET_START_LINE])?;
        bus.send_command(&[SEGMENT_REMAP])?;
        bus.send_command(&[COM_SCAN_REMAP])?;
        bus.send_command(&[SET_COM_PINS, params.com_pins])?;
        bus.send_command(&[SET_PRECHARGE, params.precharge])?;
        bus.send_command(&[SET_VCOMH_DESELECT, 0x40])?;
        bus.send_command(&[ENTIRE_DISPLAY_RESUME])?;
        bus.send_command(&[NORMAL_DISPLAY])?;
        // known window even when no reset line is wired
        self.reset_window(bus)
    }

    fn normal_display_opcode(&self) -> u8 {
        NORMAL_DISPLAY
    }

    fn flush(&self, bus: &mut dyn DisplayTransport, fb: &PixelBuffer) -> Result<(), DisplayError> {
        self.reset_window(bus)?;
        stream(bus, fb.as_bytes())
    }

    fn start_scroll(&self, bus: &mut dyn DisplayTransport, request: &ScrollRequest) -> Result<(), DisplayError> {
        let speed = request.speed.code();
        match request.kind {
            ScrollKind::Horizontal => {
                let opcode = match request.direction {
                    ScrollDirection::Right => RIGHT_HORIZONTAL_SCROLL,
                    ScrollDirection::Left => LEFT_HORIZONTAL_SCROLL,
                };
                bus.send_command(&[opcode, 0x00, request.start_row, speed, request.end_row, 0x01, 0xFF])?;
            }
            ScrollKind::Diagonal => {
                let opcode = match request.direction {
                    ScrollDirection::Right => VERTICAL_RIGHT_SCROLL,
                    ScrollDirection::Left => VERTICAL_LEFT_SCROLL,
                };
                bus.send_command(&[SET_VERTICAL_SCROLL_AREA, 0x00, self.panel.height() as u8])?;
                bus.send_command(&[opcode, 0x00, request.start_row, speed, request.end_row, 0x01])?;
            }
        }
        bus.send_command(&[ACTIVATE_SCROLL])
    }
}
