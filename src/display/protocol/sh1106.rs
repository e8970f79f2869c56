/*
 *  display/protocol/sh1106.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  SH1106 command set - explicit page addressing, no scroll engine
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

use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;
use crate::display::panel::{PanelFamily, PanelType};
use crate::display::protocol::commands::sh1106::*;
use crate::display::protocol::commands::ssd1306::{
    COM_SCAN_REMAP, NORMAL_DISPLAY, SEGMENT_REMAP, SET_CLOCK_DIV, SET_COM_PINS, SET_DISPLAY_OFFSET,
    SET_PRECHARGE, SET_START_LINE, SET_VCOMH_DESELECT,
};
use crate::display::protocol::commands::{DISPLAY_OFF, SET_MULTIPLEX};
use crate::display::protocol::{stream, ControllerProtocol, ScrollRequest};
use crate::display::traits::DisplayTransport;

/// SH1106 132-column controllers driving a 128x64 glass
#[derive(Debug, Clone, Copy)]
pub struct Sh1106Protocol {
    panel: PanelType,
}

impl Sh1106Protocol {
    pub fn new(panel: PanelType) -> Self {
        Self { panel }
    }
}

impl ControllerProtocol for Sh1106Protocol {
    fn family(&self) -> PanelFamily {
        PanelFamily::Sh1106
    }

    fn panel(&self) -> PanelType {
        self.panel
    }

    fn configure(&self, bus: &mut dyn DisplayTransport) -> Result<(), DisplayError> {
        let params = self.panel.bring_up_params();

        bus.send_command(&[DISPLAY_OFF])?;
        bus.send_command(&[SET_MULTIPLEX, params.multiplex])?;
        bus.send_command(&[SET_LOW_COLUMN | COLUMN_OFFSET])?;
        bus.send_command(&[SET_HIGH_COLUMN])?;
        bus.send_command(&[SET_START_LINE])?;
        bus.send_command(&[SET_PAGE])?;
        bus.send_command(&[SEGMENT_REMAP])?;
        bus.send_command(&[NORMAL_DISPLAY])?;
        bus.send_command(&[SET_DC_DC, DC_DC_ON])?;
        bus.send_command(&[PUMP_VOLTAGE])?;
        bus.send_command(&[COM_SCAN_REMAP])?;
        bus.send_command(&[SET_DISPLAY_OFFSET, 0x00])?;
        bus.send_command(&[SET_CLOCK_DIV, 0x80])?;
        bus.send_command(&[SET_PRECHARGE, 0x1F])?;
        bus.send_command(&[SET_COM_PINS, params.com_pins])?;
        bus.send_command(&[SET_VCOMH_DESELECT, 0x40])
    }

    fn normal_display_opcode(&self) -> u8 {
        NORMAL_DISPLAY
    }

    /// No auto-increment across pages: each page is addressed on its own.
    fn flush(&self, bus: &mut dyn DisplayTransport, fb: &PixelBuffer) -> Result<(), DisplayError> {
        let row = fb.width() as usize;
        for (page, bytes) in fb.as_bytes().chunks(row).take(PAGES as usize).enumerate() {
            bus.send_command(&[SET_PAGE + page as u8])?;
            bus.send_command(&[SET_LOW_COLUMN | COLUMN_OFFSET])?;
            bus.send_command(&[SET_HIGH_COLUMN])?;
            stream(bus, bytes)?;
        }
        Ok(())
    }

    fn start_scroll(&self, _bus: &mut dyn DisplayTransport, _request: &ScrollRequest) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }
}
