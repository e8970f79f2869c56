/*
 *  display/protocol/commands.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Controller opcodes shared by the SSD1306, SH1106 and SSD1327 families
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

// I2C control bytes: Co = 0, D/C# selects command or data
pub const I2C_CONTROL_COMMAND: u8 = 0x00;
pub const I2C_CONTROL_DATA: u8 = 0x40;

/// Size of every display RAM burst handed to the transport
pub const DATA_BURST: usize = 16;

// common to all three families
pub const DISPLAY_OFF: u8 = 0xAE;
pub const DISPLAY_ON: u8 = 0xAF;
pub const SET_CONTRAST: u8 = 0x81;
pub const SET_MULTIPLEX: u8 = 0xA8;
pub const INVERSE_DISPLAY: u8 = 0xA7;
pub const DEACTIVATE_SCROLL: u8 = 0x2E;
pub const ACTIVATE_SCROLL: u8 = 0x2F;
pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;

/// SSD1306 (and the SH1106 subset)
pub mod ssd1306 {
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const MEMORY_MODE_HORIZONTAL: u8 = 0x00;
    pub const SET_COLUMN_ADDRESS: u8 = 0x21;
    pub const SET_PAGE_ADDRESS: u8 = 0x22;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SEGMENT_REMAP: u8 = 0xA1;
    pub const COM_SCAN_REMAP: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOMH_DESELECT: u8 = 0xDB;
    pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const SET_VERTICAL_SCROLL_AREA: u8 = 0xA3;
    pub const VERTICAL_RIGHT_SCROLL: u8 = 0x29;
    pub const VERTICAL_LEFT_SCROLL: u8 = 0x2A;
}

/// SH1106 page addressing
pub mod sh1106 {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE: u8 = 0xB0;
    pub const SET_DC_DC: u8 = 0xAD;
    pub const DC_DC_ON: u8 = 0x8B;
    pub const PUMP_VOLTAGE: u8 = 0x30;
    /// RAM is 132 columns wide; the 128 visible ones start at 2
    pub const COLUMN_OFFSET: u8 = 0x02;
    pub const PAGES: u8 = 8;
}

/// SSD1327 grayscale
pub mod ssd1327 {
    pub const SET_COMMAND_LOCK: u8 = 0xFD;
    pub const UNLOCK: u8 = 0x12;
    pub const SET_COLUMN_ADDRESS: u8 = 0x15;
    pub const SET_ROW_ADDRESS: u8 = 0x75;
    pub const SET_REMAP: u8 = 0xA0;
    pub const SET_START_LINE: u8 = 0xA1;
    pub const SET_DISPLAY_OFFSET: u8 = 0xA2;
    pub const NORMAL_DISPLAY: u8 = 0xA4;
    pub const FUNCTION_SELECT_A: u8 = 0xAB;
    pub const SET_PHASE_LENGTH: u8 = 0xB1;
    pub const SET_CLOCK_DIV: u8 = 0xB3;
    pub const SET_SECOND_PRECHARGE_PERIOD: u8 = 0xB6;
    pub const LINEAR_GRAY_TABLE: u8 = 0xB9;
    pub const SET_PRECHARGE_VOLTAGE: u8 = 0xBC;
    pub const SET_VCOMH: u8 = 0xBE;
    pub const FUNCTION_SELECT_B: u8 = 0xD5;

    /// Column units are 2 px wide and the visible area starts at unit 8
    pub const COLUMN_OFFSET: u8 = 0x08;
    pub const COLUMN_END: u8 = 0x37;
    pub const ROW_END: u8 = 0x5F;
    /// Column/COM remap for the Seeed 96x96 module
    pub const REMAP: u8 = 0x46;
}

/// Frames between scroll steps, encoded the way SSD13xx expect them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollSpeed {
    Frames2,
    Frames3,
    Frames4,
    #[default]
    Frames5,
    Frames25,
    Frames64,
    Frames128,
    Frames256,
}

impl ScrollSpeed {
    pub fn code(self) -> u8 {
        match self {
            ScrollSpeed::Frames2 => 0x07,
            ScrollSpeed::Frames3 => 0x04,
            ScrollSpeed::Frames4 => 0x05,
            ScrollSpeed::Frames5 => 0x00,
            ScrollSpeed::Frames25 => 0x06,
            ScrollSpeed::Frames64 => 0x01,
            ScrollSpeed::Frames128 => 0x02,
            ScrollSpeed::Frames256 => 0x03,
        }
    }
}
