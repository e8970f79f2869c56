/*
 *  display/layout.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen layouts per panel geometry
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

use crate::display::glyphs::{CELL_HEIGHT, CELL_WIDTH};
use crate::display::traits::DisplayCapabilities;

/// Connection icon footprint
pub const ICON_WIDTH: i32 = 2 * CELL_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

const fn pos(x: i32, y: i32) -> Pos {
    Pos { x, y }
}

const fn area(x: i32, y: i32, w: i32, h: i32) -> Area {
    Area { x, y, w, h }
}

/// Layout category based on display resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCategory {
    /// 128x64, the full layout
    Standard,
    /// 128x32
    Short,
    /// 96x96
    Square,
}

/// Idle screen: address, connection, big clock, date
#[derive(Debug, Clone, PartialEq)]
pub struct ClockLayout {
    pub ip: Pos,
    pub ip_max_chars: usize,
    pub connection: Pos,
    pub time: Pos,
    pub time_size: u32,
    /// None where the glass has no room
    pub date: Option<Pos>,
}

/// Now playing screen
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingLayout {
    pub spectrum: Area,
    pub connection: Pos,
    pub volume: Area,
    pub bitrate: Pos,
    pub time: Pos,
    pub time_size: u32,
    pub origin: Pos,
    pub title: Pos,
    /// Marquee box shared by title and origin
    pub marquee_w: i32,
    pub marquee_h: i32,
    pub progress: Area,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub category: LayoutCategory,
    pub clock: ClockLayout,
    pub playing: PlayingLayout,
}

impl LayoutConfig {
    /// Pick the preset that fits the panel
    pub fn for_display(capabilities: &DisplayCapabilities) -> Self {
        Self::for_size(capabilities.width, capabilities.height)
    }

    pub fn for_size(width: u32, height: u32) -> Self {
        match Self::categorize_display(width, height) {
            LayoutCategory::Standard => Self::standard_layout(width, height),
            LayoutCategory::Short => Self::short_layout(width, height),
            LayoutCategory::Square => Self::square_layout(width, height),
        }
    }

    fn categorize_display(width: u32, height: u32) -> LayoutCategory {
        match (width, height) {
            (_, h) if h < 64 => LayoutCategory::Short,
            (w, _) if w < 128 => LayoutCategory::Square,
            _ => LayoutCategory::Standard,
        }
    }

    /// x offset so a 12h clock with its trailing dot still fits
    pub fn clock_offset(clock_format: u8) -> i32 {
        if clock_format < 2 { 0 } else { -2 }
    }

    fn standard_layout(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        let (cw, ch) = (CELL_WIDTH, CELL_HEIGHT);
        Self {
            width,
            height,
            category: LayoutCategory::Standard,
            clock: ClockLayout {
                ip: pos(22, 0),
                ip_max_chars: 16,
                connection: pos(w - ICON_WIDTH, 0),
                time: pos(4, 16),
                time_size: 4,
                date: Some(pos(32, 56)),
            },
            playing: PlayingLayout {
                spectrum: area(0, 0, 64, 32),
                connection: pos(w - ICON_WIDTH, 0),
                volume: area(w - 5 * cw, 1, 11, 6),
                bitrate: pos(w - 10 * cw, 0),
                time: pos(w - 10 * cw, 2 * ch),
                time_size: 2,
                origin: pos(0, 4 * ch + 4),
                title: pos(0, 6 * ch),
                marquee_w: w,
                marquee_h: ch,
                progress: area(0, h - 2, w, 2),
            },
        }
    }

    fn short_layout(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        let cw = CELL_WIDTH;
        Self {
            width,
            height,
            category: LayoutCategory::Short,
            clock: ClockLayout {
                ip: pos(22, 0),
                ip_max_chars: 16,
                connection: pos(w - ICON_WIDTH, 0),
                time: pos(19, 8),
                time_size: 3,
                date: None,
            },
            playing: PlayingLayout {
                spectrum: area(0, 0, 64, 16),
                connection: pos(w - ICON_WIDTH, 0),
                volume: area(w - 5 * cw, 1, 11, 6),
                bitrate: pos(w - 10 * cw, 0),
                time: pos(w - 10 * cw, 8),
                time_size: 1,
                origin: pos(0, 16),
                title: pos(0, 23),
                marquee_w: w,
                marquee_h: 7,
                progress: area(0, h - 1, w, 1),
            },
        }
    }

    fn square_layout(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        let ch = CELL_HEIGHT;
        Self {
            width,
            height,
            category: LayoutCategory::Square,
            clock: ClockLayout {
                ip: pos(0, 0),
                ip_max_chars: 14,
                connection: pos(w - ICON_WIDTH, 0),
                time: pos(3, 24),
                time_size: 3,
                date: Some(pos(18, 64)),
            },
            playing: PlayingLayout {
                spectrum: area(0, 0, 64, 32),
                connection: pos(w - ICON_WIDTH, 0),
                volume: area(70, 1, 11, 6),
                bitrate: pos(68, 2 * ch - 4),
                time: pos(18, 5 * ch),
                time_size: 2,
                origin: pos(0, 8 * ch),
                title: pos(0, 9 * ch + 4),
                marquee_w: w,
                marquee_h: ch,
                progress: area(0, h - 2, w, 2),
            },
        }
    }
}
