/*
 *  display/components/clock.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time and date text
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

use chrono::{DateTime, TimeZone, Timelike};
use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::display::framebuffer::PixelBuffer;
use crate::display::layout::Pos;
use crate::display::text::draw_text;
use crate::display::traits::PixelTarget;

/// strftime pattern for clock formats 0..=3
fn time_pattern(clock_format: u8) -> &'static str {
    match clock_format {
        1 => "%k:%M",
        2 => "%I:%M",
        3 => "%l:%M",
        _ => "%H:%M",
    }
}

/// `HH:MM` in the chosen format; 12h formats mark the afternoon with a dot.
pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>, clock_format: u8) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut s = now.format(time_pattern(clock_format)).to_string();
    if clock_format >= 2 && now.hour() >= 12 {
        s.push('.');
    }
    s
}

pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>, date_format: u8) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let pattern = if date_format == 1 { "%m-%d-%Y" } else { "%d-%m-%Y" };
    now.format(pattern).to_string()
}

/// Time in the 8x8 cell font scaled by `size`
pub fn draw_time<T: PixelTarget + ?Sized>(target: &mut T, at: Pos, size: u32, text: &str) {
    draw_text(target, at.x, at.y, text, 6, size, BinaryColor::On);
}

/// Date in a compact 5x8 face
pub fn draw_date(fb: &mut PixelBuffer, at: Pos, text: &str) {
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    // the buffer's DrawTarget clips silently and never fails
    let _ = Text::with_baseline(text, Point::new(at.x, at.y), style, Baseline::Top).draw(fb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::AddressingMode;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, h, m, 0).unwrap()
    }

    #[test]
    fn test_format_time_variants() {
        assert_eq!(format_time(&at(9, 5), 0), "09:05");
        assert_eq!(format_time(&at(9, 5), 1), " 9:05");
        assert_eq!(format_time(&at(9, 5), 2), "09:05");
        assert_eq!(format_time(&at(21, 5), 2), "09:05.");
        assert_eq!(format_time(&at(21, 5), 3), " 9:05.");
        assert_eq!(format_time(&at(12, 0), 3), "12:00.");
        assert_eq!(format_time(&at(0, 30), 2), "12:30");
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date(&at(0, 0), 0), "07-03-2026");
        assert_eq!(format_date(&at(0, 0), 1), "03-07-2026");
    }

    #[test]
    fn test_draw_date_through_draw_target() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        draw_date(&mut fb, Pos { x: 32, y: 56 }, "07-03-2026");
        assert!(fb.count_lit() > 0);
        // nothing left of the start column or above the row
        for y in 0..64 {
            assert!(!fb.get_pixel(31, y));
        }
        for x in 0..128 {
            assert!(!fb.get_pixel(x, 55));
        }
    }

    #[test]
    fn test_draw_time_scales() {
        let mut small = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        let mut big = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        draw_time(&mut small, Pos { x: 0, y: 0 }, 1, "12:34");
        draw_time(&mut big, Pos { x: 0, y: 0 }, 2, "12:34");
        assert_eq!(big.count_lit(), 4 * small.count_lit());
    }
}
