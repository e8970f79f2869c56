/*
 *  display/glyphs.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  8x8 column-major ASCII font and glyph rasterizer
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

use crate::display::primitives::fill_rect;
use crate::display::traits::PixelTarget;

pub const FONT_FIRST: u8 = 32;
pub const FONT_LAST: u8 = 127;

/// Fixed cell advance; glyph columns 6 and 7 are always blank
pub const CELL_WIDTH: i32 = 6;
pub const CELL_HEIGHT: i32 = 8;

/// Space used by the proportional font, which has no inked columns to measure
const PROPORTIONAL_SPACE: i32 = 3;

/// One byte per column, bit 0 is the top row.
pub type Glyph = [u8; 8];

static FONT_8X8: [Glyph; (FONT_LAST - FONT_FIRST + 1) as usize] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5F, 0x00, 0x00, 0x00, 0x00, 0x00], // !
    [0x00, 0x00, 0x07, 0x00, 0x07, 0x00, 0x00, 0x00], // "
    [0x00, 0x14, 0x7F, 0x14, 0x7F, 0x14, 0x00, 0x00], // #
    [0x00, 0x24, 0x2A, 0x7F, 0x2A, 0x12, 0x00, 0x00], // $
    [0x00, 0x23, 0x13, 0x08, 0x64, 0x62, 0x00, 0x00], // %
    [0x00, 0x36, 0x49, 0x55, 0x22, 0x50, 0x00, 0x00], // &
    [0x00, 0x00, 0x05, 0x03, 0x00, 0x00, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00, 0x00, 0x00, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00, 0x00, 0x00, 0x00], // )
    [0x00, 0x08, 0x2A, 0x1C, 0x2A, 0x08, 0x00, 0x00], // *
    [0x00, 0x08, 0x08, 0x3E, 0x08, 0x08, 0x00, 0x00], // +
    [0x00, 0xA0, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00], // ,
    [0x00, 0x08, 0x08, 0x08, 0x08, 0x08, 0x00, 0x00], // -
    [0x00, 0x60, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00], // .
    [0x00, 0x20, 0x10, 0x08, 0x04, 0x02, 0x00, 0x00], // /
    [0x00, 0x3E, 0x51, 0x49, 0x45, 0x3E, 0x00, 0x00], // 0
    [0x00, 0x00, 0x42, 0x7F, 0x40, 0x00, 0x00, 0x00], // 1
    [0x00, 0x62, 0x51, 0x49, 0x49, 0x46, 0x00, 0x00], // 2
    [0x00, 0x22, 0x41, 0x49, 0x49, 0x36, 0x00, 0x00], // 3
    [0x00, 0x18, 0x14, 0x12, 0x7F, 0x10, 0x00, 0x00], // 4
    [0x00, 0x27, 0x45, 0x45, 0x45, 0x39, 0x00, 0x00], // 5
    [0x00, 0x3C, 0x4A, 0x49, 0x49, 0x30, 0x00, 0x00], // 6
    [0x00, 0x01, 0x71, 0x09, 0x05, 0x03, 0x00, 0x00], // 7
    [0x00, 0x36, 0x49, 0x49, 0x49, 0x36, 0x00, 0x00], // 8
    [0x00, 0x06, 0x49, 0x49, 0x29, 0x1E, 0x00, 0x00], // 9
    [0x00, 0x00, 0x36, 0x36, 0x00, 0x00, 0x00, 0x00], // :
    [0x00, 0x00, 0xAC, 0x6C, 0x00, 0x00, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41, 0x00, 0x00, 0x00], // <
    [0x00, 0x14, 0x14, 0x14, 0x14, 0x14, 0x00, 0x00], // =
    [0x00, 0x41, 0x22, 0x14, 0x08, 0x00, 0x00, 0x00], // >
    [0x00, 0x02, 0x01, 0x51, 0x09, 0x06, 0x00, 0x00], // ?
    [0x00, 0x32, 0x49, 0x79, 0x41, 0x3E, 0x00, 0x00], // @
    [0x00, 0x7E, 0x09, 0x09, 0x09, 0x7E, 0x00, 0x00], // A
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x36, 0x00, 0x00], // B
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x22, 0x00, 0x00], // C
    [0x00, 0x7F, 0x41, 0x41, 0x22, 0x1C, 0x00, 0x00], // D
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x41, 0x00, 0x00], // E
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x01, 0x00, 0x00], // F
    [0x00, 0x3E, 0x41, 0x41, 0x51, 0x72, 0x00, 0x00], // G
    [0x00, 0x7F, 0x08, 0x08, 0x08, 0x7F, 0x00, 0x00], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00, 0x00, 0x00, 0x00], // I
    [0x00, 0x20, 0x40, 0x41, 0x3F, 0x01, 0x00, 0x00], // J
    [0x00, 0x7F, 0x08, 0x14, 0x22, 0x41, 0x00, 0x00], // K
    [0x00, 0x7F, 0x40, 0x40, 0x40, 0x40, 0x00, 0x00], // L
    [0x00, 0x7F, 0x02, 0x0C, 0x02, 0x7F, 0x00, 0x00], // M
    [0x00, 0x7F, 0x04, 0x08, 0x10, 0x7F, 0x00, 0x00], // N
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x3E, 0x00, 0x00], // O
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x06, 0x00, 0x00], // P
    [0x00, 0x3E, 0x41, 0x51, 0x21, 0x5E, 0x00, 0x00], // Q
    [0x00, 0x7F, 0x09, 0x19, 0x29, 0x46, 0x00, 0x00], // R
    [0x00, 0x26, 0x49, 0x49, 0x49, 0x32, 0x00, 0x00], // S
    [0x00, 0x01, 0x01, 0x7F, 0x01, 0x01, 0x00, 0x00], // T
    [0x00, 0x3F, 0x40, 0x40, 0x40, 0x3F, 0x00, 0x00], // U
    [0x00, 0x1F, 0x20, 0x40, 0x20, 0x1F, 0x00, 0x00], // V
    [0x00, 0x3F, 0x40, 0x38, 0x40, 0x3F, 0x00, 0x00], // W
    [0x00, 0x63, 0x14, 0x08, 0x14, 0x63, 0x00, 0x00], // X
    [0x00, 0x03, 0x04, 0x78, 0x04, 0x03, 0x00, 0x00], // Y
    [0x00, 0x61, 0x51, 0x49, 0x45, 0x43, 0x00, 0x00], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00, 0x00, 0x00, 0x00], // [
    [0x00, 0x02, 0x04, 0x08, 0x10, 0x20, 0x00, 0x00], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00, 0x00, 0x00, 0x00], // ]
    [0x00, 0x04, 0x02, 0x01, 0x02, 0x04, 0x00, 0x00], // ^
    [0x00, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00, 0x00], // _
    [0x00, 0x01, 0x02, 0x04, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x20, 0x54, 0x54, 0x54, 0x78, 0x00, 0x00], // a
    [0x00, 0x7F, 0x48, 0x44, 0x44, 0x38, 0x00, 0x00], // b
    [0x00, 0x38, 0x44, 0x44, 0x28, 0x00, 0x00, 0x00], // c
    [0x00, 0x38, 0x44, 0x44, 0x48, 0x7F, 0x00, 0x00], // d
    [0x00, 0x38, 0x54, 0x54, 0x54, 0x18, 0x00, 0x00], // e
    [0x00, 0x08, 0x7E, 0x09, 0x02, 0x00, 0x00, 0x00], // f
    [0x00, 0x18, 0xA4, 0xA4, 0xA4, 0x7C, 0x00, 0x00], // g
    [0x00, 0x7F, 0x08, 0x04, 0x04, 0x78, 0x00, 0x00], // h
    [0x00, 0x00, 0x7D, 0x00, 0x00, 0x00, 0x00, 0x00], // i
    [0x00, 0x80, 0x84, 0x7D, 0x00, 0x00, 0x00, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44, 0x00, 0x00, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00, 0x00, 0x00, 0x00], // l
    [0x00, 0x7C, 0x04, 0x18, 0x04, 0x78, 0x00, 0x00], // m
    [0x00, 0x7C, 0x08, 0x04, 0x7C, 0x00, 0x00, 0x00], // n
    [0x00, 0x38, 0x44, 0x44, 0x38, 0x00, 0x00, 0x00], // o
    [0x00, 0xFC, 0x24, 0x24, 0x18, 0x00, 0x00, 0x00], // p
    [0x00, 0x18, 0x24, 0x24, 0xFC, 0x00, 0x00, 0x00], // q
    [0x00, 0x00, 0x7C, 0x08, 0x04, 0x00, 0x00, 0x00], // r
    [0x00, 0x48, 0x54, 0x54, 0x24, 0x00, 0x00, 0x00], // s
    [0x00, 0x04, 0x7F, 0x44, 0x00, 0x00, 0x00, 0x00], // t
    [0x00, 0x3C, 0x40, 0x40, 0x7C, 0x00, 0x00, 0x00], // u
    [0x00, 0x1C, 0x20, 0x40, 0x20, 0x1C, 0x00, 0x00], // v
    [0x00, 0x3C, 0x40, 0x30, 0x40, 0x3C, 0x00, 0x00], // w
    [0x00, 0x44, 0x28, 0x10, 0x28, 0x44, 0x00, 0x00], // x
    [0x00, 0x1C, 0xA0, 0xA0, 0x7C, 0x00, 0x00, 0x00], // y
    [0x00, 0x44, 0x64, 0x54, 0x4C, 0x44, 0x00, 0x00], // z
    [0x00, 0x08, 0x36, 0x41, 0x00, 0x00, 0x00, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00, 0x00, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00, 0x00, 0x00, 0x00], // }
    [0x00, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x00], // ~
    [0x00, 0x02, 0x05, 0x05, 0x02, 0x00, 0x00, 0x00], // DEL
];

/// Glyph for `code`; anything outside 32..=127 renders as a space.
#[inline]
pub fn glyph(code: u8) -> &'static Glyph {
    let idx = if (FONT_FIRST..=FONT_LAST).contains(&code) { code - FONT_FIRST } else { 0 };
    &FONT_8X8[idx as usize]
}

/// Map a `char` onto the font's code space (non-ASCII becomes a space).
#[inline]
pub fn code_for(ch: char) -> u8 {
    u8::try_from(ch as u32)
        .ok()
        .filter(|c| (FONT_FIRST..=FONT_LAST).contains(c))
        .unwrap_or(b' ')
}

/// Horizontal metrics of a font built on the 8x8 table.
pub trait Font {
    /// Cursor advance for `code` at size 1
    fn advance(&self, code: u8) -> i32;

    /// Glyph column that lands on the cursor position
    fn first_column(&self, code: u8) -> i32;

    fn height(&self) -> i32 {
        CELL_HEIGHT
    }
}

/// Every glyph occupies a 6 pixel cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedFont;

impl Font for FixedFont {
    fn advance(&self, _code: u8) -> i32 {
        CELL_WIDTH
    }

    fn first_column(&self, _code: u8) -> i32 {
        0
    }
}

/// Glyphs are trimmed to their inked columns plus one pixel of spacing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalFont;

impl ProportionalFont {
    fn inked(code: u8) -> Option<(i32, i32)> {
        let g = glyph(code);
        let first = g.iter().position(|&c| c != 0)?;
        let last = g.iter().rposition(|&c| c != 0)?;
        Some((first as i32, last as i32))
    }
}

impl Font for ProportionalFont {
    fn advance(&self, code: u8) -> i32 {
        match Self::inked(code) {
            Some((first, last)) => last - first + 2,
            None => PROPORTIONAL_SPACE,
        }
    }

    fn first_column(&self, code: u8) -> i32 {
        Self::inked(code).map_or(0, |(first, _)| first)
    }
}

/// Font picked by name in the config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Fixed,
    Proportional,
}

impl Font for FontStyle {
    fn advance(&self, code: u8) -> i32 {
        match self {
            FontStyle::Fixed => FixedFont.advance(code),
            FontStyle::Proportional => ProportionalFont.advance(code),
        }
    }

    fn first_column(&self, code: u8) -> i32 {
        match self {
            FontStyle::Fixed => FixedFont.first_column(code),
            FontStyle::Proportional => ProportionalFont.first_column(code),
        }
    }
}

/// Rasterize one glyph with its top-left cell corner at `(x, y)`.
///
/// `size > 1` replicates every source pixel into a `size x size` block.
/// Only inked pixels are written; the background is left alone.
pub fn draw_char<T: PixelTarget + ?Sized>(
    target: &mut T,
    x: i32,
    y: i32,
    code: u8,
    size: u32,
    color: BinaryColor,
) {
    draw_glyph_columns(target, x, y, code, 0, size, color);
}

/// As `draw_char`, with glyph column `first_col` placed at `x`.
pub(crate) fn draw_glyph_columns<T: PixelTarget + ?Sized>(
    target: &mut T,
    x: i32,
    y: i32,
    code: u8,
    first_col: i32,
    size: u32,
    color: BinaryColor,
) {
    let size = size.max(1) as i32;
    for (col, bits) in glyph(code).iter().enumerate() {
        if *bits == 0 {
            continue;
        }
        let px = x + (col as i32 - first_col) * size;
        for row in 0..CELL_HEIGHT {
            if bits & (1 << row) == 0 {
                continue;
            }
            let py = y + row * size;
            if size == 1 {
                target.set_pixel(px, py, color);
            } else {
                fill_rect(target, px, py, size, size, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::{AddressingMode, PixelBuffer};

    #[test]
    fn test_table_covers_printable_ascii() {
        assert_eq!(FONT_8X8.len(), 96);
        // columns 6 and 7 are blank throughout
        assert!(FONT_8X8.iter().all(|g| g[6] == 0 && g[7] == 0));
        assert_eq!(glyph(b'!')[2], 0x5F);
    }

    #[test]
    fn test_out_of_range_codes_are_space() {
        assert_eq!(glyph(0), glyph(b' '));
        assert_eq!(glyph(31), glyph(b' '));
        assert_eq!(glyph(200), glyph(b' '));
        assert_eq!(code_for('é'), b' ');
        assert_eq!(code_for('A'), b'A');
    }

    #[test]
    fn test_draw_char_bits() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        draw_char(&mut fb, 0, 0, b'!', 1, BinaryColor::On);
        // 0x5F in column 2: rows 0-4 and 6
        for row in 0..8 {
            assert_eq!(fb.get_pixel(2, row), row != 5 && row != 7, "row {row}");
        }
        assert_eq!(fb.count_lit(), 6);
        // paged layout means the column byte is the glyph byte
        assert_eq!(fb.as_bytes()[2], 0x5F);
    }

    #[test]
    fn test_draw_char_size_multiplier() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        draw_char(&mut fb, 10, 10, b'A', 3, BinaryColor::On);
        let lit_1x = glyph(b'A').iter().map(|c| c.count_ones() as usize).sum::<usize>();
        assert_eq!(fb.count_lit(), lit_1x * 9);
        // 'A' column 1 is 0x7E: row 0 off, row 1 on
        assert!(!fb.get_pixel(10 + 3, 10));
        assert!(fb.get_pixel(10 + 3, 10 + 3));
        assert!(fb.get_pixel(10 + 5, 10 + 5));
    }

    #[test]
    fn test_draw_char_clips_silently() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        draw_char(&mut fb, -3, -2, b'W', 2, BinaryColor::On);
        draw_char(&mut fb, 125, 60, b'W', 4, BinaryColor::On);
        assert!(fb.count_lit() > 0);
    }

    #[test]
    fn test_proportional_metrics() {
        let f = ProportionalFont;
        // '!' is a single column wide
        assert_eq!(f.advance(b'!'), 2);
        assert_eq!(f.first_column(b'!'), 2);
        assert_eq!(f.advance(b' '), 3);
        assert_eq!(f.advance(b'W'), 6);
        assert_eq!(FixedFont.advance(b'!'), CELL_WIDTH);
    }
}
