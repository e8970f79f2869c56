/*
 *  display/framebuffer.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel-native pixel buffer (paged 1bpp or nibble packed 4bpp)
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

use core::convert::Infallible;
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
};

use crate::display::traits::PixelTarget;

/// How pixels map onto the controller's display RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// 1 bit per pixel, 8 rows per byte, bytes run across the page (SSD1306)
    PagedMono,
    /// 2 pixels per byte, 4-bit gray (SSD1327)
    NibblePacked,
    /// Same packing as `PagedMono`, pushed a page at a time (SH1106)
    ByteColumn,
}

impl AddressingMode {
    /// Backing store size in bytes for a `width` x `height` panel.
    pub fn buffer_len(self, width: u32, height: u32) -> usize {
        let px = width as usize * height as usize;
        match self {
            AddressingMode::PagedMono | AddressingMode::ByteColumn => px / 8,
            AddressingMode::NibblePacked => px / 2,
        }
    }
}

const GRAY_DEFAULT: u8 = 0x0F;

/// In-memory image of the panel's display RAM.
///
/// Owns exactly `buffer_len(width, height)` bytes; the layout is what the
/// controller expects on the wire so flushing is a straight copy.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    mode: AddressingMode,
    /// gray written into the high nibble
    gray_h: u8,
    /// gray written into the low nibble
    gray_l: u8,
    /// 180 degree software flip applied to every write
    flipped: bool,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, mode: AddressingMode) -> Self {
        Self {
            width,
            height,
            mode,
            gray_h: GRAY_DEFAULT << 4,
            gray_l: GRAY_DEFAULT,
            flipped: false,
            data: vec![0u8; mode.buffer_len(width, height)],
        }
    }

    #[inline] pub fn width(&self) -> u32 { self.width }
    #[inline] pub fn height(&self) -> u32 { self.height }
    #[inline] pub fn mode(&self) -> AddressingMode { self.mode }
    #[inline] pub fn size(&self) -> usize { self.data.len() }
    #[inline] pub fn as_bytes(&self) -> &[u8] { &self.data }

    /// Foreground gray (0..=15) used for "on" pixels in nibble mode.
    pub fn set_gray_level(&mut self, level: u8) {
        self.gray_h = (level << 4) & 0xF0;
        self.gray_l = level & 0x0F;
    }

    /// Current foreground gray level
    pub fn gray_level(&self) -> u8 {
        self.gray_l
    }

    /// Pre-shifted nibble values, high then low.
    pub fn gray_nibbles(&self) -> (u8, u8) {
        (self.gray_h, self.gray_l)
    }

    /// Mirror all subsequent writes through the panel centre.
    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Zero the backing store. Gray levels are kept.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn transform(&self, x: i32, y: i32) -> (i32, i32) {
        if self.flipped {
            (self.width as i32 - 1 - x, self.height as i32 - 1 - y)
        } else {
            (x, y)
        }
    }

    /// Byte index and (mask) for an in-bounds, already transformed pixel.
    #[inline]
    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        let w = self.width as usize;
        match self.mode {
            AddressingMode::PagedMono | AddressingMode::ByteColumn => {
                (x as usize + (y as usize / 8) * w, 1u8 << (y % 8))
            }
            // even rows take the high nibble, odd rows the low nibble
            AddressingMode::NibblePacked => {
                let mask = if y % 2 == 0 { 0xF0 } else { 0x0F };
                (x as usize + (y as usize / 2) * w, mask)
            }
        }
    }

    /// Set or clear one pixel; out of range is a no-op.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !self.in_bounds(x, y) {
            return;
        }
        let (x, y) = self.transform(x, y);
        let (idx, mask) = self.locate(x as u32, y as u32);
        let Some(byte) = self.data.get_mut(idx) else { return };
        match self.mode {
            AddressingMode::PagedMono | AddressingMode::ByteColumn => {
                if on { *byte |= mask } else { *byte &= !mask }
            }
            AddressingMode::NibblePacked => {
                let value = if !on {
                    0
                } else if mask == 0xF0 {
                    self.gray_h
                } else {
                    self.gray_l
                };
                *byte = (*byte & !mask) | value;
            }
        }
    }

    /// True when the pixel is lit (any nonzero gray). Out of range reads off.
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let (x, y) = self.transform(x, y);
        let (idx, mask) = self.locate(x as u32, y as u32);
        self.data.get(idx).is_some_and(|b| b & mask != 0)
    }

    /// Replace the whole store, e.g. with a captured frame.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), crate::display::DisplayError> {
        if bytes.len() != self.data.len() {
            return Err(crate::display::DisplayError::BufferSizeMismatch {
                expected: self.data.len(),
                actual: bytes.len(),
            });
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Number of lit pixels, handy in tests and frame diagnostics
    pub fn count_lit(&self) -> usize {
        let mut n = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.get_pixel(x, y) {
                    n += 1;
                }
            }
        }
        n
    }
}

impl PixelTarget for PixelBuffer {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }

    fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        PixelBuffer::set_pixel(self, x, y, color.is_on());
    }

    // paged modes: a vertical run touches at most one byte per page
    fn vline(&mut self, x: i32, y: i32, h: i32, color: BinaryColor) {
        if self.mode == AddressingMode::NibblePacked || self.flipped {
            for j in y..y.saturating_add(h) {
                PixelBuffer::set_pixel(self, x, j, color.is_on());
            }
            return;
        }
        if x < 0 || x >= self.width as i32 || h <= 0 {
            return;
        }
        let y0 = y.max(0);
        let y1 = y.saturating_add(h).min(self.height as i32);
        let mut row = y0;
        while row < y1 {
            let page_end = ((row / 8) + 1) * 8;
            let run_end = page_end.min(y1);
            let lo = (row % 8) as u32;
            let hi = ((run_end - 1) % 8) as u32;
            let mask = ((0xFFu16 << lo) & (0xFFu16 >> (7 - hi))) as u8;
            let idx = x as usize + (row as usize / 8) * self.width as usize;
            if let Some(byte) = self.data.get_mut(idx) {
                if color.is_on() { *byte |= mask } else { *byte &= !mask }
            }
            row = run_end;
        }
    }
}

impl DrawTarget for PixelBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels.into_iter() {
            PixelBuffer::set_pixel(self, coord.x, coord.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        match (color, self.mode) {
            (BinaryColor::Off, _) => self.data.fill(0),
            (BinaryColor::On, AddressingMode::NibblePacked) => {
                let v = self.gray_h | self.gray_l;
                self.data.fill(v);
            }
            (BinaryColor::On, _) => self.data.fill(0xFF),
        }
        Ok(())
    }
}

impl OriginDimensions for PixelBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_buffer_sizes() {
        assert_eq!(PixelBuffer::new(128, 64, AddressingMode::PagedMono).size(), 1024);
        assert_eq!(PixelBuffer::new(128, 32, AddressingMode::ByteColumn).size(), 512);
        assert_eq!(PixelBuffer::new(96, 96, AddressingMode::NibblePacked).size(), 4608);
    }

    #[test]
    fn test_paged_first_two_rows() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        fb.set_pixel(0, 0, true);
        fb.set_pixel(0, 1, true);
        assert_eq!(fb.as_bytes()[0], 0b0000_0011);
    }

    #[test]
    fn test_paged_addressing_formula() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        fb.set_pixel(5, 19, true);
        // page 2, bit 3
        assert_eq!(fb.as_bytes()[5 + 2 * 128], 1 << 3);
        fb.set_pixel(5, 19, false);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_nibble_gray_scenario() {
        let mut fb = PixelBuffer::new(96, 96, AddressingMode::NibblePacked);
        fb.set_gray_level(0xF);
        fb.set_pixel(0, 0, true);
        assert_eq!(fb.as_bytes()[0], 0xF0);
        fb.set_pixel(0, 1, true);
        assert_eq!(fb.as_bytes()[0], 0xFF);
    }

    #[test]
    fn test_nibble_preserves_neighbour() {
        let mut fb = PixelBuffer::new(96, 96, AddressingMode::NibblePacked);
        fb.set_gray_level(0x7);
        fb.set_pixel(3, 4, true);
        fb.set_pixel(3, 5, true);
        assert_eq!(fb.as_bytes()[3 + 2 * 96], 0x77);
        fb.set_pixel(3, 4, false);
        assert_eq!(fb.as_bytes()[3 + 2 * 96], 0x07);
        assert!(fb.get_pixel(3, 5));
        assert!(!fb.get_pixel(3, 4));
    }

    #[test]
    fn test_set_get_every_pixel_all_modes() {
        for mode in [AddressingMode::PagedMono, AddressingMode::ByteColumn, AddressingMode::NibblePacked] {
            let (w, h) = if mode == AddressingMode::NibblePacked { (96, 96) } else { (128, 64) };
            let mut fb = PixelBuffer::new(w, h, mode);
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    // neighbours sharing the byte stay untouched
                    let before = fb.clone();
                    fb.set_pixel(x, y, true);
                    assert!(fb.get_pixel(x, y), "{mode:?} ({x},{y})");
                    fb.set_pixel(x, y, false);
                    assert_eq!(fb.as_bytes(), before.as_bytes(), "{mode:?} ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        fb.set_pixel(10, 10, true);
        let before = fb.as_bytes().to_vec();
        for (x, y) in [(-1, 0), (0, -1), (128, 0), (0, 64), (i32::MAX, i32::MIN)] {
            fb.set_pixel(x, y, true);
        }
        assert_eq!(fb.as_bytes(), &before[..]);
        assert!(!fb.get_pixel(-1, -1));
    }

    #[test]
    fn test_clear_keeps_gray_level() {
        let mut fb = PixelBuffer::new(96, 96, AddressingMode::NibblePacked);
        fb.set_gray_level(0x3);
        fb.set_pixel(1, 1, true);
        fb.clear();
        assert_eq!(fb.count_lit(), 0);
        fb.set_pixel(1, 0, true);
        assert_eq!(fb.as_bytes()[1], 0x30);
    }

    #[test]
    fn test_fast_vline_matches_pixels() {
        for (y, h) in [(0, 64), (3, 2), (5, 13), (-4, 9), (60, 20), (7, 1), (8, 8)] {
            let mut fast = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
            let mut slow = fast.clone();
            fast.vline(9, y, h, BinaryColor::On);
            for j in y..y + h {
                slow.set_pixel(9, j, true);
            }
            assert_eq!(fast.as_bytes(), slow.as_bytes(), "y={y} h={h}");
        }
    }

    #[test]
    fn test_flipped_writes_mirror() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        fb.set_flipped(true);
        fb.set_pixel(0, 0, true);
        assert_eq!(fb.as_bytes()[127 + 7 * 128], 0x80);
        assert!(fb.get_pixel(0, 0));
    }

    #[test]
    fn test_embedded_graphics_draw_target() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        Line::new(Point::new(0, 0), Point::new(10, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_lit(), 11);
        assert_eq!(OriginDimensions::size(&fb), Size::new(128, 64));
    }

    #[test]
    fn test_load_rejects_wrong_size() {
        let mut fb = PixelBuffer::new(128, 64, AddressingMode::PagedMono);
        assert!(fb.load(&[0xFF; 512]).is_err());
        fb.load(&[0xFF; 1024]).unwrap();
        assert_eq!(fb.count_lit(), 128 * 64);
    }
}
