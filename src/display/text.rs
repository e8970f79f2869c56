/*
 *  display/text.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text layout - fixed and proportional placement, clip windows, marquee
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

use crate::display::glyphs::{code_for, draw_glyph_columns, FixedFont, Font};
use crate::display::scroll::{ScrollParams, LOOP_GAP};
use crate::display::traits::PixelTarget;

/// Half-open rectangle `[x0, x1) x [y0, y1)` inside the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl ClipWindow {
    /// Intersect the box at `(x, y)` with a `target_w` x `target_h` target.
    ///
    /// Never yields a negative origin or an edge past the target; `None`
    /// when nothing of the box is on screen.
    pub fn clamped(x: i32, y: i32, w: i32, h: i32, target_w: u32, target_h: u32) -> Option<Self> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w.max(0)).min(target_w as i32);
        let y1 = y.saturating_add(h.max(0)).min(target_h as i32);
        (x1 > x0 && y1 > y0).then_some(ClipWindow { x0, y0, x1, y1 })
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Pixel target that drops every write outside its window.
pub struct Clipped<'a, T: PixelTarget + ?Sized> {
    inner: &'a mut T,
    window: ClipWindow,
}

impl<'a, T: PixelTarget + ?Sized> Clipped<'a, T> {
    pub fn new(inner: &'a mut T, window: ClipWindow) -> Self {
        Self { inner, window }
    }
}

impl<T: PixelTarget + ?Sized> PixelTarget for Clipped<'_, T> {
    fn width(&self) -> u32 { self.inner.width() }
    fn height(&self) -> u32 { self.inner.height() }

    fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        if self.window.contains(x, y) {
            self.inner.set_pixel(x, y, color);
        }
    }
}

/// Rendered width of `text` in pixels.
pub fn text_width<F: Font + ?Sized>(font: &F, text: &str, size: u32) -> i32 {
    let size = size.max(1) as i32;
    text.chars().map(|c| font.advance(code_for(c)) * size).sum()
}

/// Draw `text` with `font`, returning the cursor x after the last glyph.
pub fn draw_str<T, F>(target: &mut T, font: &F, x: i32, y: i32, text: &str, size: u32, color: BinaryColor) -> i32
where
    T: PixelTarget + ?Sized,
    F: Font + ?Sized,
{
    let scale = size.max(1) as i32;
    let mut cursor = x;
    let right = target.width() as i32;
    for ch in text.chars() {
        if cursor >= right {
            break;
        }
        let code = code_for(ch);
        let advance = font.advance(code) * scale;
        // glyphs fully left of the target still advance the cursor
        if cursor + 8 * scale > 0 {
            draw_glyph_columns(target, cursor, y, code, font.first_column(code), size, color);
        }
        cursor += advance;
    }
    cursor
}

/// Fixed-cell text truncated to `max_len` characters; never wraps.
pub fn draw_text<T: PixelTarget + ?Sized>(
    target: &mut T,
    x: i32,
    y: i32,
    text: &str,
    max_len: usize,
    size: u32,
    color: BinaryColor,
) -> i32 {
    let end = text.char_indices().nth(max_len).map_or(text.len(), |(i, _)| i);
    draw_str(target, &FixedFont, x, y, &text[..end], size, color)
}

/// Marquee: text wider than the box loops leftwards, sliced at the box edges.
///
/// Text that fits is drawn as-is. Otherwise `text + gap + text` is drawn
/// shifted by `params.pixel_shift(elapsed_secs, ..)` and clipped to the
/// box, itself clamped to the target.
#[allow(clippy::too_many_arguments)]
pub fn draw_text_scroll<T, F>(
    target: &mut T,
    font: &F,
    x: i32,
    y: i32,
    text: &str,
    params: &ScrollParams,
    elapsed_secs: f64,
    box_w: i32,
    box_h: i32,
    color: BinaryColor,
) where
    T: PixelTarget + ?Sized,
    F: Font + ?Sized,
{
    let width = text_width(font, text, 1);
    if width <= box_w {
        draw_str(target, font, x, y, text, 1, color);
        return;
    }

    let loop_width = width + text_width(font, LOOP_GAP, 1);
    let shift = params.pixel_shift(elapsed_secs, loop_width);

    let Some(window) = ClipWindow::clamped(x, y, box_w, box_h, target.width(), target.height()) else {
        return;
    };
    let looped = format!("{text}{LOOP_GAP}{text}");
    let mut clipped = Clipped::new(target, window);
    draw_str(&mut clipped, font, x - shift, y, &looped, 1, color);
}
