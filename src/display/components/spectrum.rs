/*
 *  display/components/spectrum.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spectrum bar graph
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

use crate::display::error::DisplayError;
use crate::display::layout::Area;
use crate::display::primitives::{draw_fast_hline, fill_rect};
use crate::display::traits::PixelTarget;

/// Bar width and tallest bar for `bars` bars in `area`.
pub fn bar_geometry(area: Area, bars: usize, gap: i32) -> Result<(i32, i32), DisplayError> {
    let n = bars as i32;
    if n == 0 {
        return Err(DisplayError::LayoutTooSmall("no spectrum bars".into()));
    }
    let bar_w = (area.w - (n - 1) * gap) / n;
    let max_h = area.h - 2;
    if bar_w < 1 || max_h < 1 {
        return Err(DisplayError::LayoutTooSmall(format!(
            "{} bars with gap {} in {}x{}",
            bars, gap, area.w, area.h
        )));
    }
    Ok((bar_w, max_h))
}

/// Baseline plus one filled bar per height, scaled from 0..=255.
pub fn draw_spectrum<T: PixelTarget + ?Sized>(
    target: &mut T,
    area: Area,
    heights: &[u8],
    gap: i32,
) -> Result<(), DisplayError> {
    let (bar_w, max_h) = bar_geometry(area, heights.len(), gap)?;
    let n = heights.len() as i32;
    let graph_w = n * bar_w + (n - 1) * gap;

    draw_fast_hline(target, area.x, area.y + area.h - 1, graph_w, BinaryColor::On);
    for (i, &v) in heights.iter().enumerate() {
        let val = (max_h as f32 * v as f32 / 255.0).round() as i32;
        if val == 0 {
            continue;
        }
        let x = area.x + i as i32 * (bar_w + gap);
        let y = (area.y + area.h - val - 2).max(0);
        fill_rect(target, x, y, bar_w, val, BinaryColor::On);
    }
    Ok(())
}
