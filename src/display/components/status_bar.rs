/*
 *  display/components/status_bar.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Connection icon, volume wedge, progress and framed sliders
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

use crate::display::glyphs::CELL_HEIGHT;
use crate::display::layout::{Area, Pos};
use crate::display::primitives::{draw_fast_hline, draw_pixel, draw_rect, fill_rect, fill_triangle};
use crate::display::traits::PixelTarget;
use crate::status::{ConnectionInfo, ConnectionKind};

const ON: BinaryColor = BinaryColor::On;

/// 12x8 connection indicator: wifi bars, an ethernet plug, or nothing.
pub fn draw_connection<T: PixelTarget + ?Sized>(target: &mut T, at: Pos, conn: &ConnectionInfo) {
    let Pos { x, y } = at;
    match conn.kind {
        ConnectionKind::Wifi => {
            let signal = conn.quality as i32;
            for i in 0..4 {
                if signal <= 20 * i {
                    break;
                }
                let ht = 2 * i + 1;
                let x_off = 3 * i + 1;
                fill_rect(target, x + x_off, y + CELL_HEIGHT - (1 + ht), 2, ht, ON);
            }
        }
        ConnectionKind::Ethernet => {
            let w = 10;
            draw_pixel(target, x + 3, y, ON);
            draw_fast_hline(target, x + 2, y + 1, w - 1, ON);
            draw_fast_hline(target, x + 1, y + 2, w, ON);
            draw_fast_hline(target, x + 1, y + 4, w, ON);
            draw_fast_hline(target, x + 1, y + 5, w - 1, ON);
            draw_pixel(target, x + w - 2, y + 6, ON);
        }
        ConnectionKind::None => {}
    }
}

fn percent_of(len: i32, percent: f64) -> i32 {
    (len as f64 * percent.clamp(0.0, 100.0) / 100.0).round() as i32
}

/// Outline with a proportional inner fill
pub fn draw_slider<T: PixelTarget + ?Sized>(target: &mut T, a: Area, percent: f64) {
    draw_rect(target, a.x, a.y, a.w, a.h, ON);
    fill_rect(target, a.x + 1, a.y + 1, percent_of(a.w - 2, percent), a.h - 2, ON);
}

/// Plain proportional bar, used for track progress
pub fn draw_solid_slider<T: PixelTarget + ?Sized>(target: &mut T, a: Area, percent: f64) {
    fill_rect(target, a.x, a.y, percent_of(a.w, percent), a.h, ON);
}

/// Volume wedge growing from the bottom left corner
pub fn draw_triangle_slider<T: PixelTarget + ?Sized>(target: &mut T, a: Area, percent: f64) {
    let frac = percent.clamp(0.0, 100.0) / 100.0;
    let bottom = a.y + a.h - 1;
    let tip_x = a.x + ((a.w - 1) as f64 * frac) as i32;
    let tip_y = a.y + ((a.h - 1) as f64 * (1.0 - frac)) as i32;
    fill_triangle(target, (a.x, bottom), (tip_x, bottom), (tip_x, tip_y), ON);
}
