/*
 *  display/primitives.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Shape primitives drawn pixel by pixel onto any PixelTarget
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

use crate::display::traits::PixelTarget;

#[inline]
pub fn draw_pixel<T: PixelTarget + ?Sized>(target: &mut T, x: i32, y: i32, color: BinaryColor) {
    target.set_pixel(x, y, color);
}

/// Integer Bresenham line, endpoints inclusive.
///
/// Steep lines are walked along y; endpoints are ordered before stepping
/// so swapping them yields the same pixels. The walk starts at the first
/// on-target step of the major axis, with the error term advanced to match.
pub fn draw_line<T: PixelTarget + ?Sized>(
    target: &mut T,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: BinaryColor,
) {
    let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 || (x0 == x1 && y0 > y1) {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let ystep = if y0 < y1 { 1 } else { -1 };

    let limit = (if steep { target.height() } else { target.width() }) as i64;
    let first = x0.max(0);
    let last = x1.min(limit - 1);
    if first > last {
        return;
    }

    // err stays in [0, dx) so the y steps taken before `first` have a closed form
    let e0 = (dx / 2) as i128;
    let skipped = (first - x0) as i128;
    let steps = if dx == 0 { 0 } else { -(e0 - skipped * dy as i128).div_euclid(dx as i128) };
    let mut err = (e0 - skipped * dy as i128 + steps * dx as i128) as i64;
    let mut y = y0 + ystep * steps as i64;

    for x in first..=last {
        // both coordinates lie between the original i32 endpoints
        if steep {
            target.set_pixel(y as i32, x as i32, color);
        } else {
            target.set_pixel(x as i32, y as i32, color);
        }
        err -= dy;
        if err < 0 {
            y += ystep;
            err += dx;
        }
    }
}

/// Horizontal run clipped to the target before any pixel is touched.
pub fn draw_fast_hline<T: PixelTarget + ?Sized>(target: &mut T, x: i32, y: i32, w: i32, color: BinaryColor) {
    if w <= 0 || y < 0 || y >= target.height() as i32 {
        return;
    }
    let x0 = x.max(0);
    let x1 = x.saturating_add(w).min(target.width() as i32);
    if x1 > x0 {
        target.hline(x0, y, x1 - x0, color);
    }
}

/// Vertical run clipped to the target before any pixel is touched.
pub fn draw_fast_vline<T: PixelTarget + ?Sized>(target: &mut T, x: i32, y: i32, h: i32, color: BinaryColor) {
    if h <= 0 || x < 0 || x >= target.width() as i32 {
        return;
    }
    let y0 = y.max(0);
    let y1 = y.saturating_add(h).min(target.height() as i32);
    if y1 > y0 {
        target.vline(x, y0, y1 - y0, color);
    }
}

/// Rectangle outline
pub fn draw_rect<T: PixelTarget + ?Sized>(target: &mut T, x: i32, y: i32, w: i32, h: i32, color: BinaryColor) {
    if w <= 0 || h <= 0 {
        return;
    }
    draw_fast_hline(target, x, y, w, color);
    draw_fast_hline(target, x, y.saturating_add(h - 1), w, color);
    draw_fast_vline(target, x, y, h, color);
    draw_fast_vline(target, x.saturating_add(w - 1), y, h, color);
}

/// Every pixel of `[x, x+w) x [y, y+h)` that lands on the target.
pub fn fill_rect<T: PixelTarget + ?Sized>(target: &mut T, x: i32, y: i32, w: i32, h: i32, color: BinaryColor) {
    if w <= 0 {
        return;
    }
    for i in x.max(0)..x.saturating_add(w).min(target.width() as i32) {
        draw_fast_vline(target, i, y, h, color);
    }
}

pub fn draw_triangle<T: PixelTarget + ?Sized>(
    target: &mut T,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    color: BinaryColor,
) {
    draw_line(target, x0, y0, x1, y1, color);
    draw_line(target, x1, y1, x2, y2, color);
    draw_line(target, x2, y2, x0, y0, color);
}

/// Scanline fill. A flat (single row) triangle degenerates to one span.
///
/// Only rows on the target are walked; spans are computed in i128 so far
/// off-screen vertices cannot overflow.
pub fn fill_triangle<T: PixelTarget + ?Sized>(
    target: &mut T,
    a: (i32, i32),
    b: (i32, i32),
    c: (i32, i32),
    color: BinaryColor,
) {
    // sort by y: y0 <= y1 <= y2
    let mut v = [a, b, c];
    v.sort_by_key(|p| p.1);
    let [(x0, y0), (x1, y1), (x2, y2)] = v.map(|(x, y)| (x as i128, y as i128));

    if y0 == y2 {
        let lo = x0.min(x1).min(x2);
        let hi = x0.max(x1).max(x2);
        span(target, lo, hi, y0, color);
        return;
    }

    let rows = target.height() as i128;
    let (dx01, dy01) = (x1 - x0, y1 - y0);
    let (dx02, dy02) = (x2 - x0, y2 - y0);
    let (dx12, dy12) = (x2 - x1, y2 - y1);

    // upper part: rows y0..=y1 (y1 excluded when the lower part starts flat)
    let last = if y1 == y2 { y1 } else { y1 - 1 };
    for y in y0.max(0)..=last.min(rows - 1) {
        let xa = x0 + if dy01 != 0 { dx01 * (y - y0) / dy01 } else { 0 };
        let xb = x0 + dx02 * (y - y0) / dy02;
        span(target, xa, xb, y, color);
    }

    // lower part: rows after the upper part through y2
    for y in (last + 1).max(0)..=y2.min(rows - 1) {
        let xa = x1 + if dy12 != 0 { dx12 * (y - y1) / dy12 } else { 0 };
        let xb = x0 + dx02 * (y - y0) / dy02;
        span(target, xa, xb, y, color);
    }
}

#[inline]
fn span<T: PixelTarget + ?Sized>(target: &mut T, xa: i128, xb: i128, y: i128, color: BinaryColor) {
    if y < 0 || y >= target.height() as i128 {
        return;
    }
    let (lo, hi) = if xa > xb { (xb, xa) } else { (xa, xb) };
    let lo = lo.clamp(i32::MIN as i128, i32::MAX as i128) as i32;
    let hi = hi.clamp(i32::MIN as i128, i32::MAX as i128) as i32;
    draw_fast_hline(target, lo, y as i32, hi.saturating_sub(lo).saturating_add(1), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::{AddressingMode, PixelBuffer};

    fn mono() -> PixelBuffer {
        PixelBuffer::new(128, 64, AddressingMode::PagedMono)
    }

    fn lit(fb: &PixelBuffer) -> Vec<(i32, i32)> {
        let mut v = Vec::new();
        for y in 0..fb.height() as i32 {
            for x in 0..fb.width() as i32 {
                if fb.get_pixel(x, y) {
                    v.push((x, y));
                }
            }
        }
        v
    }

    #[test]
    fn test_line_symmetry() {
        let cases = [
            (0, 0, 127, 63), (3, 50, 90, 2), (10, 10, 12, 60), (5, 5, 5, 40),
            (0, 20, 100, 20), (-20, -5, 140, 70), (7, 9, 8, 9), (40, 30, 10, 31),
        ];
        for (x0, y0, x1, y1) in cases {
            let mut a = mono();
            let mut b = mono();
            draw_line(&mut a, x0, y0, x1, y1, BinaryColor::On);
            draw_line(&mut b, x1, y1, x0, y0, BinaryColor::On);
            assert_eq!(a.as_bytes(), b.as_bytes(), "({x0},{y0})-({x1},{y1})");
        }
    }

    #[test]
    fn test_line_endpoints_and_count() {
        let mut fb = mono();
        draw_line(&mut fb, 2, 3, 12, 7, BinaryColor::On);
        assert!(fb.get_pixel(2, 3));
        assert!(fb.get_pixel(12, 7));
        assert_eq!(fb.count_lit(), 11);

        let mut fb = mono();
        draw_line(&mut fb, 4, 1, 6, 20, BinaryColor::On);
        assert_eq!(fb.count_lit(), 20);
        assert!(fb.get_pixel(4, 1) && fb.get_pixel(6, 20));
    }

    #[test]
    fn test_single_point_line() {
        let mut fb = mono();
        draw_line(&mut fb, 9, 9, 9, 9, BinaryColor::On);
        assert_eq!(lit(&fb), vec![(9, 9)]);
    }

    #[test]
    fn test_fast_lines_match_pixel_loop() {
        for (x, y, len) in [(0, 0, 128), (-5, 10, 20), (120, 63, 30), (50, -1, 5), (3, 3, 0), (3, 3, -4)] {
            let mut fast = mono();
            let mut slow = mono();
            draw_fast_hline(&mut fast, x, y, len, BinaryColor::On);
            for i in x..x + len.max(0) {
                slow.set_pixel(i, y, true);
            }
            assert_eq!(fast.as_bytes(), slow.as_bytes());

            let mut fast = mono();
            let mut slow = mono();
            draw_fast_vline(&mut fast, y, x, len, BinaryColor::On);
            for j in x..x + len.max(0) {
                slow.set_pixel(y, j, true);
            }
            assert_eq!(fast.as_bytes(), slow.as_bytes());
        }
    }

    #[test]
    fn test_fill_rect_equals_pixel_union() {
        for (x, y, w, h) in [(10, 10, 5, 7), (-3, -3, 10, 10), (120, 60, 20, 20), (0, 0, 128, 64), (200, 5, 4, 4)] {
            for mode in [AddressingMode::PagedMono, AddressingMode::NibblePacked] {
                let mut a = PixelBuffer::new(96, 96, mode);
                let mut b = a.clone();
                fill_rect(&mut a, x, y, w, h, BinaryColor::On);
                for j in y..y + h {
                    for i in x..x + w {
                        b.set_pixel(i, j, true);
                    }
                }
                assert_eq!(a.as_bytes(), b.as_bytes(), "{mode:?} ({x},{y},{w},{h})");
            }
        }
    }

    #[test]
    fn test_fill_rect_off_clears() {
        let mut fb = mono();
        fill_rect(&mut fb, 0, 0, 128, 64, BinaryColor::On);
        fill_rect(&mut fb, 1, 1, 126, 62, BinaryColor::Off);
        assert_eq!(fb.count_lit(), 2 * 128 + 2 * 62);
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut fb = mono();
        draw_rect(&mut fb, 2, 2, 4, 3, BinaryColor::On);
        assert_eq!(fb.count_lit(), 10);
        assert!(!fb.get_pixel(3, 3));
        assert!(fb.get_pixel(5, 4));
    }

    #[test]
    fn test_fill_triangle_covers_vertices() {
        let mut fb = mono();
        fill_triangle(&mut fb, (10, 5), (40, 30), (2, 50), BinaryColor::On);
        for (x, y) in [(10, 5), (40, 30), (2, 50), (15, 30)] {
            assert!(fb.get_pixel(x, y), "({x},{y})");
        }
        assert!(!fb.get_pixel(60, 10));
    }

    #[test]
    fn test_fill_triangle_stays_in_bounding_box() {
        let mut fb = mono();
        fill_triangle(&mut fb, (100, 2), (120, 40), (70, 60), BinaryColor::On);
        let pixels = lit(&fb);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(x, y)| (70..=120).contains(&x) && (2..=60).contains(&y)));
        // one span per row
        for y in 2..=60 {
            assert!(pixels.iter().any(|&(_, py)| py == y), "row {y}");
        }
    }

    #[test]
    fn test_degenerate_triangles_do_not_panic() {
        let mut fb = mono();
        fill_triangle(&mut fb, (5, 5), (5, 5), (5, 5), BinaryColor::On);
        assert_eq!(lit(&fb), vec![(5, 5)]);

        let mut fb = mono();
        fill_triangle(&mut fb, (0, 10), (20, 10), (40, 10), BinaryColor::On);
        assert_eq!(fb.count_lit(), 41);

        let mut fb = mono();
        fill_triangle(&mut fb, (0, 0), (10, 10), (20, 20), BinaryColor::On);
        assert!(fb.get_pixel(10, 10));

        fill_triangle(&mut fb, (-1000, -1000), (5000, 3), (2, 9000), BinaryColor::On);
        draw_triangle(&mut fb, (-1000, -1000), (5000, 3), (2, 9000), BinaryColor::On);
    }

    // plain Bresenham over every step, for comparing against the clipped walk
    fn reference_line(fb: &mut PixelBuffer, mut x0: i32, mut y0: i32, mut x1: i32, mut y1: i32) {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 || (x0 == x1 && y0 > y1) {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        let (dx, dy) = (x1 - x0, (y1 - y0).abs());
        let ystep = if y0 < y1 { 1 } else { -1 };
        let (mut err, mut y) = (dx / 2, y0);
        for x in x0..=x1 {
            if steep { fb.set_pixel(y, x, true) } else { fb.set_pixel(x, y, true) }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
    }

    #[test]
    fn test_clipped_line_matches_full_walk() {
        for (x0, y0, x1, y1) in [(-300, -40, 400, 90), (500, 3, -77, 61), (10, -900, 70, 800), (-5, 70, 140, -9), (130, 10, 200, 20)] {
            let mut clipped = mono();
            let mut full = mono();
            draw_line(&mut clipped, x0, y0, x1, y1, BinaryColor::On);
            reference_line(&mut full, x0, y0, x1, y1);
            assert_eq!(clipped.as_bytes(), full.as_bytes(), "({x0},{y0})-({x1},{y1})");
        }
    }

    #[test]
    fn test_extreme_coordinates_clip_silently() {
        let mut fb = mono();
        draw_line(&mut fb, -2_000_000_000, 0, 2_000_000_000, 1, BinaryColor::On);
        draw_line(&mut fb, i32::MIN, i32::MIN, i32::MAX, i32::MAX, BinaryColor::On);
        draw_line(&mut fb, 5, i32::MAX, 5, i32::MIN, BinaryColor::On);
        assert!(fb.get_pixel(5, 0) && fb.get_pixel(5, 63));

        let mut fb = mono();
        draw_rect(&mut fb, 0, i32::MAX - 2, 5, 5, BinaryColor::On);
        draw_rect(&mut fb, i32::MAX - 1, 0, i32::MAX, 3, BinaryColor::On);
        assert_eq!(fb.count_lit(), 0);
        draw_rect(&mut fb, i32::MIN, i32::MIN, i32::MAX, i32::MAX, BinaryColor::On);
        fill_rect(&mut fb, i32::MAX - 3, i32::MIN, 10, i32::MAX, BinaryColor::On);
        assert_eq!(fb.count_lit(), 0);

        let mut fb = mono();
        fill_triangle(&mut fb, (i32::MIN + 10, 0), (i32::MAX - 10, 10), (0, 20), BinaryColor::On);
        assert!(fb.get_pixel(0, 10) && fb.get_pixel(127, 10));
        fill_triangle(&mut fb, (0, i32::MIN), (i32::MAX, i32::MAX), (i32::MIN, i32::MAX), BinaryColor::On);
        draw_triangle(&mut fb, (0, i32::MIN), (i32::MAX, i32::MAX), (i32::MIN, i32::MAX), BinaryColor::On);
    }
}
