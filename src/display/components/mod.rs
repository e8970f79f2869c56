/*
 *  display/components/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen building blocks
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

pub mod status_bar;
pub mod scrollers;
pub mod clock;
pub mod spectrum;

// Re-exports
pub use status_bar::{draw_connection, draw_slider, draw_solid_slider, draw_triangle_slider};
pub use scrollers::ScrollingText;
pub use clock::{draw_date, draw_time, format_date, format_time};
pub use spectrum::{bar_geometry, draw_spectrum};
