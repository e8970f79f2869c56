/*
 *  display/scroll.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee timing - pixel shift from elapsed time, reset on text change
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

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Separator placed between the text and its repeat
pub const LOOP_GAP: &str = "     ";

pub const DEFAULT_SCROLL_RATE: f64 = 8.0;
pub const DEFAULT_SCROLL_DELAY: f64 = 5.0;

/// Rate and start delay for one scrolling field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollParams {
    pub pixels_per_sec: f64,
    pub start_delay: f64,
}

impl Default for ScrollParams {
    fn default() -> Self {
        Self {
            pixels_per_sec: DEFAULT_SCROLL_RATE,
            start_delay: DEFAULT_SCROLL_DELAY,
        }
    }
}

impl ScrollParams {
    pub fn new(pixels_per_sec: f64, start_delay: f64) -> Self {
        Self { pixels_per_sec, start_delay }
    }

    /// Leftward shift in pixels at `elapsed_secs`, wrapped to `loop_width`.
    ///
    /// Pure: the same inputs always give the same shift.
    pub fn pixel_shift(&self, elapsed_secs: f64, loop_width: i32) -> i32 {
        if loop_width <= 0 || elapsed_secs < self.start_delay {
            return 0;
        }
        let travelled = ((elapsed_secs - self.start_delay) * self.pixels_per_sec).round();
        if !travelled.is_finite() {
            return 0;
        }
        (travelled as i64).rem_euclid(loop_width as i64) as i32
    }
}

/// Marquee clock shared by the title and origin fields.
///
/// Restarts whenever the tracked content (title, origin, play state)
/// differs from what was last observed.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub title: ScrollParams,
    pub origin: ScrollParams,
    content: Vec<String>,
    since: Instant,
}

impl ScrollState {
    pub fn new(title: ScrollParams, origin: ScrollParams, now: Instant) -> Self {
        Self { title, origin, content: Vec::new(), since: now }
    }

    /// Record the content shown this frame; returns true if the clock restarted.
    pub fn observe(&mut self, content: &[&str], now: Instant) -> bool {
        let same = self.content.len() == content.len()
            && self.content.iter().zip(content).all(|(a, b)| a == b);
        if same {
            return false;
        }
        self.content = content.iter().map(|s| s.to_string()).collect();
        self.since = now;
        true
    }

    /// Seconds since the content last changed
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.since).as_secs_f64()
    }
}
