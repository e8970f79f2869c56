/*
 *  pacer.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame pacing for the render loop
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
use std::time::{Duration, Instant};

/// Frames run slightly faster than the requested rate so the spectrum
/// source never backs up.
pub const FRAME_RATE_HEADROOM: f64 = 0.9;

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: Self::interval_for(target_fps) }
    }

    /// `1 / (0.9 * fps)`
    pub fn interval_for(fps: u32) -> Duration {
        Duration::from_secs_f64(1.0 / (FRAME_RATE_HEADROOM * fps.max(1) as f64))
    }

    #[inline]
    pub fn frame(&self) -> Duration {
        self.frame
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = Self::interval_for(fps);
    }

    /// Returns true if we should flush now; if true, it also schedules the next deadline.
    #[inline]
    pub fn should_flush(&mut self) -> bool {
        self.should_flush_at(Instant::now())
    }

    pub fn should_flush_at(&mut self, now: Instant) -> bool {
        if now >= self.next_deadline {
            self.next_deadline = now + self.frame;
            true
        } else {
            false
        }
    }

    /// Time left before the next frame is due
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_deadline.saturating_duration_since(now)
    }
}
