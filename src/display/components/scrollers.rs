/*
 *  display/components/scrollers.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Title and origin marquees
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

use std::time::Instant;

use embedded_graphics::pixelcolor::BinaryColor;
use log::debug;

use crate::display::glyphs::FontStyle;
use crate::display::layout::Pos;
use crate::display::scroll::{ScrollParams, ScrollState};
use crate::display::text::draw_text_scroll;
use crate::display::traits::PixelTarget;
use crate::status::{PlayState, StatusSnapshot};

/// Two marquee lines sharing one clock, restarted when the track changes.
pub struct ScrollingText {
    state: ScrollState,
    font: FontStyle,
    box_w: i32,
    box_h: i32,
}

impl ScrollingText {
    pub fn new(title: ScrollParams, origin: ScrollParams, box_w: i32, box_h: i32, now: Instant) -> Self {
        Self { state: ScrollState::new(title, origin, now), font: FontStyle::Fixed, box_w, box_h }
    }

    pub fn with_font(mut self, font: FontStyle) -> Self {
        self.font = font;
        self
    }

    /// Restart the clock if title, origin or play state differ from last frame.
    pub fn update(&mut self, snap: &StatusSnapshot, now: Instant) -> bool {
        let state = play_state_tag(snap.state);
        let restarted = self.state.observe(&[snap.title.as_str(), snap.origin.as_str(), state], now);
        if restarted {
            debug!("marquee restart: '{}' / '{}'", snap.title, snap.origin);
        }
        restarted
    }

    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.state.elapsed_secs(now)
    }

    pub fn draw_title<T: PixelTarget + ?Sized>(&self, target: &mut T, at: Pos, text: &str, now: Instant) {
        let params = self.state.title;
        self.draw(target, at, text, &params, now);
    }

    pub fn draw_origin<T: PixelTarget + ?Sized>(&self, target: &mut T, at: Pos, text: &str, now: Instant) {
        let params = self.state.origin;
        self.draw(target, at, text, &params, now);
    }

    fn draw<T: PixelTarget + ?Sized>(&self, target: &mut T, at: Pos, text: &str, params: &ScrollParams, now: Instant) {
        draw_text_scroll(
            target,
            &self.font,
            at.x,
            at.y,
            text,
            params,
            self.elapsed_secs(now),
            self.box_w,
            self.box_h,
            BinaryColor::On,
        );
    }
}

fn play_state_tag(state: PlayState) -> &'static str {
    match state {
        PlayState::Unknown => "unknown",
        PlayState::Stop => "stop",
        PlayState::Play => "play",
        PlayState::Pause => "pause",
    }
}
