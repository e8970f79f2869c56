/*
 *  status.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Player and connection snapshots handed to the render loop
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

use std::fmt;

/// Playback state as reported by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Unknown,
    Stop,
    Play,
    Pause,
}

impl PlayState {
    pub fn from_mpd(state: &str) -> Self {
        match state {
            "play" => PlayState::Play,
            "pause" => PlayState::Pause,
            "stop" => PlayState::Stop,
            _ => PlayState::Unknown,
        }
    }

    /// Playing or paused: a track is loaded
    pub fn has_track(self) -> bool {
        matches!(self, PlayState::Play | PlayState::Pause)
    }
}

/// How the box reaches the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionKind {
    #[default]
    None,
    Ethernet,
    Wifi,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionInfo {
    pub kind: ConnectionKind,
    /// Link quality 0..=100, wifi only
    pub quality: u8,
    pub ip_address: String,
}

/// Immutable view of everything a frame needs from the player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSnapshot {
    pub state: PlayState,
    /// 0..=100, or `None` when the output has no mixer
    pub volume: Option<u8>,
    pub elapsed_secs: f64,
    pub total_secs: f64,
    /// kbit/s
    pub bitrate: u32,
    pub title: String,
    pub origin: String,
}

impl StatusSnapshot {
    /// Track position as a fraction, 0 when the length is unknown
    pub fn progress(&self) -> f64 {
        if self.total_secs > 0.0 {
            (self.elapsed_secs / self.total_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Right-aligned bitrate text, 4 characters, capped at 999
    pub fn kbitrate_str(&self) -> String {
        format!("{:>4}", self.bitrate.min(999))
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:.0}/{:.0}s '{}' - '{}'", self.state, self.elapsed_secs, self.total_secs, self.title, self.origin)
    }
}

/// Fold text into the display font's ASCII range.
///
/// Latin-1 letters lose their accents, anything else outside ASCII
/// becomes `?`. Control characters are dropped.
pub fn fold_to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            if !ch.is_ascii_control() {
                out.push(ch);
            }
            continue;
        }
        match fold_latin1(ch) {
            Some(s) => out.push_str(s),
            None => out.push('?'),
        }
    }
    out
}

fn fold_latin1(ch: char) -> Option<&'static str> {
    Some(match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' => "C",
        'ç' => "c",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ð' => "D",
        'ð' => "d",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        'Þ' => "Th",
        'þ' => "th",
        'ß' => "ss",
        '\u{a0}' => " ",
        '‘' | '’' => "'",
        '“' | '”' => "\"",
        '–' | '—' => "-",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Björk"), "Bjork");
        assert_eq!(fold_to_ascii("Sigur Rós – Ágætis"), "Sigur Ros - Agaetis");
        assert_eq!(fold_to_ascii("東京"), "??");
        assert_eq!(fold_to_ascii("tab\there"), "tabhere");
    }

    #[test]
    fn test_progress_and_bitrate() {
        let mut s = StatusSnapshot { elapsed_secs: 30.0, total_secs: 120.0, bitrate: 320, ..Default::default() };
        assert!((s.progress() - 0.25).abs() < 1e-9);
        assert_eq!(s.kbitrate_str(), " 320");
        s.bitrate = 1411;
        assert_eq!(s.kbitrate_str(), " 999");
        s.bitrate = 0;
        s.total_secs = 0.0;
        assert_eq!(s.progress(), 0.0);
        assert_eq!(s.kbitrate_str(), "   0");
    }

    #[test]
    fn test_play_state() {
        assert_eq!(PlayState::from_mpd("play"), PlayState::Play);
        assert_eq!(PlayState::from_mpd("bogus"), PlayState::Unknown);
        assert!(PlayState::Pause.has_track());
        assert!(!PlayState::Stop.has_track());
    }
}
