/*
 *  display/manager.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen composition and the frame loop
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

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arrayvec::ArrayString;
use chrono::{DateTime, Local, TimeZone};
use embedded_graphics::pixelcolor::BinaryColor;
use log::{debug, info, warn};
use tokio::sync::watch;

use crate::config::{PauseScreen, ScreenConfig};
use crate::display::components::{
    draw_connection, draw_date, draw_solid_slider, draw_spectrum, draw_time, draw_triangle_slider,
    format_date, format_time, ScrollingText,
};
use crate::display::controller::Controller;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PixelBuffer;
use crate::display::layout::{LayoutConfig, Pos};
use crate::display::text::draw_text;
use crate::display::traits::DisplayTransport;
use crate::func_timer::FunctionTimer;
use crate::pacer::Pacer;
use crate::spectrum::SpectrumFrame;
use crate::status::{ConnectionInfo, PlayState, StatusSnapshot};

/// Which screen a frame shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Clock,
    Playing,
}

impl Screen {
    pub fn for_state(state: PlayState, paused: PauseScreen) -> Self {
        match (state, paused) {
            (PlayState::Unknown | PlayState::Stop, _) => Screen::Clock,
            (PlayState::Pause, PauseScreen::Stop) => Screen::Clock,
            (PlayState::Play, _) | (PlayState::Pause, PauseScreen::Play) => Screen::Playing,
        }
    }
}

/// Pre-allocated text buffers for the per-frame strings
#[derive(Debug, Default)]
pub struct RenderBuffers {
    pub time_buffer: ArrayString<16>,
    pub date_buffer: ArrayString<16>,
    pub bitrate_buffer: ArrayString<8>,
}

impl RenderBuffers {
    fn set(buf: &mut ArrayString<16>, text: &str) {
        buf.clear();
        let end = text.char_indices().nth(buf.capacity()).map_or(text.len(), |(i, _)| i);
        let _ = buf.try_push_str(&text[..end]);
    }
}

/// Everything one frame draws from
pub struct FrameInputs<'a, Tz: TimeZone> {
    pub status: &'a StatusSnapshot,
    pub connection: &'a ConnectionInfo,
    pub spectrum: &'a [u8],
    pub wall_clock: DateTime<Tz>,
}

/// Composes the clock and now playing screens into a pixel buffer.
pub struct ScreenRenderer {
    layout: LayoutConfig,
    screen: ScreenConfig,
    gap: i32,
    scrollers: ScrollingText,
    buffers: RenderBuffers,
    last_screen: Option<Screen>,
}

impl ScreenRenderer {
    pub fn new(layout: LayoutConfig, screen: ScreenConfig, gap: u32, now: Instant) -> Self {
        let p = &layout.playing;
        let scrollers = ScrollingText::new(screen.title_scroll, screen.origin_scroll, p.marquee_w, p.marquee_h, now)
            .with_font(screen.marquee_font);
        Self { layout, screen, gap: gap as i32, scrollers, buffers: RenderBuffers::default(), last_screen: None }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Clear `fb` and draw the screen for the current play state.
    pub fn render<Tz>(&mut self, fb: &mut PixelBuffer, frame: &FrameInputs<'_, Tz>, now: Instant) -> Result<Screen, DisplayError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        fb.clear();
        let screen = Screen::for_state(frame.status.state, self.screen.pause_screen);
        if self.last_screen != Some(screen) {
            info!("showing {:?} screen", screen);
            self.last_screen = Some(screen);
        }
        RenderBuffers::set(&mut self.buffers.time_buffer, &format_time(&frame.wall_clock, self.screen.clock_format));

        match screen {
            Screen::Clock => self.render_clock(fb, frame),
            Screen::Playing => self.render_playing(fb, frame, now)?,
        }
        Ok(screen)
    }

    fn render_clock<Tz>(&mut self, fb: &mut PixelBuffer, frame: &FrameInputs<'_, Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let l = &self.layout.clock;
        draw_text(fb, l.ip.x, l.ip.y, &frame.connection.ip_address, l.ip_max_chars, 1, BinaryColor::On);
        draw_connection(fb, l.connection, frame.connection);
        draw_time(fb, l.time, l.time_size, &self.buffers.time_buffer);
        if let Some(at) = l.date {
            RenderBuffers::set(&mut self.buffers.date_buffer, &format_date(&frame.wall_clock, self.screen.date_format));
            draw_date(fb, at, &self.buffers.date_buffer);
        }
    }

    fn render_playing<Tz: TimeZone>(
        &mut self,
        fb: &mut PixelBuffer,
        frame: &FrameInputs<'_, Tz>,
        now: Instant,
    ) -> Result<(), DisplayError> {
        let status = frame.status;
        self.scrollers.update(status, now);
        let l = &self.layout.playing;

        draw_spectrum(fb, l.spectrum, frame.spectrum, self.gap)?;
        draw_connection(fb, l.connection, frame.connection);
        if let Some(volume) = status.volume {
            draw_triangle_slider(fb, l.volume, volume as f64);
        }
        if status.bitrate > 0 {
            self.buffers.bitrate_buffer.clear();
            let _ = self.buffers.bitrate_buffer.try_push_str(&status.kbitrate_str());
            draw_text(fb, l.bitrate.x, l.bitrate.y, &self.buffers.bitrate_buffer, 4, 1, BinaryColor::On);
        }

        let time_at = Pos { x: l.time.x + LayoutConfig::clock_offset(self.screen.clock_format), y: l.time.y };
        draw_time(fb, time_at, l.time_size, &self.buffers.time_buffer);

        self.scrollers.draw_origin(fb, l.origin, &status.origin, now);
        self.scrollers.draw_title(fb, l.title, &status.title, now);
        draw_solid_slider(fb, l.progress, 100.0 * status.progress());
        Ok(())
    }
}

/// Rolling frame statistics, logged periodically at debug
#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    pub frame_count: u64,
    pub failed_frames: u64,
    /// Exponential moving average of render + transfer time
    pub avg_frame_time_us: f64,
}

impl PerformanceMetrics {
    const ALPHA: f64 = 0.1;

    pub fn record_frame(&mut self, frame_time: Duration, ok: bool) {
        let us = frame_time.as_secs_f64() * 1e6;
        self.avg_frame_time_us = if self.frame_count == 0 {
            us
        } else {
            Self::ALPHA * us + (1.0 - Self::ALPHA) * self.avg_frame_time_us
        };
        self.frame_count += 1;
        if !ok {
            self.failed_frames += 1;
        }
    }
}

/// Latest published state from the pollers
pub struct Feeds {
    pub status: watch::Receiver<StatusSnapshot>,
    pub connection: watch::Receiver<ConnectionInfo>,
    pub spectrum: watch::Receiver<SpectrumFrame>,
}

impl Feeds {
    /// Bars to draw: live only while playing and while frames keep arriving.
    fn levels(&self, state: PlayState, bars: usize, now: Instant, max_age: Duration) -> Vec<u8> {
        if state != PlayState::Play {
            return vec![0; bars];
        }
        let mut levels = self.spectrum.borrow().levels(now, max_age);
        levels.resize(bars, 0);
        levels
    }
}

/// Render and push frames until `stop` is raised.
///
/// A frame that fails on the bus is dropped and the next one proceeds;
/// any other display error ends the loop.
pub fn run_render_loop<T: DisplayTransport>(
    controller: &mut Controller<T>,
    renderer: &mut ScreenRenderer,
    feeds: &Feeds,
    bars: usize,
    framerate: u32,
    stop: &AtomicBool,
) -> Result<PerformanceMetrics, DisplayError> {
    let mut pacer = Pacer::new(framerate);
    let mut metrics = PerformanceMetrics::default();
    let max_age = pacer.frame() * 2;
    info!("render loop at {} fps ({:?} per frame)", framerate, pacer.frame());

    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if !pacer.should_flush_at(now) {
            std::thread::sleep(pacer.until_next(now));
            continue;
        }
        let started = Instant::now();
        let _timer = FunctionTimer::with_budget("frame", pacer.frame());

        let status = feeds.status.borrow().clone();
        let connection = feeds.connection.borrow().clone();
        let spectrum = feeds.levels(status.state, bars, now, max_age);
        let frame = FrameInputs { status: &status, connection: &connection, spectrum: &spectrum, wall_clock: Local::now() };

        renderer.render(controller.buffer_mut()?, &frame, now)?;
        let ok = match controller.display() {
            Ok(()) => true,
            Err(e) if e.is_bus_error() => {
                warn!("frame dropped: {}", e);
                false
            }
            Err(e) => return Err(e),
        };
        metrics.record_frame(started.elapsed(), ok);
        if metrics.frame_count % 1000 == 0 {
            debug!(
                "{} frames, {} failed, avg {:.0} us",
                metrics.frame_count, metrics.failed_frames, metrics.avg_frame_time_us
            );
        }
    }
    info!("render loop stopped after {} frames", metrics.frame_count);
    Ok(metrics)
}

/// Run the frame loop on its own thread. The panel is blanked and switched
/// off when the loop returns, whatever the outcome.
pub fn spawn_render_thread<T: DisplayTransport + 'static>(
    mut controller: Controller<T>,
    mut renderer: ScreenRenderer,
    feeds: Feeds,
    bars: usize,
    framerate: u32,
    stop: Arc<AtomicBool>,
) -> io::Result<JoinHandle<Result<PerformanceMetrics, DisplayError>>> {
    thread::Builder::new().name("render".into()).spawn(move || {
        let result = run_render_loop(&mut controller, &mut renderer, &feeds, bars, framerate, &stop);
        if let Err(e) = controller.shutdown() {
            warn!("display shutdown failed: {}", e);
        }
        result
    })
}

/// Wait until `shutdown` resolves or the render thread ends by itself, then
/// raise `stop` and join the thread. A failed `shutdown` still stops the
/// loop; its error comes back alongside the loop result.
pub async fn supervise_render<F, E>(
    shutdown: F,
    stop: &AtomicBool,
    render: JoinHandle<Result<PerformanceMetrics, DisplayError>>,
) -> (Result<(), E>, Result<PerformanceMetrics, DisplayError>)
where
    F: Future<Output = Result<(), E>>,
{
    let mut joined = tokio::task::spawn_blocking(move || render.join());
    let mut finished = None;
    let signalled = tokio::select! {
        res = shutdown => res,
        j = &mut joined => {
            finished = Some(j);
            Ok(())
        }
    };

    stop.store(true, Ordering::Relaxed);
    let j = match finished {
        Some(j) => j,
        None => joined.await,
    };
    let outcome = match j {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(DisplayError::Io(io::Error::other("render thread panicked"))),
        Err(e) => Err(DisplayError::Io(io::Error::other(e))),
    };
    (signalled, outcome)
}
