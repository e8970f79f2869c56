/*
 *  main.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Entry point - wire the pollers, the spectrum feed and the render thread
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

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{mpsc, watch};

use lymons_oled::config;
use lymons_oled::display::{Feeds, LayoutConfig, ScreenRenderer, TransportFactory, spawn_render_thread, supervise_render};
use lymons_oled::mpd::{MpdClient, spawn_poller};
use lymons_oled::netinfo::{NetMonitor, spawn_monitor};
use lymons_oled::spectrum::{CavaProcess, SpectrumFrame, spawn_fifo_reader, start_on_play};
use lymons_oled::status::{ConnectionInfo, StatusSnapshot};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, cli) = config::load().context("loading configuration")?;

    // Initialize the logger with the appropriate level based on debug flag
    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let panel = cfg.display.panel.ok_or_else(|| anyhow!("no OLED type selected"))?;
    let mut controller = TransportFactory::controller(&cfg.display, panel)
        .with_context(|| format!("opening {}", panel))?;
    controller.begin().context("could not initialise OLED")?;
    info!("{} ready", panel);

    let bars = cfg.spectrum.bars;
    let poll = Duration::from_millis(cfg.mpd.poll_ms);

    let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());
    let (mpd_stop_tx, mpd_stop_rx) = mpsc::channel(1);

    // spectrum: our own cava child once playback starts, or someone else's FIFO now
    let (spectrum_tx, spectrum_rx) = watch::channel(SpectrumFrame::silent(bars));
    let cava_task = if cfg.spectrum.spawn_cava {
        let prog = cfg.spectrum.cava_prog.clone();
        let input = cfg.spectrum.cava_input();
        let framerate = cfg.display.framerate;
        let delay = Duration::from_secs_f64(cfg.spectrum.cava_start_delay);
        Some(start_on_play(status_rx.clone(), delay, move || {
            let child = CavaProcess::spawn(&prog, bars, framerate, &input)
                .inspect_err(|e| error!("could not start {}: {}", prog, e))?;
            spawn_fifo_reader(child.fifo_path().to_path_buf(), bars, spectrum_tx)?;
            Ok(child)
        }))
    } else {
        spawn_fifo_reader(cfg.spectrum.fifo.clone(), bars, spectrum_tx).context("spawning spectrum reader")?;
        None
    };

    let mpd_task = spawn_poller(MpdClient::new(&cfg.mpd.host, cfg.mpd.port), poll, status_tx, mpd_stop_rx);

    let (net_tx, net_rx) = watch::channel(ConnectionInfo::default());
    let (net_stop_tx, net_stop_rx) = mpsc::channel(1);
    let net_task = spawn_monitor(NetMonitor::default(), poll, net_tx, net_stop_rx);

    // the render thread owns the controller and blanks the panel on the way out
    let stop = Arc::new(AtomicBool::new(false));
    let feeds = Feeds { status: status_rx, connection: net_rx, spectrum: spectrum_rx };
    let layout = LayoutConfig::for_display(&panel.capabilities());
    let renderer = ScreenRenderer::new(layout, cfg.screen.clone(), cfg.spectrum.gap, Instant::now());
    let render = spawn_render_thread(controller, renderer, feeds, bars, cfg.display.framerate, Arc::clone(&stop))
        .context("spawning render thread")?;

    let (signalled, outcome) = supervise_render(signal_handler(), &stop, render).await;
    if let Err(e) = &signalled {
        error!("could not install signal handlers: {}", e);
    }

    let _ = mpd_stop_tx.send(()).await;
    let _ = net_stop_tx.send(()).await;
    let _ = mpd_task.await;
    let _ = net_task.await;

    let cava = match cava_task {
        Some(task) if task.is_finished() => match task.await {
            Ok(Some(Ok(child))) => Some(child),
            _ => None,
        },
        Some(task) => {
            task.abort();
            None
        }
        None => None,
    };
    drop(cava);

    signalled.context("installing signal handlers")?;
    match outcome {
        Ok(metrics) => {
            info!("{} frames shown, {} dropped", metrics.frame_count, metrics.failed_frames);
            Ok(())
        }
        Err(e) => {
            error!("render loop failed: {}", e);
            Err(e.into())
        }
    }
}
