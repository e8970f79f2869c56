/*
 *  spectrum.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spectrum feed - cava raw 8-bit output read from a FIFO
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

use std::ffi::CString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task;

use crate::status::{PlayState, StatusSnapshot};

/// One frame of bar heights, 0..=255 each
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumFrame {
    pub heights: Vec<u8>,
    pub received: Option<Instant>,
}

impl SpectrumFrame {
    pub fn silent(bars: usize) -> Self {
        Self { heights: vec![0; bars], received: None }
    }

    /// Heights to draw: silence unless the frame arrived within `max_age`.
    pub fn levels(&self, now: Instant, max_age: Duration) -> Vec<u8> {
        match self.received {
            Some(at) if now.saturating_duration_since(at) <= max_age => self.heights.clone(),
            _ => vec![0; self.heights.len()],
        }
    }
}

/// Where cava reads its audio from
#[derive(Debug, Clone, PartialEq)]
pub struct CavaInput {
    pub method: String,
    pub source: String,
}

/// cava config asking for raw binary 8-bit mono bars on `raw_target`.
pub fn cava_config_text(bars: usize, framerate: u32, input: &CavaInput, raw_target: &Path) -> String {
    format!(
        "[general]\n\
         framerate = {framerate}\n\
         bars = {bars}\n\
         \n\
         [input]\n\
         method = {}\n\
         source = {}\n\
         \n\
         [output]\n\
         method = raw\n\
         data_format = binary\n\
         channels = mono\n\
         raw_target = {}\n\
         bit_format = 8bit\n",
        input.method,
        input.source,
        raw_target.display()
    )
}

/// Create a named pipe, replacing whatever was at `path`.
pub fn make_fifo(path: &Path) -> io::Result<()> {
    let _ = fs::remove_file(path);
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // SAFETY: c_path is a valid NUL terminated string for the duration of the call
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o666) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// A running cava child and the files made for it; torn down on drop.
pub struct CavaProcess {
    child: Child,
    config_path: PathBuf,
    fifo_path: PathBuf,
}

impl CavaProcess {
    /// Make the output FIFO and config under the temp dir, then start `prog -p`.
    pub fn spawn(prog: &str, bars: usize, framerate: u32, input: &CavaInput) -> io::Result<Self> {
        let pid = std::process::id();
        let tmp = std::env::temp_dir();
        let fifo_path = tmp.join(format!("cava_fifo_{pid}"));
        let config_path = tmp.join(format!("cava_config_{pid}"));

        make_fifo(&fifo_path)?;
        fs::write(&config_path, cava_config_text(bars, framerate, input, &fifo_path))?;

        let child = Command::new(prog)
            .arg("-p")
            .arg(&config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()?;
        info!("{} started (pid {}) {} bars from {}:{}", prog, child.id(), bars, input.method, input.source);
        Ok(Self { child, config_path, fifo_path })
    }

    pub fn fifo_path(&self) -> &Path {
        &self.fifo_path
    }
}

impl Drop for CavaProcess {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("cava already gone: {}", e);
        }
        let _ = self.child.wait();
        let _ = fs::remove_file(&self.config_path);
        let _ = fs::remove_file(&self.fifo_path);
    }
}

/// Run `launch` once, `delay` after the player first reports Play.
///
/// Resolves to `None` if the status sender goes away before that happens.
pub fn start_on_play<T, F>(mut status: watch::Receiver<StatusSnapshot>, delay: Duration, launch: F) -> task::JoinHandle<Option<io::Result<T>>>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    tokio::spawn(async move {
        while status.borrow_and_update().state != PlayState::Play {
            if status.changed().await.is_err() {
                debug!("status feed closed before playback started");
                return None;
            }
        }
        debug!("playback started, launching spectrum source in {:?}", delay);
        tokio::time::sleep(delay).await;
        Some(launch())
    })
}

/// Pull fixed `bars`-byte records from `reader` until EOF, publishing each.
pub fn pump_frames<R: Read>(mut reader: R, bars: usize, tx: &watch::Sender<SpectrumFrame>) -> io::Result<usize> {
    let mut frames = 0;
    let mut buf = vec![0u8; bars];
    loop {
        match reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(frames),
            Err(e) => return Err(e),
        }
        frames += 1;
        let frame = SpectrumFrame { heights: buf.clone(), received: Some(Instant::now()) };
        if tx.send(frame).is_err() {
            return Ok(frames);
        }
    }
}

/// Blocking reader thread on the FIFO. Opening blocks until a writer
/// appears; the thread ends when the writer closes or nobody listens.
pub fn spawn_fifo_reader(path: PathBuf, bars: usize, tx: watch::Sender<SpectrumFrame>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("spectrum".into()).spawn(move || {
        debug!("opening spectrum FIFO {}", path.display());
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("could not open spectrum FIFO {}: {}", path.display(), e);
                return;
            }
        };
        match pump_frames(file, bars, &tx) {
            Ok(n) => info!("spectrum FIFO closed after {} frames", n),
            Err(e) => warn!("spectrum FIFO read failed: {}", e),
        }
        let _ = tx.send(SpectrumFrame::silent(bars));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_cava_config_text() {
        let input = CavaInput { method: "fifo".into(), source: "/tmp/mpd_oled_fifo".into() };
        let text = cava_config_text(16, 15, &input, Path::new("/tmp/cava_fifo_42"));
        assert!(text.starts_with("[general]\nframerate = 15\nbars = 16\n"));
        assert!(text.contains("[input]\nmethod = fifo\nsource = /tmp/mpd_oled_fifo\n"));
        assert!(text.contains("raw_target = /tmp/cava_fifo_42\n"));
        assert!(text.ends_with("bit_format = 8bit\n"));
    }

    #[test]
    fn test_pump_frames_drops_partial_tail() {
        let (tx, rx) = watch::channel(SpectrumFrame::silent(4));
        let data: Vec<u8> = vec![1, 2, 3, 4, 10, 20, 30, 40, 99];
        let n = pump_frames(Cursor::new(data), 4, &tx).unwrap();
        assert_eq!(n, 2);
        assert_eq!(rx.borrow().heights, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_stale_frame_reads_as_silence() {
        let now = Instant::now();
        let fresh = SpectrumFrame { heights: vec![5, 6], received: Some(now) };
        assert_eq!(fresh.levels(now, Duration::from_millis(200)), vec![5, 6]);
        let later = now + Duration::from_secs(1);
        assert_eq!(fresh.levels(later, Duration::from_millis(200)), vec![0, 0]);
        assert_eq!(SpectrumFrame::silent(3).levels(now, Duration::from_secs(9)), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_start_on_play_waits_for_play() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (tx, rx) = watch::channel(StatusSnapshot::default());
        let launches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&launches);
        let handle = start_on_play(rx, Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(7u32)
        });

        for state in [PlayState::Stop, PlayState::Pause, PlayState::Unknown, PlayState::Stop] {
            tx.send(StatusSnapshot { state, ..Default::default() }).unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!handle.is_finished());
        assert_eq!(launches.load(Ordering::SeqCst), 0);

        tx.send(StatusSnapshot { state: PlayState::Play, ..Default::default() }).unwrap();
        let launched = handle.await.unwrap();
        assert_eq!(launched.unwrap().unwrap(), 7);
        // later state changes do not relaunch
        tx.send_replace(StatusSnapshot { state: PlayState::Stop, ..Default::default() });
        tx.send_replace(StatusSnapshot { state: PlayState::Play, ..Default::default() });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_on_play_already_playing() {
        let (_tx, rx) = watch::channel(StatusSnapshot { state: PlayState::Play, ..Default::default() });
        let handle = start_on_play(rx, Duration::from_millis(5), || Ok("up"));
        assert_eq!(handle.await.unwrap().unwrap().unwrap(), "up");
    }

    #[tokio::test]
    async fn test_start_on_play_gives_up_when_feed_closes() {
        let (tx, rx) = watch::channel(StatusSnapshot::default());
        let handle = start_on_play(rx, Duration::ZERO, || Ok(()));
        drop(tx);
        assert!(handle.await.unwrap().is_none());
    }

    #[test]
    fn test_make_fifo() {
        use std::os::unix::fs::FileTypeExt;
        let path = std::env::temp_dir().join(format!("lymons-oled-fifo-test-{}", std::process::id()));
        make_fifo(&path).unwrap();
        assert!(fs::metadata(&path).unwrap().file_type().is_fifo());
        // replaces an existing node
        make_fifo(&path).unwrap();
        let _ = fs::remove_file(path);
    }
}
