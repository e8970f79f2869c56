/*
 *  mpd.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  MPD status client and polling task
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

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::status::{fold_to_ascii, PlayState, StatusSnapshot};

/// Tags tried in order for the "where is this from" line
const ORIGIN_TAGS: [&str; 5] = ["Artist", "Name", "AlbumArtist", "Composer", "Performer"];

const STATUS_QUERY: &[u8] = b"command_list_ok_begin\nstatus\ncurrentsong\ncommand_list_end\n";

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MPD refused the request: {0}")]
    Ack(String),

    #[error("unexpected MPD reply: {0}")]
    Protocol(String),

    #[error("MPD did not answer within {0:?}")]
    Timeout(Duration),
}

/// One connection per poll, closed straight after.
#[derive(Debug, Clone)]
pub struct MpdClient {
    address: String,
    io_timeout: Duration,
}

impl MpdClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self { address: format!("{host}:{port}"), io_timeout: Duration::from_secs(2) }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn fetch(&self) -> Result<StatusSnapshot, StatusError> {
        timeout(self.io_timeout, self.exchange())
            .await
            .map_err(|_| StatusError::Timeout(self.io_timeout))?
    }

    async fn exchange(&self) -> Result<StatusSnapshot, StatusError> {
        let stream = TcpStream::connect(&self.address).await?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let greeting = lines.next_line().await?.unwrap_or_default();
        if !greeting.starts_with("OK MPD") {
            return Err(StatusError::Protocol(greeting));
        }

        writer.write_all(STATUS_QUERY).await?;

        let mut reply = Vec::new();
        loop {
            let Some(line) = lines.next_line().await? else {
                return Err(StatusError::Protocol("connection closed mid reply".into()));
            };
            if line == "OK" {
                break;
            }
            if line.starts_with("ACK") {
                return Err(StatusError::Ack(line));
            }
            reply.push(line);
        }
        let _ = writer.write_all(b"close\n").await;
        parse_reply(reply.iter().map(String::as_str))
    }
}

/// Build a snapshot from the `key: value` lines of a status+currentsong reply.
pub fn parse_reply<'a, I>(lines: I) -> Result<StatusSnapshot, StatusError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields: HashMap<&str, Vec<&str>> = HashMap::new();
    for line in lines {
        if line == "list_OK" {
            continue;
        }
        let Some((key, value)) = line.split_once(": ") else {
            return Err(StatusError::Protocol(line.to_string()));
        };
        fields.entry(key).or_default().push(value);
    }

    if let Some(error) = first(&fields, "error") {
        return Err(StatusError::Protocol(format!("player error: {error}")));
    }

    let tag = |key: &str| fold_to_ascii(&fields.get(key).map(|v| v.join("; ")).unwrap_or_default());
    let number = |key: &str| first(&fields, key).and_then(|v| v.parse::<f64>().ok());

    let mut snap = StatusSnapshot {
        state: first(&fields, "state").map_or(PlayState::Unknown, PlayState::from_mpd),
        volume: first(&fields, "volume").and_then(|v| v.parse::<i32>().ok()).and_then(|v| u8::try_from(v).ok()),
        title: tag("Title"),
        origin: ORIGIN_TAGS.into_iter().map(tag).find(|s| !s.is_empty()).unwrap_or_default(),
        ..Default::default()
    };

    if snap.state.has_track() {
        // "time" is the older "elapsed:total" form
        let legacy = first(&fields, "time").and_then(|t| t.split_once(':'));
        snap.elapsed_secs = number("elapsed")
            .or_else(|| legacy.and_then(|(e, _)| e.parse().ok()))
            .unwrap_or(0.0);
        snap.total_secs = number("duration")
            .or_else(|| legacy.and_then(|(_, t)| t.parse().ok()))
            .unwrap_or(0.0);
        snap.bitrate = first(&fields, "bitrate").and_then(|b| b.parse().ok()).unwrap_or(0);
    }
    Ok(snap)
}

fn first<'a>(fields: &HashMap<&str, Vec<&'a str>>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(|v| v.first()).copied()
}

/// Background poller publishing snapshots; stops when `stop` fires or
/// every receiver is gone.
pub fn spawn_poller(
    client: MpdClient,
    interval: Duration,
    tx: watch::Sender<StatusSnapshot>,
    mut stop: mpsc::Receiver<()>,
) -> JoinHandle<()> {
    info!("polling MPD at {} every {:?}", client.address(), interval);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_failed = false;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snap = match client.fetch().await {
                        Ok(snap) => {
                            if last_failed {
                                info!("MPD reachable again");
                            }
                            last_failed = false;
                            snap
                        }
                        Err(e) => {
                            // one warning per outage
                            if !last_failed {
                                warn!("MPD status poll failed: {}", e);
                            } else {
                                debug!("MPD still unavailable: {}", e);
                            }
                            last_failed = true;
                            StatusSnapshot::default()
                        }
                    };
                    let changed = tx.send_if_modified(|cur| {
                        if *cur != snap {
                            *cur = snap;
                            true
                        } else {
                            false
                        }
                    });
                    if changed {
                        debug!("status: {}", *tx.borrow());
                    }
                    if tx.is_closed() {
                        break;
                    }
                }
                _ = stop.recv() => {
                    debug!("MPD poller stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const PLAYING: &str = "volume: 65
repeat: 0
state: play
elapsed: 42.713
duration: 215.300
bitrate: 320
list_OK
file: music/track.flac
Title: Hyperballad
Artist: Björk
Artist: Guest
Album: Post
list_OK";

    #[test]
    fn test_parse_playing_reply() {
        let snap = parse_reply(PLAYING.lines()).unwrap();
        assert_eq!(snap.state, PlayState::Play);
        assert_eq!(snap.volume, Some(65));
        assert!((snap.elapsed_secs - 42.713).abs() < 1e-9);
        assert!((snap.total_secs - 215.3).abs() < 1e-9);
        assert_eq!(snap.bitrate, 320);
        assert_eq!(snap.title, "Hyperballad");
        assert_eq!(snap.origin, "Bjork; Guest");
    }

    #[test]
    fn test_parse_stopped_ignores_position() {
        let reply = "volume: -1\nstate: stop\nelapsed: 12.0\nbitrate: 128\nlist_OK\nName: Radio Paradise\nlist_OK";
        let snap = parse_reply(reply.lines()).unwrap();
        assert_eq!(snap.state, PlayState::Stop);
        assert_eq!(snap.volume, None);
        assert_eq!(snap.elapsed_secs, 0.0);
        assert_eq!(snap.bitrate, 0);
        assert_eq!(snap.origin, "Radio Paradise");
    }

    #[test]
    fn test_parse_legacy_time_field() {
        let reply = "state: pause\ntime: 61:300\nlist_OK\nlist_OK";
        let snap = parse_reply(reply.lines()).unwrap();
        assert_eq!((snap.elapsed_secs, snap.total_secs), (61.0, 300.0));
    }

    #[test]
    fn test_parse_rejects_error_and_garbage() {
        assert!(matches!(parse_reply("state: play\nerror: decoder failed".lines()), Err(StatusError::Protocol(_))));
        assert!(parse_reply(["not a pair"]).is_err());
    }

    async fn fake_mpd(reply: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"OK MPD 0.23.5\n").await.unwrap();
            let mut buf = [0u8; 256];
            let _ = sock.read(&mut buf).await;
            sock.write_all(reply.as_bytes()).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_fetch_over_tcp() {
        let addr = fake_mpd("state: play\nelapsed: 1.0\nduration: 2.0\nlist_OK\nTitle: T\nlist_OK\nOK\n").await;
        let client = MpdClient::new(&addr.ip().to_string(), addr.port());
        let snap = client.fetch().await.unwrap();
        assert_eq!(snap.title, "T");
        assert_eq!(snap.total_secs, 2.0);
    }

    #[tokio::test]
    async fn test_fetch_ack_is_error() {
        let addr = fake_mpd("ACK [5@0] {} unknown command\n").await;
        let client = MpdClient::new(&addr.ip().to_string(), addr.port());
        assert!(matches!(client.fetch().await, Err(StatusError::Ack(_))));
    }
}
