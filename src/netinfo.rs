/*
 *  netinfo.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Connection monitor - ethernet link, wifi quality, local address
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

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use local_ip_address::{list_afinet_netifas, local_ip};
use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::status::{ConnectionInfo, ConnectionKind};

const ETHERNET_IFACES: [&str; 4] = ["eth0", "eth1", "eth2", "eth3"];

/// Where the monitor looks; swapped out in tests
#[derive(Debug, Clone)]
pub struct NetMonitor {
    sys_class_net: PathBuf,
    proc_wireless: PathBuf,
}

impl Default for NetMonitor {
    fn default() -> Self {
        Self {
            sys_class_net: PathBuf::from("/sys/class/net"),
            proc_wireless: PathBuf::from("/proc/net/wireless"),
        }
    }
}

impl NetMonitor {
    pub fn with_roots(sys_class_net: impl Into<PathBuf>, proc_wireless: impl Into<PathBuf>) -> Self {
        Self { sys_class_net: sys_class_net.into(), proc_wireless: proc_wireless.into() }
    }

    /// Ethernet wins over wifi; the address comes from whichever interface matched.
    pub fn sample(&self) -> ConnectionInfo {
        let (kind, iface, quality) = if let Some(eth) = self.ethernet_up() {
            (ConnectionKind::Ethernet, Some(eth), 0)
        } else if let Some((wlan, quality)) = self.wireless() {
            (ConnectionKind::Wifi, Some(wlan), quality)
        } else {
            (ConnectionKind::None, None, 0)
        };
        let ip_address = iface.as_deref().and_then(address_of).map(|ip| ip.to_string()).unwrap_or_default();
        ConnectionInfo { kind, quality, ip_address }
    }

    fn ethernet_up(&self) -> Option<String> {
        ETHERNET_IFACES
            .iter()
            .find(|iface| operstate_up(&self.sys_class_net.join(iface).join("operstate")))
            .map(|iface| iface.to_string())
    }

    fn wireless(&self) -> Option<(String, u8)> {
        let text = fs::read_to_string(&self.proc_wireless).ok()?;
        parse_wireless(&text)
    }
}

fn operstate_up(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|s| s.trim() == "up")
}

/// First interface line of `/proc/net/wireless`: name and link quality.
pub fn parse_wireless(text: &str) -> Option<(String, u8)> {
    // two header lines, then "wlan0: 0000   70.  -40.  -256 ..."
    let line = text.lines().skip(2).find(|l| !l.trim().is_empty())?;
    let mut cols = line.split_whitespace();
    let name = cols.next()?.trim_end_matches(':').to_string();
    let link = cols.nth(1)?.trim_end_matches('.');
    let quality = link.parse::<i32>().unwrap_or(0).clamp(0, 100) as u8;
    Some((name, quality))
}

fn address_of(iface: &str) -> Option<IpAddr> {
    match list_afinet_netifas() {
        Ok(list) => list
            .into_iter()
            .find(|(name, ip)| name == iface && ip.is_ipv4())
            .map(|(_, ip)| ip)
            .or_else(|| local_ip().ok()),
        Err(e) => {
            debug!("interface list unavailable: {}", e);
            local_ip().ok()
        }
    }
}

/// Re-sample every `interval`, publishing only changes.
pub fn spawn_monitor(
    monitor: NetMonitor,
    interval: Duration,
    tx: watch::Sender<ConnectionInfo>,
    mut stop: mpsc::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let monitor = monitor.clone();
                    let Ok(info) = tokio::task::spawn_blocking(move || monitor.sample()).await else {
                        break;
                    };
                    tx.send_if_modified(|cur| {
                        if *cur != info {
                            info!("network: {:?} {} ({}%)", info.kind, info.ip_address, info.quality);
                            *cur = info;
                            true
                        } else {
                            false
                        }
                    });
                }
                _ = stop.recv() => break,
            }
        }
    })
}
