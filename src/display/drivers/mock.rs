/*
 *  display/drivers/mock.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording transport for testing without hardware
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

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::traits::{BusKind, DisplayTransport};

/// One call that reached the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Command(Vec<u8>),
    Data(Vec<u8>),
}

/// Shared state for the recording transport (inspected by tests)
#[derive(Debug, Default)]
pub struct TransportLog {
    /// Every successful write, in order
    pub sent: Vec<Sent>,

    /// Number of reset pulses requested
    pub reset_count: usize,

    /// Sum of requested delays
    pub delayed_ms: u64,

    /// Simulate failures (for error testing)
    pub simulate_command_failure: bool,
    pub simulate_data_failure: bool,

    /// Fail every write once this many writes have succeeded
    pub fail_after: Option<usize>,

    /// Writes rejected by the failure switches
    pub failed_writes: usize,
}

impl TransportLog {
    pub fn commands(&self) -> Vec<&[u8]> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Command(c) => Some(c.as_slice()),
                Sent::Data(_) => None,
            })
            .collect()
    }

    /// Command bytes flattened, as they would appear on the wire
    pub fn command_bytes(&self) -> Vec<u8> {
        self.commands().concat()
    }

    pub fn data_bytes(&self) -> usize {
        self.sent
            .iter()
            .map(|s| match s {
                Sent::Data(d) => d.len(),
                Sent::Command(_) => 0,
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
        self.reset_count = 0;
        self.delayed_ms = 0;
        self.failed_writes = 0;
    }
}

/// Transport that records instead of touching a bus.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    bus: BusKind,
    log: Arc<Mutex<TransportLog>>,
}

impl RecordingTransport {
    pub fn new(bus: BusKind) -> Self {
        Self { bus, log: Arc::new(Mutex::new(TransportLog::default())) }
    }

    /// Handle to the shared log; stays valid after the transport is moved
    pub fn log(&self) -> Arc<Mutex<TransportLog>> {
        Arc::clone(&self.log)
    }

    fn lock(&self) -> MutexGuard<'_, TransportLog> {
        // a poisoned log only means a test thread panicked mid-write
        self.log.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&mut self, entry: Sent) -> Result<(), DisplayError> {
        let bus = self.bus;
        let mut log = self.lock();
        let switched_off = match entry {
            Sent::Command(_) => log.simulate_command_failure,
            Sent::Data(_) => log.simulate_data_failure,
        };
        let exhausted = log.fail_after.is_some_and(|n| log.sent.len() >= n);
        if switched_off || exhausted {
            log.failed_writes += 1;
            return Err(match bus {
                BusKind::I2c => DisplayError::I2c("simulated bus failure".into()),
                BusKind::Spi => DisplayError::Spi("simulated bus failure".into()),
            });
        }
        log.sent.push(entry);
        Ok(())
    }
}

impl DisplayTransport for RecordingTransport {
    fn bus_kind(&self) -> BusKind {
        self.bus
    }

    fn send_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.record(Sent::Command(bytes.to_vec()))
    }

    fn send_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.record(Sent::Data(bytes.to_vec()))
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.lock().reset_count += 1;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.lock().delayed_ms += ms as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_transport_logs_in_order() {
        let mut t = RecordingTransport::new(BusKind::I2c);
        let log = t.log();
        t.send_command(&[0xAE]).unwrap();
        t.send_data(&[1, 2]).unwrap();
        t.reset().unwrap();
        t.delay_ms(100);

        let log = log.lock().unwrap();
        assert_eq!(log.sent, vec![Sent::Command(vec![0xAE]), Sent::Data(vec![1, 2])]);
        assert_eq!(log.reset_count, 1);
        assert_eq!(log.delayed_ms, 100);
        assert_eq!(log.data_bytes(), 2);
    }

    #[test]
    fn test_recording_transport_simulated_failure() {
        let mut t = RecordingTransport::new(BusKind::Spi);
        t.log().lock().unwrap().simulate_data_failure = true;
        assert!(t.send_command(&[0xAF]).is_ok());
        assert!(matches!(t.send_data(&[0]), Err(DisplayError::Spi(_))));

        t.log().lock().unwrap().simulate_data_failure = false;
        t.log().lock().unwrap().fail_after = Some(2);
        assert!(t.send_data(&[0]).is_ok());
        assert!(t.send_data(&[0]).is_err());
        assert_eq!(t.log().lock().unwrap().failed_writes, 2);
    }
}
