/*
 *  display/drivers/spi.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  4-wire SPI transport - DC line low for commands, high for data
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

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::info;

use crate::display::drivers::ResetLine;
use crate::display::error::DisplayError;
use crate::display::traits::{BusKind, DisplayTransport};

pub struct SpiTransport<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    reset: ResetLine<RST, D>,
}

impl<SPI, DC, RST, D> SpiTransport<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, reset_pin: Option<RST>, delay: D) -> Self {
        info!("SPI transport ready (reset line {})", if reset_pin.is_some() { "wired" } else { "absent" });
        Self { spi, dc, reset: ResetLine::new(reset_pin, delay) }
    }

    fn write(&mut self, data_mode: bool, bytes: &[u8]) -> Result<(), DisplayError> {
        let dc = if data_mode { self.dc.set_high() } else { self.dc.set_low() };
        dc.map_err(|e| DisplayError::Gpio(format!("DC line: {:?}", e)))?;
        let spi = &mut self.spi;
        self.reset
            .retry("SPI write", || spi.write(bytes))
            .map_err(|e| DisplayError::Spi(format!("{:?}", e)))
    }

    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI, DC, RST, D> DisplayTransport for SpiTransport<SPI, DC, RST, D>
where
    SPI: SpiDevice + Send,
    DC: OutputPin + Send,
    RST: OutputPin + Send,
    D: DelayNs + Send,
{
    fn bus_kind(&self) -> BusKind {
        BusKind::Spi
    }

    fn send_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.write(false, bytes)
    }

    fn send_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.write(true, bytes)
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.reset.pulse()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.reset.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::BUS_WRITE_ATTEMPTS;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    /// (dc level, bytes) per SPI write, shared between the fake bus and the fake pin
    type Wire = Arc<Mutex<(bool, Vec<(bool, Vec<u8>)>)>>;

    struct FakeSpi(Wire);
    impl ErrorType for FakeSpi {
        type Error = ErrorKind;
    }
    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            let mut wire = self.0.lock().unwrap();
            let dc = wire.0;
            for op in operations {
                if let Operation::Write(bytes) = op {
                    wire.1.push((dc, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    /// Fails the first `n` transactions
    struct FlakySpi(usize, Wire);
    impl ErrorType for FlakySpi {
        type Error = ErrorKind;
    }
    impl SpiDevice for FlakySpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.0 > 0 {
                self.0 -= 1;
                return Err(ErrorKind::Other);
            }
            FakeSpi(self.1.clone()).transaction(operations)
        }
    }

    struct FakeDc(Wire);
    impl PinErrorType for FakeDc {
        type Error = Infallible;
    }
    impl OutputPin for FakeDc {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().0 = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().0 = true;
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct CountingPin(Arc<Mutex<Vec<bool>>>);
    impl PinErrorType for CountingPin {
        type Error = Infallible;
    }
    impl OutputPin for CountingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().push(true);
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct RecordingDelay(Arc<Mutex<Vec<u32>>>);
    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.lock().unwrap().push(ns / 1_000_000);
        }
        fn delay_ms(&mut self, ms: u32) {
            self.0.lock().unwrap().push(ms);
        }
    }

    #[test]
    fn test_dc_line_follows_mode() {
        let wire: Wire = Arc::new(Mutex::new((true, Vec::new())));
        let mut t: SpiTransport<_, _, CountingPin, RecordingDelay> =
            SpiTransport::new(FakeSpi(wire.clone()), FakeDc(wire.clone()), None, RecordingDelay::default());
        t.send_command(&[0xAE, 0xD5, 0x80]).unwrap();
        t.send_data(&[1, 2, 3]).unwrap();
        t.send_command(&[0xAF]).unwrap();
        let log = wire.lock().unwrap().1.clone();
        assert_eq!(log, vec![
            (false, vec![0xAE, 0xD5, 0x80]),
            (true, vec![1, 2, 3]),
            (false, vec![0xAF]),
        ]);
    }

    #[test]
    fn test_reset_pulse_sequence() {
        let wire: Wire = Arc::new(Mutex::new((false, Vec::new())));
        let rst = CountingPin::default();
        let delay = RecordingDelay::default();
        let mut t = SpiTransport::new(FakeSpi(wire.clone()), FakeDc(wire), Some(rst.clone()), delay.clone());
        t.reset().unwrap();
        assert_eq!(*rst.0.lock().unwrap(), vec![true, false, true]);
        assert_eq!(*delay.0.lock().unwrap(), vec![1, 10]);
    }

    #[test]
    fn test_transient_failure_is_retried_with_backoff() {
        let wire: Wire = Arc::new(Mutex::new((false, Vec::new())));
        let delay = RecordingDelay::default();
        let mut t: SpiTransport<_, _, CountingPin, _> =
            SpiTransport::new(FlakySpi(2, wire.clone()), FakeDc(wire.clone()), None, delay.clone());
        t.send_data(&[7, 8]).unwrap();
        assert_eq!(wire.lock().unwrap().1, vec![(true, vec![7, 8])]);
        assert_eq!(*delay.0.lock().unwrap(), vec![2, 4]);
    }

    #[test]
    fn test_persistent_failure_gives_up() {
        let wire: Wire = Arc::new(Mutex::new((false, Vec::new())));
        let delay = RecordingDelay::default();
        let mut t: SpiTransport<_, _, CountingPin, _> =
            SpiTransport::new(FlakySpi(usize::MAX, wire.clone()), FakeDc(wire.clone()), None, delay.clone());
        assert!(matches!(t.send_command(&[0xAF]), Err(DisplayError::Spi(_))));
        assert!(wire.lock().unwrap().1.is_empty());
        assert_eq!(delay.0.lock().unwrap().len(), BUS_WRITE_ATTEMPTS as usize - 1);
    }
}
