/*
 *  display/controller.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel controller - owns transport, pixel buffer and family protocol
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

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;
use crate::display::framebuffer::{AddressingMode, PixelBuffer};
use crate::display::panel::PanelType;
use crate::display::protocol::commands::{DISPLAY_OFF, DISPLAY_ON};
use crate::display::protocol::{protocol_for, ControllerProtocol, ScrollRequest};
use crate::display::traits::{DisplayCapabilities, DisplayTransport};

/// Settle time after switching the panel on
const DISPLAY_ON_SETTLE_MS: u32 = 100;

/// Brightest gray, restored on every bring-up
const DEFAULT_GRAY: u8 = 0x0F;

/// Per panel tweaks that do not change the command family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    /// Overrides the geometry dependent contrast
    pub contrast: Option<u8>,
    /// Start inverted
    pub invert: bool,
    /// Draw upside down (software flip, all families)
    pub rotate_180: bool,
}

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Configured,
    Active,
}

struct Selected {
    protocol: Box<dyn ControllerProtocol>,
    buffer: PixelBuffer,
}

/// Drives one panel over one transport.
///
/// `select_panel_type` allocates the buffer and picks the protocol,
/// `begin` brings the glass up. Drawing goes through [`Controller::buffer_mut`]
/// and reaches the panel on [`Controller::display`].
pub struct Controller<T: DisplayTransport> {
    transport: T,
    options: PanelOptions,
    selected: Option<Selected>,
    active: bool,
    scrolling: bool,
}

impl<T: DisplayTransport> Controller<T> {
    pub fn new(transport: T, options: PanelOptions) -> Self {
        Self { transport, options, selected: None, active: false, scrolling: false }
    }

    pub fn state(&self) -> ControllerState {
        match (&self.selected, self.active) {
            (None, _) => ControllerState::Uninitialized,
            (Some(_), false) => ControllerState::Configured,
            (Some(_), true) => ControllerState::Active,
        }
    }

    /// Resolve the panel's family and allocate its buffer.
    ///
    /// Selecting again discards the old buffer and drops back to
    /// `Configured`; `begin` has to run again.
    pub fn select_panel_type(&mut self, panel: PanelType) -> Result<(), DisplayError> {
        if panel.bus_kind() != self.transport.bus_kind() {
            return Err(DisplayError::InvalidConfiguration(format!(
                "{} needs a {:?} transport, got {:?}",
                panel,
                panel.bus_kind(),
                self.transport.bus_kind()
            )));
        }
        let mut buffer = PixelBuffer::new(panel.width(), panel.height(), panel.addressing());
        buffer.set_flipped(self.options.rotate_180);
        info!("selected {} ({}x{}, {:?}, {} byte buffer)", panel, panel.width(), panel.height(), panel.addressing(), buffer.size());
        self.selected = Some(Selected { protocol: protocol_for(panel), buffer });
        self.active = false;
        self.scrolling = false;
        Ok(())
    }

    pub fn panel(&self) -> Option<PanelType> {
        self.selected.as_ref().map(|s| s.protocol.panel())
    }

    pub fn capabilities(&self) -> Option<DisplayCapabilities> {
        self.panel().map(PanelType::capabilities)
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn buffer(&self) -> Result<&PixelBuffer, DisplayError> {
        self.selected.as_ref().map(|s| &s.buffer).ok_or(DisplayError::NotReady("no panel selected"))
    }

    pub fn buffer_mut(&mut self) -> Result<&mut PixelBuffer, DisplayError> {
        self.selected.as_mut().map(|s| &mut s.buffer).ok_or(DisplayError::NotReady("no panel selected"))
    }

    /// Split borrow of the parts an active panel needs
    fn active_parts(&mut self) -> Result<(&mut T, &mut Selected), DisplayError> {
        if !self.active {
            return Err(DisplayError::NotReady("begin() has not completed"));
        }
        let selected = self.selected.as_mut().ok_or(DisplayError::NotReady("no panel selected"))?;
        Ok((&mut self.transport, selected))
    }

    /// Full bring-up: reset pulse, family registers, contrast, scroll off,
    /// blank RAM, display on.
    pub fn begin(&mut self) -> Result<(), DisplayError> {
        let selected = self.selected.as_mut().ok_or(DisplayError::NotReady("select_panel_type() first"))?;
        let bus: &mut dyn DisplayTransport = &mut self.transport;
        let panel = selected.protocol.panel();
        info!("bringing up {}", panel);

        self.active = false;
        bus.reset()?;
        selected.protocol.configure(bus)?;

        let contrast = self.options.contrast.unwrap_or(panel.bring_up_params().contrast);
        selected.protocol.set_contrast(bus, contrast)?;
        selected.protocol.stop_scroll(bus)?;
        self.scrolling = false;

        selected.buffer.clear();
        if selected.buffer.mode() == AddressingMode::NibblePacked {
            selected.buffer.set_gray_level(DEFAULT_GRAY);
        }

        bus.send_command(&[DISPLAY_ON])?;
        bus.delay_ms(DISPLAY_ON_SETTLE_MS);

        if self.options.invert {
            selected.protocol.invert(bus, true)?;
        }
        self.active = true;
        info!("{} is up (contrast 0x{:02X})", panel, contrast);
        Ok(())
    }

    /// Blank the buffer (not the glass)
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.buffer_mut()?.clear();
        Ok(())
    }

    /// Push the buffer to the panel.
    ///
    /// A running hardware scroll is stopped first. A bus failure aborts
    /// the frame at the failing write and is returned as-is.
    pub fn display(&mut self) -> Result<(), DisplayError> {
        let scrolling = self.scrolling;
        let (bus, selected) = self.active_parts()?;
        if scrolling {
            debug!("stopping hardware scroll before frame push");
            selected.protocol.stop_scroll(bus)?;
        }
        self.scrolling = false;
        let (bus, selected) = self.active_parts()?;
        selected.protocol.flush(bus, &selected.buffer)
    }

    pub fn set_gray_level(&mut self, level: u8) -> Result<(), DisplayError> {
        self.buffer_mut()?.set_gray_level(level);
        Ok(())
    }

    pub fn invert_display(&mut self, inverted: bool) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        selected.protocol.invert(bus, inverted)
    }

    pub fn set_brightness(&mut self, contrast: u8) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        selected.protocol.set_contrast(bus, contrast)
    }

    pub fn start_scroll(&mut self, request: &ScrollRequest) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        selected.protocol.start_scroll(bus, request)?;
        self.scrolling = true;
        Ok(())
    }

    pub fn stop_scroll(&mut self) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        selected.protocol.stop_scroll(bus)?;
        self.scrolling = false;
        Ok(())
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Direct text cursor (SSD1327 only)
    pub fn set_text_xy(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        selected.protocol.set_text_xy(bus, row, col)
    }

    pub fn put_char(&mut self, ch: char) -> Result<(), DisplayError> {
        let (bus, selected) = self.active_parts()?;
        let gray = selected.buffer.gray_nibbles();
        selected.protocol.put_char(bus, crate::display::glyphs::code_for(ch), gray)
    }

    pub fn put_str(&mut self, text: &str) -> Result<(), DisplayError> {
        text.chars().try_for_each(|ch| self.put_char(ch))
    }

    /// Blank the glass and switch it off. No-op unless active.
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        if !self.active {
            return Ok(());
        }
        info!("switching panel off");
        if let Some(selected) = self.selected.as_mut() {
            selected.buffer.clear();
        }
        let flushed = self.display();
        self.transport.send_command(&[DISPLAY_OFF])?;
        self.active = false;
        flushed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::{RecordingTransport, Sent};
    use crate::display::protocol::ScrollDirection;
    use crate::display::traits::BusKind;

    fn controller(bus: BusKind) -> Controller<RecordingTransport> {
        Controller::new(RecordingTransport::new(bus), PanelOptions::default())
    }

    #[test]
    fn test_state_machine() {
        let mut c = controller(BusKind::I2c);
        assert_eq!(c.state(), ControllerState::Uninitialized);
        assert!(matches!(c.buffer(), Err(DisplayError::NotReady(_))));
        assert!(matches!(c.begin(), Err(DisplayError::NotReady(_))));

        c.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
        assert_eq!(c.state(), ControllerState::Configured);
        assert_eq!(c.buffer().unwrap().size(), 1024);
        assert!(matches!(c.display(), Err(DisplayError::NotReady(_))));

        c.begin().unwrap();
        assert_eq!(c.state(), ControllerState::Active);
        c.display().unwrap();

        // reselecting reallocates and requires a new begin
        c.select_panel_type(PanelType::SeeedI2c96x96).unwrap();
        assert_eq!(c.state(), ControllerState::Configured);
        assert_eq!(c.buffer().unwrap().size(), 96 * 96 / 2);
    }

    #[test]
    fn test_bus_mismatch_rejected() {
        let mut c = controller(BusKind::Spi);
        let err = c.select_panel_type(PanelType::AdafruitI2c128x32).unwrap_err();
        assert!(matches!(err, DisplayError::InvalidConfiguration(_)));
        assert_eq!(c.state(), ControllerState::Uninitialized);
    }

    #[test]
    fn test_begin_tail() {
        let mut c = controller(BusKind::I2c);
        let log = c.transport().log();
        c.select_panel_type(PanelType::AdafruitI2c128x32).unwrap();
        c.buffer_mut().unwrap().set_pixel(3, 3, true);
        c.begin().unwrap();

        let log = log.lock().unwrap();
        let cmds = log.commands();
        let n = cmds.len();
        assert_eq!(&cmds[n - 3..], &[&[0x81u8, 0x8F][..], &[0x2E][..], &[0xAF][..]]);
        assert_eq!(log.reset_count, 1);
        assert_eq!(log.delayed_ms, 100);
        assert_eq!(c.buffer().unwrap().count_lit(), 0);
    }

    #[test]
    fn test_contrast_override_and_invert_option() {
        let options = PanelOptions { contrast: Some(0x20), invert: true, rotate_180: false };
        let mut c = Controller::new(RecordingTransport::new(BusKind::I2c), options);
        let log = c.transport().log();
        c.select_panel_type(PanelType::SeeedI2c96x96).unwrap();
        c.begin().unwrap();
        let log = log.lock().unwrap();
        let cmds = log.commands();
        assert!(cmds.contains(&&[0x81, 0x20][..]));
        assert_eq!(cmds.last(), Some(&&[0xA7][..]));
    }

    #[test]
    fn test_display_aborts_on_bus_failure_without_panic() {
        let mut c = controller(BusKind::Spi);
        let log = c.transport().log();
        c.select_panel_type(PanelType::AdafruitSpi128x64).unwrap();
        c.begin().unwrap();

        log.lock().unwrap().simulate_data_failure = true;
        assert!(matches!(c.display(), Err(DisplayError::Spi(_))));
        // still active; the next frame goes through once the bus recovers
        assert_eq!(c.state(), ControllerState::Active);
        log.lock().unwrap().simulate_data_failure = false;
        log.lock().unwrap().clear();
        c.display().unwrap();
        assert_eq!(log.lock().unwrap().data_bytes(), 1024);
    }

    #[test]
    fn test_display_stops_hardware_scroll() {
        let mut c = controller(BusKind::I2c);
        let log = c.transport().log();
        c.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
        c.begin().unwrap();
        c.start_scroll(&ScrollRequest::horizontal(ScrollDirection::Right, 0, 7)).unwrap();
        assert!(c.is_scrolling());
        log.lock().unwrap().clear();

        c.display().unwrap();
        assert!(!c.is_scrolling());
        assert_eq!(log.lock().unwrap().sent[0], Sent::Command(vec![0x2E]));
    }

    #[test]
    fn test_sh1106_scroll_unsupported_keeps_state() {
        let mut c = controller(BusKind::I2c);
        c.select_panel_type(PanelType::Sh1106I2c128x64).unwrap();
        c.begin().unwrap();
        let err = c.start_scroll(&ScrollRequest::horizontal(ScrollDirection::Left, 0, 7));
        assert!(matches!(err, Err(DisplayError::UnsupportedOperation)));
        assert!(!c.is_scrolling());
    }

    #[test]
    fn test_direct_text_on_grayscale_only() {
        let mut c = controller(BusKind::I2c);
        let log = c.transport().log();
        c.select_panel_type(PanelType::SeeedI2c96x96).unwrap();
        c.begin().unwrap();
        log.lock().unwrap().clear();
        c.set_text_xy(0, 0).unwrap();
        c.put_str("Hi").unwrap();
        assert_eq!(log.lock().unwrap().data_bytes(), 64);

        c.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
        c.begin().unwrap();
        assert!(matches!(c.put_char('x'), Err(DisplayError::UnsupportedOperation)));
    }

    #[test]
    fn test_rotate_180_flips_buffer() {
        let options = PanelOptions { rotate_180: true, ..Default::default() };
        let mut c = Controller::new(RecordingTransport::new(BusKind::I2c), options);
        c.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
        let fb = c.buffer_mut().unwrap();
        fb.set_pixel(0, 0, true);
        assert_eq!(fb.as_bytes()[1023], 0x80);
    }

    #[test]
    fn test_shutdown_blanks_and_switches_off() {
        let mut c = controller(BusKind::I2c);
        let log = c.transport().log();
        c.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
        c.begin().unwrap();
        c.buffer_mut().unwrap().set_pixel(10, 10, true);
        log.lock().unwrap().clear();

        c.shutdown().unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.sent.last(), Some(&Sent::Command(vec![0xAE])));
        assert_eq!(log.data_bytes(), 1024);
        assert!(log.sent.iter().all(|s| match s {
            Sent::Data(d) => d.iter().all(|b| *b == 0),
            Sent::Command(_) => true,
        }));
        assert_eq!(c.state(), ControllerState::Configured);
        drop(log);
        c.shutdown().unwrap();
    }
}
