/*
 *  tests/display_integration.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screens rendered and pushed through a recording transport
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

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};

use lymons_oled::config::ScreenConfig;
use lymons_oled::display::drivers::{RecordingTransport, Sent, TransportLog};
use lymons_oled::display::manager::FrameInputs;
use lymons_oled::display::{
    Controller, ControllerState, DisplayError, LayoutConfig, PanelOptions, PanelType, Screen, ScreenRenderer,
};
use lymons_oled::status::{ConnectionInfo, ConnectionKind, PlayState, StatusSnapshot};

fn controller_for(panel: PanelType) -> (Controller<RecordingTransport>, Arc<Mutex<TransportLog>>) {
    let bus = RecordingTransport::new(panel.bus_kind());
    let log = bus.log();
    let mut controller = Controller::new(bus, PanelOptions::default());
    controller.select_panel_type(panel).unwrap();
    controller.begin().unwrap();
    (controller, log)
}

fn playing() -> StatusSnapshot {
    StatusSnapshot {
        state: PlayState::Play,
        volume: Some(70),
        elapsed_secs: 60.0,
        total_secs: 240.0,
        bitrate: 320,
        title: "Sultans of Swing".into(),
        origin: "Dire Straits".into(),
    }
}

fn wifi() -> ConnectionInfo {
    ConnectionInfo { kind: ConnectionKind::Wifi, quality: 80, ip_address: "192.168.1.20".into() }
}

#[test]
fn test_controller_refuses_frames_before_begin() {
    let bus = RecordingTransport::new(PanelType::AdafruitI2c128x64.bus_kind());
    let mut controller = Controller::new(bus, PanelOptions::default());
    assert!(matches!(controller.display(), Err(DisplayError::NotReady(_))));
    controller.select_panel_type(PanelType::AdafruitI2c128x64).unwrap();
    assert_eq!(controller.state(), ControllerState::Configured);
    assert!(controller.display().is_err());
}

#[test]
fn test_clock_screen_on_sh1106() {
    let panel = PanelType::Sh1106I2c128x64;
    let (mut controller, log) = controller_for(panel);
    log.lock().unwrap().clear();

    let t0 = Instant::now();
    let mut renderer = ScreenRenderer::new(LayoutConfig::for_display(&panel.capabilities()), ScreenConfig::default(), 1, t0);
    let stopped = StatusSnapshot::default();
    let connection = wifi();
    let frame = FrameInputs {
        status: &stopped,
        connection: &connection,
        spectrum: &[],
        wall_clock: Utc.with_ymd_and_hms(2024, 3, 9, 21, 45, 0).unwrap(),
    };

    let screen = renderer.render(controller.buffer_mut().unwrap(), &frame, t0).unwrap();
    assert_eq!(screen, Screen::Clock);
    assert!(controller.buffer().unwrap().count_lit() > 0);
    controller.display().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.data_bytes(), 128 * 64 / 8);
    // every page addressed with the two column offset
    let commands = log.command_bytes();
    for page in 0..8u8 {
        let at = commands.iter().position(|&c| c == 0xB0 + page).unwrap();
        assert_eq!(&commands[at..at + 3], &[0xB0 + page, 0x02, 0x10]);
    }
}

#[test]
fn test_playing_screen_on_ssd1327() {
    let panel = PanelType::SeeedI2c96x96;
    let (mut controller, log) = controller_for(panel);
    log.lock().unwrap().clear();

    let t0 = Instant::now();
    let mut renderer = ScreenRenderer::new(LayoutConfig::for_display(&panel.capabilities()), ScreenConfig::default(), 1, t0);
    let status = playing();
    let connection = wifi();
    let levels = [255u8, 128, 64, 0, 32, 200, 90, 10];
    let frame = FrameInputs {
        status: &status,
        connection: &connection,
        spectrum: &levels,
        wall_clock: Utc.with_ymd_and_hms(2024, 3, 9, 9, 5, 0).unwrap(),
    };

    let screen = renderer.render(controller.buffer_mut().unwrap(), &frame, t0 + Duration::from_millis(100)).unwrap();
    assert_eq!(screen, Screen::Playing);
    controller.display().unwrap();

    let log = log.lock().unwrap();
    // 96x96 at two pixels per byte
    assert_eq!(log.data_bytes(), 96 * 96 / 2);
    assert_eq!(log.commands()[..2], [&[0x75, 0x00, 0x5F][..], &[0x15, 0x08, 0x37][..]]);
    assert!(log.sent.iter().any(|s| matches!(s, Sent::Data(d) if d.iter().any(|&b| b != 0))));
}

#[test]
fn test_bus_failure_drops_frame_and_recovers() {
    let panel = PanelType::AdafruitSpi128x64;
    let (mut controller, log) = controller_for(panel);
    controller.buffer_mut().unwrap().set_pixel(3, 3, true);

    log.lock().unwrap().simulate_data_failure = true;
    let err = controller.display().unwrap_err();
    assert!(err.is_bus_error());

    {
        let mut log = log.lock().unwrap();
        log.simulate_data_failure = false;
        log.clear();
    }
    controller.display().unwrap();
    assert_eq!(log.lock().unwrap().data_bytes(), 1024);
}

#[test]
fn test_shutdown_blanks_and_powers_down() {
    let (mut controller, log) = controller_for(PanelType::AdafruitI2c128x32);
    controller.buffer_mut().unwrap().set_pixel(0, 0, true);
    log.lock().unwrap().clear();
    controller.shutdown().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.data_bytes(), 128 * 32 / 8);
    assert_eq!(log.command_bytes().last(), Some(&0xAE));
}
