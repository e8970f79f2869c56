/*
 *  display/mod.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  OLED display stack - pixel buffer, drawing, controller protocols, transports
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod panel;
pub mod framebuffer;

// Drawing
pub mod primitives;
pub mod glyphs;
pub mod scroll;
pub mod text;

// Controller command families and the state machine over them
pub mod protocol;
pub mod controller;

// Bus transports
pub mod drivers;
pub mod factory;

// Layout system for the supported geometries
pub mod layout;

// UI components
pub mod components;

// Screens and the frame loop
pub mod manager;

// Re-exports for convenience
pub use traits::{BusKind, ColorDepth, DisplayCapabilities, DisplayTransport, PixelTarget};
pub use error::DisplayError;
pub use panel::{PanelFamily, PanelType};
pub use framebuffer::{AddressingMode, PixelBuffer};
pub use protocol::{protocol_for, ControllerProtocol, ScrollDirection, ScrollKind, ScrollRequest, ScrollSpeed};
pub use controller::{Controller, ControllerState, PanelOptions};
pub use factory::{BoxedController, BoxedTransport, TransportFactory};
pub use layout::{LayoutCategory, LayoutConfig};
pub use manager::{run_render_loop, spawn_render_thread, supervise_render, Feeds, PerformanceMetrics, Screen, ScreenRenderer};
pub use scroll::{ScrollParams, ScrollState};
