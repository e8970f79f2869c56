/*
 *  display/panel.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel catalogue - geometry, controller family and wiring per panel type
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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::display::error::DisplayError;
use crate::display::framebuffer::AddressingMode;
use crate::display::traits::{BusKind, ColorDepth, DisplayCapabilities};

/// Default 7-bit I2C address for every I2C panel in the catalogue
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Controller chip class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFamily {
    Ssd1306,
    Sh1106,
    Ssd1327,
}

/// Where the panel's OLED drive voltage comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcc {
    /// on-chip charge pump
    Internal,
    /// external supply, charge pump off
    External,
}

/// Supported panels, numbered as on the command line (`--oled N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PanelType {
    AdafruitSpi128x32 = 0,
    AdafruitSpi128x64 = 1,
    AdafruitI2c128x32 = 2,
    AdafruitI2c128x64 = 3,
    SeeedI2c128x64 = 4,
    SeeedI2c96x96 = 5,
    Sh1106I2c128x64 = 6,
    Sh1106Spi128x64 = 7,
}

impl PanelType {
    pub const ALL: [PanelType; 8] = [
        PanelType::AdafruitSpi128x32,
        PanelType::AdafruitSpi128x64,
        PanelType::AdafruitI2c128x32,
        PanelType::AdafruitI2c128x64,
        PanelType::SeeedI2c128x64,
        PanelType::SeeedI2c96x96,
        PanelType::Sh1106I2c128x64,
        PanelType::Sh1106Spi128x64,
    ];

    pub fn from_id(id: u8) -> Result<Self, DisplayError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(DisplayError::UnknownPanel(id))
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PanelType::AdafruitSpi128x32 => "Adafruit SPI 128x32",
            PanelType::AdafruitSpi128x64 => "Adafruit SPI 128x64",
            PanelType::AdafruitI2c128x32 => "Adafruit I2C 128x32",
            PanelType::AdafruitI2c128x64 => "Adafruit I2C 128x64",
            PanelType::SeeedI2c128x64 => "Seeed I2C 128x64",
            PanelType::SeeedI2c96x96 => "Seeed I2C 96x96",
            PanelType::Sh1106I2c128x64 => "SH1106 I2C 128x64",
            PanelType::Sh1106Spi128x64 => "SH1106 SPI 128x64",
        }
    }

    pub fn width(self) -> u32 {
        match self {
            PanelType::SeeedI2c96x96 => 96,
            _ => 128,
        }
    }

    pub fn height(self) -> u32 {
        match self {
            PanelType::AdafruitSpi128x32 | PanelType::AdafruitI2c128x32 => 32,
            PanelType::SeeedI2c96x96 => 96,
            _ => 64,
        }
    }

    pub fn family(self) -> PanelFamily {
        match self {
            PanelType::SeeedI2c96x96 => PanelFamily::Ssd1327,
            PanelType::Sh1106I2c128x64 | PanelType::Sh1106Spi128x64 => PanelFamily::Sh1106,
            _ => PanelFamily::Ssd1306,
        }
    }

    pub fn addressing(self) -> AddressingMode {
        match self.family() {
            PanelFamily::Ssd1306 => AddressingMode::PagedMono,
            PanelFamily::Sh1106 => AddressingMode::ByteColumn,
            PanelFamily::Ssd1327 => AddressingMode::NibblePacked,
        }
    }

    pub fn bus_kind(self) -> BusKind {
        match self {
            PanelType::AdafruitSpi128x32
            | PanelType::AdafruitSpi128x64
            | PanelType::Sh1106Spi128x64 => BusKind::Spi,
            _ => BusKind::I2c,
        }
    }

    /// Default I2C address, `None` for SPI panels.
    pub fn default_i2c_address(self) -> Option<u8> {
        match self.bus_kind() {
            BusKind::I2c => Some(DEFAULT_I2C_ADDRESS),
            BusKind::Spi => None,
        }
    }

    /// Address to talk to: a nonzero override wins over the catalogue default.
    pub fn resolve_i2c_address(self, override_addr: Option<u8>) -> Option<u8> {
        match override_addr {
            Some(addr) if addr != 0 && self.bus_kind() == BusKind::I2c => Some(addr),
            _ => self.default_i2c_address(),
        }
    }

    pub fn vcc(self) -> Vcc {
        match self {
            PanelType::SeeedI2c128x64 => Vcc::External,
            _ => Vcc::Internal,
        }
    }

    pub fn capabilities(self) -> DisplayCapabilities {
        DisplayCapabilities {
            width: self.width(),
            height: self.height(),
            color_depth: match self.family() {
                PanelFamily::Ssd1327 => ColorDepth::Gray4,
                _ => ColorDepth::Monochrome,
            },
            supports_hw_scroll: self.family() != PanelFamily::Sh1106,
            // I²C we should manage 30fps, SPI 60fps
            max_fps: match self.bus_kind() {
                BusKind::I2c => 30,
                BusKind::Spi => 60,
            },
        }
    }

    /// Geometry dependent bring-up values for the mono families.
    pub fn bring_up_params(self) -> BringUpParams {
        let (multiplex, com_pins, contrast) = match (self.width(), self.height()) {
            (_, 32) => (0x1F, 0x02, 0x8F),
            (96, 96) => (0x5F, 0x12, 0x53),
            _ => {
                let contrast = if self.family() == PanelFamily::Sh1106 {
                    0x80
                } else if self.vcc() == Vcc::External {
                    0x9F
                } else {
                    0xCF
                };
                (0x3F, 0x12, contrast)
            }
        };
        let (charge_pump, precharge) = match self.vcc() {
            Vcc::External => (0x10, 0x22),
            Vcc::Internal => (0x14, 0xF1),
        };
        BringUpParams { multiplex, com_pins, contrast, charge_pump, precharge }
    }
}

impl TryFrom<u8> for PanelType {
    type Error = DisplayError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PanelType::from_id(id)
    }
}

impl From<PanelType> for u8 {
    fn from(panel: PanelType) -> u8 {
        panel.id()
    }
}

impl fmt::Display for PanelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Register values that vary with panel geometry and supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpParams {
    pub multiplex: u8,
    pub com_pins: u8,
    pub contrast: u8,
    pub charge_pump: u8,
    pub precharge: u8,
}

/// One line per panel, for `--help` style listings.
pub fn panel_listing() -> String {
    PanelType::ALL
        .iter()
        .map(|p| format!("  {} - {}", p.id(), p.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_ids_round_trip_catalogue() {
        for (i, panel) in PanelType::ALL.iter().enumerate() {
            assert_eq!(panel.id() as usize, i);
            assert_eq!(PanelType::from_id(i as u8).unwrap(), *panel);
        }
        assert!(matches!(PanelType::from_id(8), Err(DisplayError::UnknownPanel(8))));
    }

    #[test]
    fn test_panel_geometry_and_family() {
        let p = PanelType::SeeedI2c96x96;
        assert_eq!((p.width(), p.height()), (96, 96));
        assert_eq!(p.family(), PanelFamily::Ssd1327);
        assert_eq!(p.addressing(), AddressingMode::NibblePacked);

        let p = PanelType::Sh1106I2c128x64;
        assert_eq!(p.addressing(), AddressingMode::ByteColumn);
        assert!(!p.capabilities().supports_hw_scroll);

        assert_eq!(PanelType::AdafruitSpi128x32.bus_kind(), BusKind::Spi);
        assert_eq!(PanelType::AdafruitI2c128x32.height(), 32);
    }

    #[test]
    fn test_i2c_address_override() {
        let p = PanelType::AdafruitI2c128x64;
        assert_eq!(p.resolve_i2c_address(None), Some(0x3C));
        assert_eq!(p.resolve_i2c_address(Some(0)), Some(0x3C));
        assert_eq!(p.resolve_i2c_address(Some(0x3D)), Some(0x3D));
        assert_eq!(PanelType::AdafruitSpi128x64.resolve_i2c_address(Some(0x3D)), None);
    }

    #[test]
    fn test_bring_up_params() {
        let p = PanelType::AdafruitI2c128x32.bring_up_params();
        assert_eq!((p.multiplex, p.com_pins, p.contrast), (0x1F, 0x02, 0x8F));

        let p = PanelType::SeeedI2c128x64.bring_up_params();
        assert_eq!((p.contrast, p.charge_pump, p.precharge), (0x9F, 0x10, 0x22));

        let p = PanelType::AdafruitI2c128x64.bring_up_params();
        assert_eq!((p.contrast, p.charge_pump, p.precharge), (0xCF, 0x14, 0xF1));

        assert_eq!(PanelType::Sh1106I2c128x64.bring_up_params().contrast, 0x80);
    }

    #[test]
    fn test_panel_serde_as_number() {
        let p: PanelType = serde_yaml::from_str("6").unwrap();
        assert_eq!(p, PanelType::Sh1106I2c128x64);
        assert!(serde_yaml::from_str::<PanelType>("42").is_err());
        assert_eq!(serde_yaml::to_string(&PanelType::SeeedI2c96x96).unwrap().trim(), "5");
    }
}
