/*
 *  display/factory.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Opens the Linux bus and GPIO lines a panel needs
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

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, I2cdev, SpidevDevice};
use log::{debug, info};

use crate::config::DisplayConfig;
use crate::display::controller::Controller;
use crate::display::drivers::{I2cTransport, SpiTransport};
use crate::display::error::DisplayError;
use crate::display::panel::PanelType;
use crate::display::traits::{BusKind, DisplayTransport};

/// Type alias for a transport picked at runtime
pub type BoxedTransport = Box<dyn DisplayTransport>;

/// Controller over whichever bus the config selected
pub type BoxedController = Controller<BoxedTransport>;

const CONSUMER: &str = "lymons-oled";

/// Factory for opening panel transports from configuration
pub struct TransportFactory;

impl TransportFactory {
    /// Open the bus the panel is wired to.
    pub fn open(config: &DisplayConfig, panel: PanelType) -> Result<BoxedTransport, DisplayError> {
        match panel.bus_kind() {
            BusKind::I2c => Self::open_i2c(config, panel),
            BusKind::Spi => Self::open_spi(config),
        }
    }

    /// Open the transport and wrap it in a controller with the panel selected.
    pub fn controller(config: &DisplayConfig, panel: PanelType) -> Result<BoxedController, DisplayError> {
        let transport = Self::open(config, panel)?;
        let mut controller = Controller::new(transport, config.options);
        controller.select_panel_type(panel)?;
        Ok(controller)
    }

    fn open_i2c(config: &DisplayConfig, panel: PanelType) -> Result<BoxedTransport, DisplayError> {
        let address = panel.resolve_i2c_address(config.i2c_address).ok_or_else(|| {
            DisplayError::InvalidConfiguration(format!("{} has no I2C address", panel))
        })?;
        let i2c = I2cdev::new(&config.i2c_bus)
            .map_err(|e| DisplayError::I2c(format!("opening {}: {:?}", config.i2c_bus, e)))?;
        let reset = match config.reset_line {
            Some(line) => Some(Self::output_line(&config.gpio_chip, line, "reset")?),
            None => None,
        };
        info!("{} on {} at 0x{:02X}", panel, config.i2c_bus, address);
        Ok(Box::new(I2cTransport::new(i2c, address, reset, Delay)))
    }

    fn open_spi(config: &DisplayConfig) -> Result<BoxedTransport, DisplayError> {
        let mut spi = SpidevDevice::open(&config.spi_device)
            .map_err(|e| DisplayError::Spi(format!("opening {}: {:?}", config.spi_device, e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::Spi(format!("configuring {}: {:?}", config.spi_device, e)))?;

        let dc = Self::output_line(&config.gpio_chip, config.dc_line, "dc")?;
        let reset = match config.reset_line {
            Some(line) => Some(Self::output_line(&config.gpio_chip, line, "reset")?),
            None => None,
        };
        info!("SPI panel on {} at {} Hz, DC line {}", config.spi_device, config.spi_speed_hz, config.dc_line);
        Ok(Box::new(SpiTransport::new(spi, dc, reset, Delay)))
    }

    /// Request one GPIO line as an output, initially high.
    fn output_line(chip_path: &str, offset: u32, role: &str) -> Result<CdevPin, DisplayError> {
        debug!("requesting {} line {} on {}", role, offset, chip_path);
        let mut chip = Chip::new(chip_path)?;
        let handle = chip.get_line(offset)?.request(LineRequestFlags::OUTPUT, 1, CONSUMER)?;
        Ok(CdevPin::new(handle)?)
    }
}
