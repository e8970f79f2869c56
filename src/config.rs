/*
 *  config.rs
 *
 *  LyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration - defaults, YAML, command line
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::controller::PanelOptions;
use crate::display::glyphs::FontStyle;
use crate::display::panel::{panel_listing, PanelType};
use crate::display::scroll::ScrollParams;
use crate::display::traits::BusKind;
use crate::spectrum::CavaInput;

/// Width of the spectrum area every layout reserves
pub const SPECTRUM_AREA_WIDTH: u32 = 64;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub screen: ScreenConfig,
    pub spectrum: SpectrumConfig,
    pub mpd: MpdConfig,
}

/// Panel selection and wiring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Catalogue number, see `--list-panels`
    pub panel: Option<PanelType>,
    pub i2c_bus: String,
    /// Overrides the panel's default address
    pub i2c_address: Option<u8>,
    pub spi_device: String,
    pub spi_speed_hz: u32,
    /// GPIO character device holding the DC and reset lines
    pub gpio_chip: String,
    pub dc_line: u32,
    pub reset_line: Option<u32>,
    pub framerate: u32,
    #[serde(flatten)]
    pub options: PanelOptions,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            panel: None,
            i2c_bus: "/dev/i2c-1".into(),
            i2c_address: None,
            spi_device: "/dev/spidev0.0".into(),
            spi_speed_hz: 8_000_000,
            gpio_chip: "/dev/gpiochip0".into(),
            dc_line: 24,
            reset_line: Some(25),
            framerate: 15,
            options: PanelOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// 0: 24h leading zero, 1: 24h, 2: 12h leading zero, 3: 12h
    pub clock_format: u8,
    /// 0: dd-mm-yyyy, 1: mm-dd-yyyy
    pub date_format: u8,
    pub title_scroll: ScrollParams,
    pub origin_scroll: ScrollParams,
    /// Screen shown while paused
    pub pause_screen: PauseScreen,
    /// Font for the title and origin marquees
    pub marquee_font: FontStyle,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            clock_format: 0,
            date_format: 0,
            title_scroll: ScrollParams::default(),
            origin_scroll: ScrollParams::default(),
            pause_screen: PauseScreen::Play,
            marquee_font: FontStyle::Fixed,
        }
    }
}

/// `p` keeps the now playing screen up while paused, `s` drops to the clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseScreen {
    #[default]
    #[serde(rename = "p")]
    Play,
    #[serde(rename = "s")]
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub bars: usize,
    /// Pixels between bars
    pub gap: u32,
    /// Start cava ourselves; otherwise read `fifo` written by someone else
    pub spawn_cava: bool,
    /// cava executable, looked up on PATH
    pub cava_prog: String,
    /// Seconds to wait after playback first starts before launching cava
    pub cava_start_delay: f64,
    pub cava_method: String,
    pub cava_source: String,
    pub fifo: PathBuf,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            bars: 16,
            gap: 1,
            spawn_cava: true,
            cava_prog: "cava".into(),
            cava_start_delay: 2.0,
            cava_method: "fifo".into(),
            cava_source: "/tmp/mpd_oled_fifo".into(),
            fifo: PathBuf::from("/tmp/cava_fifo"),
        }
    }
}

impl SpectrumConfig {
    pub fn cava_input(&self) -> CavaInput {
        CavaInput { method: self.cava_method.clone(), source: self.cava_source.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpdConfig {
    pub host: String,
    pub port: u16,
    pub poll_ms: u64,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self { host: "localhost".into(), port: 6600, poll_ms: 300 }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "lymons-oled", about = "MPD now playing and spectrum on a small OLED", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// OLED type by catalogue number
    #[arg(short = 'o', long = "oled")]
    pub oled: Option<u8>,
    /// Number of spectrum bars (2-60)
    #[arg(short = 'b', long)]
    pub bars: Option<usize>,
    /// Gap between bars in pixels (0-30)
    #[arg(short = 'g', long)]
    pub gap: Option<u32>,
    /// Frame rate in Hz
    #[arg(short = 'f', long)]
    pub framerate: Option<u32>,
    /// Scroll rate and delay: title_rate,title_delay,origin_rate,origin_delay
    #[arg(short = 's', long, value_delimiter = ',', num_args = 1..=4)]
    pub scroll: Option<Vec<f64>>,
    /// Clock format 0-3
    #[arg(short = 'C', long)]
    pub clock_format: Option<u8>,
    /// Date format 0-1
    #[arg(short = 'D', long)]
    pub date_format: Option<u8>,
    /// Screen while paused: p (now playing) or s (clock)
    #[arg(short = 'P', long, value_parser = parse_pause_screen)]
    pub pause_screen: Option<PauseScreen>,
    /// Use the proportional font for the title and origin lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub proportional: bool,
    /// cava input as 'fifo,PATH', 'alsa,STREAM' or 'pulse'
    #[arg(short = 'c', long, value_parser = parse_cava_input)]
    pub cava: Option<CavaInput>,
    /// cava executable to launch
    #[arg(short = 'k', long)]
    pub cava_prog: Option<String>,
    /// Read an existing spectrum FIFO instead of starting cava
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub fifo: Option<PathBuf>,
    /// Rotate the display 180 degrees
    #[arg(short = 'R', long, action = ArgAction::SetTrue)]
    pub rotate: bool,
    /// Start with the display inverted
    #[arg(long, action = ArgAction::SetTrue)]
    pub invert: bool,
    #[arg(long)]
    pub contrast: Option<u8>,
    /// I2C address, two hex digits
    #[arg(short = 'a', long, value_parser = parse_i2c_address)]
    pub i2c_address: Option<u8>,
    #[arg(long)]
    pub i2c_bus: Option<String>,
    /// Reset GPIO line offset
    #[arg(short = 'r', long)]
    pub reset_line: Option<u32>,
    #[arg(long)]
    pub mpd_host: Option<String>,
    #[arg(long)]
    pub mpd_port: Option<u16>,
    /// list the supported OLED types and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_panels: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_i2c_address(s: &str) -> Result<u8, String> {
    if s.len() != 2 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("I2C address should be two hexadecimal digits".into());
    }
    u8::from_str_radix(s, 16).map_err(|e| e.to_string())
}

fn parse_pause_screen(s: &str) -> Result<PauseScreen, String> {
    match s {
        "p" => Ok(PauseScreen::Play),
        "s" => Ok(PauseScreen::Stop),
        _ => Err("pause screen type is not p or s".into()),
    }
}

fn parse_cava_input(s: &str) -> Result<CavaInput, String> {
    let (method, source) = s.split_once(',').unwrap_or((s, ""));
    match method {
        "fifo" | "alsa" if source.is_empty() => Err(format!("cava input method is {method}, but no source was given")),
        "fifo" | "alsa" => Ok(CavaInput { method: method.into(), source: source.into() }),
        "pulse" if s != "pulse" => Err("cava input method is pulse, but is followed by extra text".into()),
        "pulse" => Ok(CavaInput { method: "pulse".into(), source: String::new() }),
        _ => Err("cava input is not 'fifo,fifo_path', 'alsa,alsa_stream', or 'pulse'".into()),
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
/// `--list-panels` and `--dump-config` print and exit here.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();

    if cli.list_panels {
        print!("{}", panel_listing());
        std::process::exit(0);
    }

    let cfg = load_from(&cli)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok((cfg, cli))
}

/// Layer YAML and `cli` over the defaults, then validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!("Config file not found: {}", p.display())));
        }
        read_yaml(p)?
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    apply_cli_overrides(&mut cfg, cli)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/lymons-oled/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lymons-oled.yaml");
        if p.exists() { return Some(p) }
    }
    let p = PathBuf::from("lymons-oled.yaml");
    if p.exists() { return Some(p) }
    None
}

/// Missing keys keep their defaults.
pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Fill a 1..=4 value scroll list: delay defaults to 5, origin copies title.
fn expand_scroll(vals: &[f64]) -> Result<(ScrollParams, ScrollParams), ConfigError> {
    if vals.iter().any(|v| *v < 0.0) {
        return Err(ConfigError::Validation("scroll rates and delays cannot be negative".into()));
    }
    let defaults = ScrollParams::default();
    let rate = vals.first().copied().unwrap_or(defaults.pixels_per_sec);
    let delay = vals.get(1).copied().unwrap_or(defaults.start_delay);
    let origin_rate = vals.get(2).copied().unwrap_or(rate);
    let origin_delay = vals.get(3).copied().unwrap_or(delay);
    Ok((ScrollParams::new(rate, delay), ScrollParams::new(origin_rate, origin_delay)))
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if let Some(id) = cli.oled {
        let panel = PanelType::from_id(id).map_err(|e| ConfigError::Validation(e.to_string()))?;
        cfg.display.panel = Some(panel);
    }
    if cli.i2c_address.is_some()  { cfg.display.i2c_address = cli.i2c_address; }
    if let Some(bus) = &cli.i2c_bus { cfg.display.i2c_bus = bus.clone(); }
    if cli.reset_line.is_some()   { cfg.display.reset_line = cli.reset_line; }
    if let Some(f) = cli.framerate { cfg.display.framerate = f; }
    if cli.contrast.is_some()     { cfg.display.options.contrast = cli.contrast; }
    if cli.rotate                 { cfg.display.options.rotate_180 = true; }
    if cli.invert                 { cfg.display.options.invert = true; }

    if let Some(b) = cli.bars     { cfg.spectrum.bars = b; }
    if let Some(g) = cli.gap      { cfg.spectrum.gap = g; }
    if let Some(input) = &cli.cava {
        cfg.spectrum.cava_method = input.method.clone();
        cfg.spectrum.cava_source = input.source.clone();
    }
    if let Some(prog) = &cli.cava_prog { cfg.spectrum.cava_prog = prog.clone(); }
    if let Some(fifo) = &cli.fifo {
        cfg.spectrum.fifo = fifo.clone();
        cfg.spectrum.spawn_cava = false;
    }

    if let Some(vals) = &cli.scroll {
        let (title, origin) = expand_scroll(vals)?;
        cfg.screen.title_scroll = title;
        cfg.screen.origin_scroll = origin;
    }
    if let Some(c) = cli.clock_format { cfg.screen.clock_format = c; }
    if let Some(d) = cli.date_format  { cfg.screen.date_format = d; }
    if let Some(p) = cli.pause_screen { cfg.screen.pause_screen = p; }
    if cli.proportional               { cfg.screen.marquee_font = FontStyle::Proportional; }

    if let Some(h) = &cli.mpd_host { cfg.mpd.host = h.clone(); }
    if let Some(p) = cli.mpd_port  { cfg.mpd.port = p; }
    Ok(())
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let Some(panel) = cfg.display.panel else {
        return Err(ConfigError::Validation("no OLED type selected, use --oled N (see --list-panels)".into()));
    };
    if panel.bus_kind() == BusKind::I2c && panel.resolve_i2c_address(cfg.display.i2c_address).is_none() {
        return Err(ConfigError::Validation(format!("no I2C address for {}", panel)));
    }
    if !(1..=60).contains(&cfg.display.framerate) {
        return Err(ConfigError::Validation("framerate must be 1..=60".into()));
    }

    let s = &cfg.spectrum;
    if !(2..=60).contains(&s.bars) {
        return Err(ConfigError::Validation("select between 2 and 60 bars".into()));
    }
    if s.gap > 30 {
        return Err(ConfigError::Validation("gap must be between 0 and 30 pixels".into()));
    }
    let needed = s.bars as u32 + (s.bars as u32 - 1) * s.gap;
    if needed > SPECTRUM_AREA_WIDTH {
        return Err(ConfigError::Validation(format!(
            "{} bars with a {} pixel gap need {} pixels, only {} available",
            s.bars, s.gap, needed, SPECTRUM_AREA_WIDTH
        )));
    }

    if s.spawn_cava && s.cava_prog.trim().is_empty() {
        return Err(ConfigError::Validation("cava program name is empty".into()));
    }
    if !s.cava_start_delay.is_finite() || s.cava_start_delay < 0.0 {
        return Err(ConfigError::Validation("cava start delay must be a non-negative number of seconds".into()));
    }

    let sc = &cfg.screen;
    if sc.clock_format > 3 {
        return Err(ConfigError::Validation("clock format number is not 0, 1, 2 or 3".into()));
    }
    if sc.date_format > 1 {
        return Err(ConfigError::Validation("date format number is not 0 or 1".into()));
    }
    for p in [sc.title_scroll, sc.origin_scroll] {
        if p.pixels_per_sec < 0.0 || p.start_delay < 0.0 {
            return Err(ConfigError::Validation("scroll rates and delays cannot be negative".into()));
        }
    }
    Ok(())
}
