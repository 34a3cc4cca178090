//! Named LED zones
//!
//! Each [`Led`] reads and writes one zone (backlight, logo, scroll wheel...)
//! through the device's transaction executor. Values are cached only after
//! the device confirmed them, so a failed write leaves the cache matching
//! the last known device state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chroma_transport::protocol::VARSTORE;
use chroma_transport::{Command, TransactionExecutor};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brightness::BrightnessScaler;
use crate::error::DeviceError;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create color from HSV values
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match (h / 60.0) as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self {
            r: ((r + m) * 255.0).round() as u8,
            g: ((g + m) * 255.0).round() as u8,
            b: ((b + m) * 255.0).round() as u8,
        }
    }

    /// Wire order: r, g, b
    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `#rrggbb`, `rrggbb` or a basic color name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "off" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "red" => return Ok(Self::RED),
            "green" => return Ok(Self::GREEN),
            "blue" => return Ok(Self::BLUE),
            _ => {}
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid color \"{s}\": use #rrggbb or a color name"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("invalid color \"{s}\": bad hex digits"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// LED zone identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LedType {
    ScrollWheel = 0x01,
    Battery = 0x03,
    Logo = 0x04,
    Backlight = 0x05,
    Macro = 0x07,
    Game = 0x08,
    ProfileRed = 0x0C,
    ProfileGreen = 0x0D,
    ProfileBlue = 0x0E,
}

impl LedType {
    pub const ALL: [LedType; 9] = [
        LedType::ScrollWheel,
        LedType::Battery,
        LedType::Logo,
        LedType::Backlight,
        LedType::Macro,
        LedType::Game,
        LedType::ProfileRed,
        LedType::ProfileGreen,
        LedType::ProfileBlue,
    ];

    /// Zone byte on the wire
    pub fn wire(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ScrollWheel => "scroll_wheel",
            Self::Battery => "battery",
            Self::Logo => "logo",
            Self::Backlight => "backlight",
            Self::Macro => "macro",
            Self::Game => "game",
            Self::ProfileRed => "profile_red",
            Self::ProfileGreen => "profile_green",
            Self::ProfileBlue => "profile_blue",
        }
    }
}

impl fmt::Display for LedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| format!("unknown LED \"{s}\""))
    }
}

/// Per-LED lighting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LedMode {
    #[default]
    Static = 0x00,
    Blink = 0x01,
    Pulse = 0x02,
    Spectrum = 0x04,
}

impl LedMode {
    /// Get mode from numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Static),
            0x01 => Some(Self::Blink),
            0x02 => Some(Self::Pulse),
            0x04 => Some(Self::Spectrum),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Blink => "blink",
            Self::Pulse => "pulse",
            Self::Spectrum => "spectrum",
        }
    }
}

impl FromStr for LedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "blink" => Ok(Self::Blink),
            "pulse" => Ok(Self::Pulse),
            "spectrum" => Ok(Self::Spectrum),
            _ => Err(format!(
                "unknown LED mode \"{s}\". Use static, blink, pulse or spectrum"
            )),
        }
    }
}

/// Snapshot of one LED zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedState {
    pub led_type: LedType,
    pub color: Rgb,
    /// Logical brightness (0-100)
    pub brightness: f64,
    pub mode: LedMode,
    pub enabled: bool,
}

/// Last confirmed values; `None` until read or written successfully
#[derive(Debug, Clone, Default)]
struct Confirmed {
    enabled: Option<bool>,
    color: Option<Rgb>,
    brightness: Option<f64>,
    mode: Option<LedMode>,
}

/// Accessor for one LED zone
///
/// Shared as `Arc<Led>`; the cache lock is held only for the duration of one
/// call, so a handle can be kept while using the rest of the device.
pub struct Led {
    led_type: LedType,
    executor: Arc<TransactionExecutor>,
    scaler: BrightnessScaler,
    confirmed: Mutex<Confirmed>,
}

impl Led {
    pub fn new(
        led_type: LedType,
        executor: Arc<TransactionExecutor>,
        scaler: BrightnessScaler,
    ) -> Self {
        Self {
            led_type,
            executor,
            scaler,
            confirmed: Mutex::new(Confirmed::default()),
        }
    }

    pub fn led_type(&self) -> LedType {
        self.led_type
    }

    /// Current state, fetching any value not yet confirmed
    pub fn get(&self) -> Result<LedState, DeviceError> {
        Ok(LedState {
            led_type: self.led_type,
            enabled: self.enabled()?,
            color: self.color()?,
            brightness: self.brightness()?,
            mode: self.mode()?,
        })
    }

    /// Drop cached values so the next read goes to the device
    pub fn invalidate(&self) {
        *self.confirmed.lock() = Confirmed::default();
    }

    pub fn enabled(&self) -> Result<bool, DeviceError> {
        let mut confirmed = self.confirmed.lock();
        if let Some(enabled) = confirmed.enabled {
            return Ok(enabled);
        }
        let value = self.query_byte(Command::GetLedState)? != 0;
        confirmed.enabled = Some(value);
        Ok(value)
    }

    pub fn color(&self) -> Result<Rgb, DeviceError> {
        let mut confirmed = self.confirmed.lock();
        if let Some(color) = confirmed.color {
            return Ok(color);
        }
        let resp = self.query(Command::GetLedColor)?;
        let color = match resp.get(2..5) {
            Some(&[r, g, b]) => Rgb::new(r, g, b),
            _ => {
                return Err(DeviceError::UnexpectedResponse(format!(
                    "{} color response too short: {:02X?}",
                    self.led_type, resp
                )))
            }
        };
        confirmed.color = Some(color);
        Ok(color)
    }

    /// Logical brightness (0-100)
    pub fn brightness(&self) -> Result<f64, DeviceError> {
        let mut confirmed = self.confirmed.lock();
        if let Some(level) = confirmed.brightness {
            return Ok(level);
        }
        let raw = self.query_byte(Command::GetLedBrightness)?;
        let level = self.scaler.unscale(raw);
        confirmed.brightness = Some(level);
        Ok(level)
    }

    pub fn mode(&self) -> Result<LedMode, DeviceError> {
        let mut confirmed = self.confirmed.lock();
        if let Some(mode) = confirmed.mode {
            return Ok(mode);
        }
        let raw = self.query_byte(Command::GetLedMode)?;
        let mode = LedMode::from_u8(raw).ok_or_else(|| {
            DeviceError::UnexpectedResponse(format!("{} reported mode 0x{raw:02X}", self.led_type))
        })?;
        confirmed.mode = Some(mode);
        Ok(mode)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), DeviceError> {
        let mut confirmed = self.confirmed.lock();
        self.send(Command::SetLedState, &[u8::from(enabled)])?;
        confirmed.enabled = Some(enabled);
        Ok(())
    }

    pub fn set_color(&self, color: Rgb) -> Result<(), DeviceError> {
        let mut confirmed = self.confirmed.lock();
        self.send(Command::SetLedColor, &color.to_bytes())?;
        confirmed.color = Some(color);
        Ok(())
    }

    /// Set logical brightness (0-100); the cached value is the quantized one
    pub fn set_brightness(&self, level: f64) -> Result<(), DeviceError> {
        let raw = self.scaler.scale(level);
        let mut confirmed = self.confirmed.lock();
        self.send(Command::SetLedBrightness, &[raw])?;
        confirmed.brightness = Some(self.scaler.unscale(raw));
        Ok(())
    }

    pub fn set_mode(&self, mode: LedMode) -> Result<(), DeviceError> {
        let mut confirmed = self.confirmed.lock();
        self.send(Command::SetLedMode, &[mode as u8])?;
        confirmed.mode = Some(mode);
        Ok(())
    }

    /// `[VARSTORE, zone, value...]`
    fn args(&self, value: &[u8]) -> Vec<u8> {
        let mut args = vec![VARSTORE, self.led_type.wire()];
        args.extend_from_slice(value);
        args
    }

    fn send(&self, command: Command, value: &[u8]) -> Result<(), DeviceError> {
        debug!("{} {}: {:02X?}", self.led_type, command, value);
        self.executor.execute(command, &self.args(value))?;
        Ok(())
    }

    fn query(&self, command: Command) -> Result<Vec<u8>, DeviceError> {
        Ok(self.executor.execute(command, &self.args(&[]))?)
    }

    /// Third payload byte: `[VARSTORE, zone, value]`
    fn query_byte(&self, command: Command) -> Result<u8, DeviceError> {
        let resp = self.query(command)?;
        resp.get(2).copied().ok_or_else(|| {
            DeviceError::UnexpectedResponse(format!(
                "{} {} response too short: {:02X?}",
                self.led_type, command, resp
            ))
        })
    }
}
