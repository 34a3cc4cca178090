//! Brightness quantization
//!
//! All higher layers speak a logical percentage in `[0.0, 100.0]`. Devices
//! store brightness as a byte in `[0, device_max]`; this is the only place
//! the two are converted.

/// Upper bound of the logical brightness range
pub const LOGICAL_MAX: f64 = 100.0;

/// Most common native brightness resolution
pub const DEFAULT_DEVICE_MAX: u8 = 255;

/// Converts between logical brightness and a device's native byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessScaler {
    device_max: u8,
}

impl Default for BrightnessScaler {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_MAX)
    }
}

impl BrightnessScaler {
    /// Scaler for a device whose brightness byte tops out at `device_max`
    ///
    /// A max of 0 is treated as 1 so the mapping stays invertible.
    pub const fn new(device_max: u8) -> Self {
        Self {
            device_max: if device_max == 0 { 1 } else { device_max },
        }
    }

    pub fn device_max(&self) -> u8 {
        self.device_max
    }

    /// Logical width of one device step
    pub fn step(&self) -> f64 {
        LOGICAL_MAX / f64::from(self.device_max)
    }

    /// Logical level to device byte
    ///
    /// Clamps to `[0, 100]` (NaN counts as 0), maps linearly and rounds to
    /// the nearest integer with ties rounding up.
    pub fn scale(&self, level: f64) -> u8 {
        let level = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, LOGICAL_MAX)
        };
        let raw = (level / LOGICAL_MAX * f64::from(self.device_max) + 0.5).floor();
        raw.min(f64::from(self.device_max)) as u8
    }

    /// Device byte to logical level, to one decimal place
    pub fn unscale(&self, raw: u8) -> f64 {
        let raw = raw.min(self.device_max);
        let level = f64::from(raw) / f64::from(self.device_max) * LOGICAL_MAX;
        (level * 10.0).round() / 10.0
    }
}

/// Scale with an explicit device max; see [`BrightnessScaler::scale`]
pub fn scale(level: f64, device_max: u8) -> u8 {
    BrightnessScaler::new(device_max).scale(level)
}

/// Unscale with an explicit device max; see [`BrightnessScaler::unscale`]
pub fn unscale(raw: u8, device_max: u8) -> f64 {
    BrightnessScaler::new(device_max).unscale(raw)
}
