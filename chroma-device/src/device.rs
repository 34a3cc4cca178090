//! Device handle
//!
//! `ChromaDevice` is the caller-facing object for one physical device. It
//! owns the device's transaction executor and lazily creates the LED
//! accessors and the frame buffer on first use. No internal lock is held
//! once a call returns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chroma_transport::protocol::VARSTORE;
use chroma_transport::{Command, Transport, TransactionExecutor, TransactionPolicy};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::brightness::BrightnessScaler;
use crate::error::DeviceError;
use crate::frame::Frame;
use crate::fx::{BreatheColors, Direction, Effect, EffectKind};
use crate::led::{Led, LedType, Rgb};
use crate::model::{DeviceKind, DeviceModel};

/// LEDs carrying a mouse's brightness, the first present one is read back
const MOUSE_BRIGHTNESS_LEDS: [LedType; 3] =
    [LedType::Backlight, LedType::Logo, LedType::ScrollWheel];

/// Firmware version as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Device operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum DeviceMode {
    Normal = 0x00,
    Factory = 0x02,
    Driver = 0x03,
}

impl DeviceMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Normal),
            0x02 => Some(Self::Factory),
            0x03 => Some(Self::Driver),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SuspendState {
    suspended: bool,
    /// Logical brightness to restore on resume
    saved: f64,
}

/// Handle for one Razer Chroma device
pub struct ChromaDevice {
    model: Arc<DeviceModel>,
    executor: Arc<TransactionExecutor>,
    scaler: BrightnessScaler,
    leds: Mutex<HashMap<LedType, Arc<Led>>>,
    frame: Mutex<Option<Frame>>,
    suspend: Mutex<SuspendState>,
}

impl ChromaDevice {
    /// Create a handle over an open transport
    ///
    /// Fails if the model declares a matrix that cannot be driven.
    pub fn new(
        transport: Arc<dyn Transport>,
        model: Arc<DeviceModel>,
        policy: TransactionPolicy,
    ) -> Result<Self, DeviceError> {
        if let Some(dims) = model.matrix {
            Frame::validate_dims(dims)?;
        }

        let executor = Arc::new(TransactionExecutor::new(transport, policy));
        info!(
            "{} ({:04x}:{:04x}) ready",
            model.name, model.vid, model.pid
        );

        Ok(Self {
            scaler: BrightnessScaler::new(model.brightness_max),
            model,
            executor,
            leds: Mutex::new(HashMap::new()),
            frame: Mutex::new(None),
            suspend: Mutex::new(SuspendState::default()),
        })
    }

    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn kind(&self) -> DeviceKind {
        self.model.kind
    }

    pub fn executor(&self) -> &Arc<TransactionExecutor> {
        &self.executor
    }

    pub fn supports(&self, kind: EffectKind) -> bool {
        self.model.supports(kind)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend.lock().suspended
    }

    // === Device Info ===

    pub fn firmware_version(&self) -> Result<FirmwareVersion, DeviceError> {
        let resp = self.executor.execute(Command::GetFirmwareVersion, &[])?;
        match resp.as_slice() {
            [major, minor, ..] => Ok(FirmwareVersion {
                major: *major,
                minor: *minor,
            }),
            _ => Err(DeviceError::UnexpectedResponse(
                "Invalid firmware version response".into(),
            )),
        }
    }

    /// Serial number with trailing NULs removed
    pub fn serial_number(&self) -> Result<String, DeviceError> {
        let resp = self.executor.execute(Command::GetSerial, &[])?;
        let end = resp.iter().position(|b| *b == 0).unwrap_or(resp.len());
        Ok(String::from_utf8_lossy(&resp[..end]).trim().to_string())
    }

    pub fn device_mode(&self) -> Result<DeviceMode, DeviceError> {
        let resp = self.executor.execute(Command::GetDeviceMode, &[])?;
        let raw = resp.first().copied().ok_or_else(|| {
            DeviceError::UnexpectedResponse("Empty device mode response".into())
        })?;
        DeviceMode::from_u8(raw)
            .ok_or_else(|| DeviceError::UnexpectedResponse(format!("Unknown device mode 0x{raw:02X}")))
    }

    pub fn set_device_mode(&self, mode: DeviceMode) -> Result<(), DeviceError> {
        self.executor
            .execute(Command::SetDeviceMode, &[mode as u8, 0x00])?;
        Ok(())
    }

    // === LEDs ===

    /// Accessor for one LED zone, created on first use
    pub fn led(&self, led_type: LedType) -> Result<Arc<Led>, DeviceError> {
        if !self.model.has_led(led_type) {
            return Err(DeviceError::NotSupported(format!(
                "{} has no {} LED",
                self.model.name, led_type
            )));
        }
        let mut leds = self.leds.lock();
        let led = leds
            .entry(led_type)
            .or_insert_with(|| Arc::new(Led::new(led_type, self.executor.clone(), self.scaler)));
        Ok(led.clone())
    }

    /// LEDs that carry the device brightness on non-laptop models
    fn brightness_leds(&self) -> Vec<LedType> {
        let candidates: &[LedType] = match self.model.kind {
            DeviceKind::Mouse => &MOUSE_BRIGHTNESS_LEDS,
            _ => &[LedType::Backlight],
        };
        candidates
            .iter()
            .copied()
            .filter(|led| self.model.has_led(*led))
            .collect()
    }

    fn no_brightness_led(&self) -> DeviceError {
        DeviceError::NotSupported(format!(
            "{} has no LED carrying brightness",
            self.model.name
        ))
    }

    // === Brightness ===

    /// Logical brightness (0-100); the saved level while suspended
    pub fn brightness(&self) -> Result<f64, DeviceError> {
        let suspend = self.suspend.lock();
        if suspend.suspended {
            return Ok(suspend.saved);
        }
        self.read_brightness()
    }

    /// Set logical brightness (0-100)
    ///
    /// While suspended the level is kept for `resume` and nothing is sent.
    pub fn set_brightness(&self, level: f64) -> Result<(), DeviceError> {
        let mut suspend = self.suspend.lock();
        if suspend.suspended {
            suspend.saved = self.scaler.unscale(self.scaler.scale(level));
            debug!("Suspended, brightness {} saved for resume", suspend.saved);
            return Ok(());
        }
        self.write_brightness(level)
    }

    fn read_brightness(&self) -> Result<f64, DeviceError> {
        match self.model.kind {
            DeviceKind::Laptop => {
                let resp = self
                    .executor
                    .execute(Command::GetBladeBrightness, &[VARSTORE])?;
                let raw = resp.get(1).copied().ok_or_else(|| {
                    DeviceError::UnexpectedResponse("Invalid brightness response".into())
                })?;
                Ok(self.scaler.unscale(raw))
            }
            _ => {
                let led_type = *self
                    .brightness_leds()
                    .first()
                    .ok_or_else(|| self.no_brightness_led())?;
                self.led(led_type)?.brightness()
            }
        }
    }

    fn write_brightness(&self, level: f64) -> Result<(), DeviceError> {
        match self.model.kind {
            DeviceKind::Laptop => {
                let raw = self.scaler.scale(level);
                self.executor
                    .execute(Command::SetBladeBrightness, &[VARSTORE, raw])?;
                Ok(())
            }
            _ => {
                let leds = self.brightness_leds();
                if leds.is_empty() {
                    return Err(self.no_brightness_led());
                }
                for led_type in leds {
                    self.led(led_type)?.set_brightness(level)?;
                }
                Ok(())
            }
        }
    }

    // === Suspend / Resume ===

    /// Save the current brightness and turn the lighting off
    ///
    /// Does nothing if already suspended.
    pub fn suspend(&self) -> Result<(), DeviceError> {
        let mut suspend = self.suspend.lock();
        if suspend.suspended {
            return Ok(());
        }

        let level = self.read_brightness()?;
        self.write_brightness(0.0)?;
        suspend.saved = level;
        suspend.suspended = true;
        info!("{} suspended (brightness {} saved)", self.model.name, level);
        Ok(())
    }

    /// Restore the saved brightness
    ///
    /// Does nothing if not suspended. On failure the device stays suspended
    /// so the call can be repeated.
    pub fn resume(&self) -> Result<(), DeviceError> {
        let mut suspend = self.suspend.lock();
        if !suspend.suspended {
            return Ok(());
        }

        if let Err(e) = self.write_brightness(suspend.saved) {
            warn!("{} resume failed: {}", self.model.name, e);
            return Err(e);
        }
        suspend.suspended = false;
        info!("{} resumed (brightness {})", self.model.name, suspend.saved);
        Ok(())
    }

    // === Matrix ===

    pub fn has_matrix(&self) -> bool {
        self.model.matrix.is_some()
    }

    /// Run `f` on the key matrix frame buffer, created on first use
    ///
    /// The frame stays locked while `f` runs, so `f` must not call back into
    /// this device. Fails with `NotSupported` on devices without a matrix.
    pub fn with_frame<R>(
        &self,
        f: impl FnOnce(&mut Frame) -> Result<R, DeviceError>,
    ) -> Result<R, DeviceError> {
        let dims = self.model.matrix.ok_or_else(|| self.no_matrix())?;
        let mut slot = self.frame.lock();
        if slot.is_none() {
            *slot = Some(Frame::new(self.executor.clone(), dims)?);
        }
        match slot.as_mut() {
            Some(frame) => f(frame),
            None => Err(self.no_matrix()),
        }
    }

    /// Commit the frame and switch the device to showing it
    pub fn show_frame(&self) -> Result<usize, DeviceError> {
        let sent = self.with_frame(|frame| frame.commit())?;
        self.custom_frame()?;
        Ok(sent)
    }

    /// Clear the matrix to black and stop any running effect
    pub fn reset(&self) -> Result<(), DeviceError> {
        if self.has_matrix() {
            self.with_frame(|frame| {
                frame.set_base_color(None).reset();
                frame.commit()
            })?;
        }
        if self.supports(EffectKind::Disable) {
            self.disable()?;
        }
        info!("{} reset", self.model.name);
        Ok(())
    }

    // === Effects ===

    /// Start a matrix effect
    ///
    /// Fails with `UnsupportedCommand` if the model does not list the effect.
    pub fn set_effect(&self, effect: Effect) -> Result<(), DeviceError> {
        let kind = effect.kind();
        if !self.supports(kind) {
            return Err(DeviceError::UnsupportedCommand(format!(
                "{} does not support the {} effect",
                self.model.name, kind
            )));
        }
        if let Some(speed) = effect.invalid_speed() {
            return Err(DeviceError::InvalidParameter(format!(
                "Effect speed must be 1-4, got {speed}"
            )));
        }

        debug!("{}: effect {:?}", self.model.name, effect);
        self.executor.execute(Command::SetEffect, &effect.args())?;
        Ok(())
    }

    pub fn disable(&self) -> Result<(), DeviceError> {
        self.set_effect(Effect::Disable)
    }

    pub fn static_color(&self, color: Rgb) -> Result<(), DeviceError> {
        self.set_effect(Effect::Static(color))
    }

    pub fn wave(&self, direction: Direction) -> Result<(), DeviceError> {
        self.set_effect(Effect::Wave(direction))
    }

    pub fn spectrum(&self) -> Result<(), DeviceError> {
        self.set_effect(Effect::Spectrum)
    }

    pub fn reactive(&self, color: Rgb, speed: u8) -> Result<(), DeviceError> {
        self.set_effect(Effect::Reactive { color, speed })
    }

    pub fn breathe(&self, colors: BreatheColors) -> Result<(), DeviceError> {
        self.set_effect(Effect::Breathe(colors))
    }

    pub fn starlight(&self, color: Rgb, speed: u8) -> Result<(), DeviceError> {
        self.set_effect(Effect::Starlight { color, speed })
    }

    pub fn custom_frame(&self) -> Result<(), DeviceError> {
        self.set_effect(Effect::CustomFrame)
    }

    fn no_matrix(&self) -> DeviceError {
        DeviceError::NotSupported(format!("{} has no key matrix", self.model.name))
    }
}

impl fmt::Debug for ChromaDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromaDevice")
            .field("model", &self.model.name)
            .field("kind", &self.model.kind)
            .finish()
    }
}
