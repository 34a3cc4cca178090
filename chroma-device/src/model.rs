// Device models
// Static description of each supported product, looked up by VID/PID

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chroma_transport::protocol::device::VENDOR_ID;
use serde::{Deserialize, Serialize};

use crate::brightness::DEFAULT_DEVICE_MAX;
use crate::fx::{EffectKind, EffectSet};
use crate::led::LedType;

/// Product family; decides how brightness is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Keyboard,
    Laptop,
    Mouse,
    Mousepad,
    Headset,
    Keypad,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keyboard => "keyboard",
            Self::Laptop => "laptop",
            Self::Mouse => "mouse",
            Self::Mousepad => "mousepad",
            Self::Headset => "headset",
            Self::Keypad => "keypad",
        };
        f.write_str(name)
    }
}

/// Addressable matrix size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDims {
    pub height: usize,
    pub width: usize,
}

impl MatrixDims {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

fn default_vid() -> u16 {
    VENDOR_ID
}

fn default_brightness_max() -> u8 {
    DEFAULT_DEVICE_MAX
}

fn default_leds() -> Vec<LedType> {
    vec![LedType::Backlight]
}

/// Read-only description of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    #[serde(default = "default_vid")]
    pub vid: u16,
    pub pid: u16,
    pub name: String,
    pub kind: DeviceKind,
    /// Absent for devices without per-key lighting
    #[serde(default)]
    pub matrix: Option<MatrixDims>,
    #[serde(default = "default_brightness_max")]
    pub brightness_max: u8,
    #[serde(default)]
    pub effects: EffectSet,
    #[serde(default = "default_leds")]
    pub leds: Vec<LedType>,
}

impl DeviceModel {
    /// Model with backlight only and no effects
    pub fn new(pid: u16, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            vid: VENDOR_ID,
            pid,
            name: name.into(),
            kind,
            matrix: None,
            brightness_max: DEFAULT_DEVICE_MAX,
            effects: EffectSet::empty(),
            leds: default_leds(),
        }
    }

    pub fn with_matrix(mut self, height: usize, width: usize) -> Self {
        self.matrix = Some(MatrixDims::new(height, width));
        self
    }

    pub fn with_effects(mut self, effects: EffectSet) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_leds(mut self, leds: &[LedType]) -> Self {
        self.leds = leds.to_vec();
        self
    }

    pub fn with_brightness_max(mut self, max: u8) -> Self {
        self.brightness_max = max;
        self
    }

    pub fn supports(&self, kind: EffectKind) -> bool {
        self.effects.contains(kind)
    }

    pub fn has_led(&self, led: LedType) -> bool {
        self.leds.contains(&led)
    }
}

/// Known Razer products
pub fn builtin_models() -> Vec<DeviceModel> {
    let keyboard = EffectSet::keyboard();
    vec![
        DeviceModel::new(0x0203, "Razer BlackWidow Chroma", DeviceKind::Keyboard)
            .with_matrix(6, 22)
            .with_effects(keyboard)
            .with_leds(&[LedType::Backlight, LedType::Logo, LedType::Game, LedType::Macro]),
        DeviceModel::new(0x0221, "Razer BlackWidow Chroma V2", DeviceKind::Keyboard)
            .with_matrix(6, 22)
            .with_effects(keyboard.with(EffectKind::Starlight))
            .with_leds(&[LedType::Backlight, LedType::Logo, LedType::Game, LedType::Macro]),
        DeviceModel::new(0x021E, "Razer Ornata Chroma", DeviceKind::Keyboard)
            .with_matrix(6, 22)
            .with_effects(keyboard.with(EffectKind::Starlight))
            .with_leds(&[LedType::Backlight, LedType::Game, LedType::Macro]),
        DeviceModel::new(0x0205, "Razer Blade Stealth", DeviceKind::Laptop)
            .with_matrix(6, 16)
            .with_effects(keyboard)
            .with_leds(&[LedType::Backlight, LedType::Logo]),
        DeviceModel::new(0x020F, "Razer Blade (2016)", DeviceKind::Laptop)
            .with_matrix(6, 16)
            .with_effects(keyboard)
            .with_leds(&[LedType::Backlight, LedType::Logo]),
        DeviceModel::new(0x0043, "Razer DeathAdder Chroma", DeviceKind::Mouse)
            .with_leds(&[LedType::Backlight, LedType::Logo, LedType::ScrollWheel]),
        DeviceModel::new(0x0C00, "Razer Firefly", DeviceKind::Mousepad)
            .with_matrix(1, 15)
            .with_effects(keyboard),
    ]
}

/// Registry for device models
/// Provides lookup by VID/PID
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    by_vid_pid: HashMap<(u16, u16), Arc<DeviceModel>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the builtin models pre-loaded
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for model in builtin_models() {
            registry.register(model);
        }
        registry
    }

    /// Add a model, replacing any existing entry for the same VID/PID
    pub fn register(&mut self, model: DeviceModel) {
        self.by_vid_pid
            .insert((model.vid, model.pid), Arc::new(model));
    }

    pub fn find_by_vid_pid(&self, vid: u16, pid: u16) -> Option<Arc<DeviceModel>> {
        self.by_vid_pid.get(&(vid, pid)).cloned()
    }

    pub fn has_vid_pid(&self, vid: u16, pid: u16) -> bool {
        self.by_vid_pid.contains_key(&(vid, pid))
    }

    /// All models sorted by PID
    pub fn models(&self) -> Vec<Arc<DeviceModel>> {
        let mut models: Vec<_> = self.by_vid_pid.values().cloned().collect();
        models.sort_by_key(|m| (m.vid, m.pid));
        models
    }

    pub fn len(&self) -> usize {
        self.by_vid_pid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vid_pid.is_empty()
    }
}
