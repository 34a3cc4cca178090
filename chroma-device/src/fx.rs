//! Matrix effects and per-model effect capabilities
//!
//! Every effect goes out through the single matrix effect command; the first
//! argument byte selects the effect. Which effects a device accepts is a
//! property of its model, held as an [`EffectSet`] and checked before
//! anything is sent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::led::Rgb;

/// Effect identifiers, one per matrix effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EffectKind {
    Disable = 0,
    Static = 1,
    Wave = 2,
    Spectrum = 3,
    Reactive = 4,
    Breathe = 5,
    Starlight = 6,
    CustomFrame = 7,
}

impl EffectKind {
    pub const ALL: [EffectKind; 8] = [
        EffectKind::Disable,
        EffectKind::Static,
        EffectKind::Wave,
        EffectKind::Spectrum,
        EffectKind::Reactive,
        EffectKind::Breathe,
        EffectKind::Starlight,
        EffectKind::CustomFrame,
    ];

    /// First argument byte of the matrix effect command
    pub fn wire(self) -> u8 {
        match self {
            Self::Disable => 0x00,
            Self::Wave => 0x01,
            Self::Reactive => 0x02,
            Self::Breathe => 0x03,
            Self::Spectrum => 0x04,
            Self::CustomFrame => 0x05,
            Self::Static => 0x06,
            Self::Starlight => 0x19,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Static => "static",
            Self::Wave => "wave",
            Self::Spectrum => "spectrum",
            Self::Reactive => "reactive",
            Self::Breathe => "breathe",
            Self::Starlight => "starlight",
            Self::CustomFrame => "custom_frame",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| format!("unknown effect \"{s}\""))
    }
}

/// Set of effect kinds a device accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<EffectKind>", into = "Vec<EffectKind>")]
pub struct EffectSet(u16);

impl EffectSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every effect kind
    pub fn all() -> Self {
        EffectKind::ALL.into_iter().collect()
    }

    /// The common keyboard set: everything but starlight
    pub fn keyboard() -> Self {
        Self::all().without(EffectKind::Starlight)
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: EffectKind) {
        self.0 |= kind.bit();
    }

    pub fn with(mut self, kind: EffectKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn without(mut self, kind: EffectKind) -> Self {
        self.0 &= !kind.bit();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Kinds in declaration order
    pub fn iter(&self) -> impl Iterator<Item = EffectKind> + '_ {
        EffectKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl FromIterator<EffectKind> for EffectSet {
    fn from_iter<I: IntoIterator<Item = EffectKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl From<Vec<EffectKind>> for EffectSet {
    fn from(kinds: Vec<EffectKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<EffectSet> for Vec<EffectKind> {
    fn from(set: EffectSet) -> Self {
        set.iter().collect()
    }
}

/// Wave travel direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Right,
    Left,
}

impl Direction {
    fn wire(self) -> u8 {
        match self {
            Self::Right => 0x01,
            Self::Left => 0x02,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(Self::Right),
            "left" | "l" => Ok(Self::Left),
            _ => Err(format!("invalid direction \"{s}\". Use left or right")),
        }
    }
}

/// Breathing color source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreatheColors {
    Random,
    Single(Rgb),
    Dual(Rgb, Rgb),
}

/// Valid range of the reactive and starlight speed byte
pub const SPEED_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

/// A fully parameterized matrix effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Disable,
    Static(Rgb),
    Wave(Direction),
    Spectrum,
    Reactive { color: Rgb, speed: u8 },
    Breathe(BreatheColors),
    Starlight { color: Rgb, speed: u8 },
    /// Show whatever the frame buffer last committed
    CustomFrame,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Disable => EffectKind::Disable,
            Self::Static(_) => EffectKind::Static,
            Self::Wave(_) => EffectKind::Wave,
            Self::Spectrum => EffectKind::Spectrum,
            Self::Reactive { .. } => EffectKind::Reactive,
            Self::Breathe(_) => EffectKind::Breathe,
            Self::Starlight { .. } => EffectKind::Starlight,
            Self::CustomFrame => EffectKind::CustomFrame,
        }
    }

    /// Speed byte if the effect has one and it is out of range
    pub fn invalid_speed(&self) -> Option<u8> {
        match self {
            Self::Reactive { speed, .. } | Self::Starlight { speed, .. }
                if !SPEED_RANGE.contains(speed) =>
            {
                Some(*speed)
            }
            _ => None,
        }
    }

    /// Arguments of the matrix effect command
    pub fn args(&self) -> Vec<u8> {
        let mut args = vec![self.kind().wire()];
        match *self {
            Self::Disable | Self::Spectrum => {}
            Self::Static(color) => args.extend(color.to_bytes()),
            Self::Wave(direction) => args.push(direction.wire()),
            Self::Reactive { color, speed } => {
                args.push(speed);
                args.extend(color.to_bytes());
            }
            Self::Breathe(BreatheColors::Random) => args.push(0x03),
            Self::Breathe(BreatheColors::Single(color)) => {
                args.push(0x01);
                args.extend(color.to_bytes());
            }
            Self::Breathe(BreatheColors::Dual(first, second)) => {
                args.push(0x02);
                args.extend(first.to_bytes());
                args.extend(second.to_bytes());
            }
            Self::Starlight { color, speed } => {
                args.push(0x01);
                args.push(speed);
                args.extend(color.to_bytes());
            }
            Self::CustomFrame => args.push(0x01),
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_args() {
        let red = Rgb::RED;
        assert_eq!(Effect::Disable.args(), vec![0x00]);
        assert_eq!(Effect::Static(red).args(), vec![0x06, 0xFF, 0x00, 0x00]);
        assert_eq!(Effect::Wave(Direction::Left).args(), vec![0x01, 0x02]);
        assert_eq!(Effect::Spectrum.args(), vec![0x04]);
        assert_eq!(
            Effect::Reactive { color: red, speed: 2 }.args(),
            vec![0x02, 0x02, 0xFF, 0x00, 0x00]
        );
        assert_eq!(Effect::CustomFrame.args(), vec![0x05, 0x01]);
        assert_eq!(
            Effect::Starlight { color: Rgb::BLUE, speed: 1 }.args(),
            vec![0x19, 0x01, 0x01, 0x00, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_breathe_args() {
        assert_eq!(Effect::Breathe(BreatheColors::Random).args(), vec![0x03, 0x03]);
        assert_eq!(
            Effect::Breathe(BreatheColors::Single(Rgb::GREEN)).args(),
            vec![0x03, 0x01, 0x00, 0xFF, 0x00]
        );
        assert_eq!(
            Effect::Breathe(BreatheColors::Dual(Rgb::RED, Rgb::BLUE)).args(),
            vec![0x03, 0x02, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_speed_validation() {
        let ok = Effect::Reactive { color: Rgb::RED, speed: 4 };
        let bad = Effect::Starlight { color: Rgb::RED, speed: 0 };
        assert_eq!(ok.invalid_speed(), None);
        assert_eq!(bad.invalid_speed(), Some(0));
        assert_eq!(Effect::Spectrum.invalid_speed(), None);
    }

    #[test]
    fn test_effect_set() {
        let set: EffectSet = [EffectKind::Static, EffectKind::Spectrum].into_iter().collect();
        assert!(set.contains(EffectKind::Static));
        assert!(!set.contains(EffectKind::Wave));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![EffectKind::Static, EffectKind::Spectrum]
        );

        assert_eq!(EffectSet::all().len(), EffectKind::ALL.len());
        assert!(!EffectSet::keyboard().contains(EffectKind::Starlight));
        assert!(EffectSet::empty().is_empty());
    }

    #[test]
    fn test_effect_set_serde() {
        #[derive(Deserialize)]
        struct Caps {
            effects: EffectSet,
        }
        let caps: Caps = toml::from_str(r#"effects = ["static", "custom_frame"]"#).unwrap();
        assert!(caps.effects.contains(EffectKind::CustomFrame));
        assert!(!caps.effects.contains(EffectKind::Wave));
    }

    #[test]
    fn test_kind_names() {
        for kind in EffectKind::ALL {
            assert_eq!(kind.name().parse::<EffectKind>().unwrap(), kind);
        }
        assert_eq!("custom-frame".parse::<EffectKind>().unwrap(), EffectKind::CustomFrame);
    }
}
