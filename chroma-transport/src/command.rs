//! Command registry
//!
//! Every protocol command is a variant of [`Command`]. Its wire identity
//! (class byte, id byte, expected data length) lives in one table here, so
//! adding a command never touches the codec or the executor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire identity of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandSpec {
    /// Command class byte
    pub class: u8,
    /// Command id byte
    pub id: u8,
    /// Expected data length; 0 for variable-length commands
    pub expected_len: u8,
    /// Named variant this entry belongs to
    pub mnemonic: Command,
}

/// Closed set of protocol commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    // Device information
    GetFirmwareVersion,
    GetSerial,
    SetDeviceMode,
    GetDeviceMode,

    // Per-LED control
    SetLedState,
    GetLedState,
    SetLedColor,
    GetLedColor,
    SetLedMode,
    GetLedMode,
    SetLedBrightness,
    GetLedBrightness,

    // Matrix
    SetEffect,
    SetFrameRow,

    // Laptop backlight
    SetBladeBrightness,
    GetBladeBrightness,
}

impl Command {
    /// All registered commands
    pub const ALL: [Command; 16] = [
        Command::GetFirmwareVersion,
        Command::GetSerial,
        Command::SetDeviceMode,
        Command::GetDeviceMode,
        Command::SetLedState,
        Command::GetLedState,
        Command::SetLedColor,
        Command::GetLedColor,
        Command::SetLedMode,
        Command::GetLedMode,
        Command::SetLedBrightness,
        Command::GetLedBrightness,
        Command::SetEffect,
        Command::SetFrameRow,
        Command::SetBladeBrightness,
        Command::GetBladeBrightness,
    ];

    /// Wire identity of this command
    pub const fn spec(self) -> CommandSpec {
        let (class, id, expected_len) = match self {
            Command::GetFirmwareVersion => (0x00, 0x81, 0x02),
            Command::GetSerial => (0x00, 0x82, 0x16),
            Command::SetDeviceMode => (0x00, 0x04, 0x02),
            Command::GetDeviceMode => (0x00, 0x84, 0x02),
            Command::SetLedState => (0x03, 0x00, 0x03),
            Command::GetLedState => (0x03, 0x80, 0x03),
            Command::SetLedColor => (0x03, 0x01, 0x05),
            Command::GetLedColor => (0x03, 0x81, 0x05),
            Command::SetLedMode => (0x03, 0x02, 0x03),
            Command::GetLedMode => (0x03, 0x82, 0x03),
            Command::SetLedBrightness => (0x03, 0x03, 0x03),
            Command::GetLedBrightness => (0x03, 0x83, 0x03),
            Command::SetEffect => (0x03, 0x0A, 0x00),
            Command::SetFrameRow => (0x03, 0x0B, 0x00),
            Command::SetBladeBrightness => (0x0E, 0x04, 0x02),
            Command::GetBladeBrightness => (0x0E, 0x84, 0x02),
        };
        CommandSpec {
            class,
            id,
            expected_len,
            mnemonic: self,
        }
    }

    /// Human-readable mnemonic
    pub const fn name(self) -> &'static str {
        match self {
            Command::GetFirmwareVersion => "GET_FIRMWARE_VERSION",
            Command::GetSerial => "GET_SERIAL",
            Command::SetDeviceMode => "SET_DEVICE_MODE",
            Command::GetDeviceMode => "GET_DEVICE_MODE",
            Command::SetLedState => "SET_LED_STATE",
            Command::GetLedState => "GET_LED_STATE",
            Command::SetLedColor => "SET_LED_COLOR",
            Command::GetLedColor => "GET_LED_COLOR",
            Command::SetLedMode => "SET_LED_MODE",
            Command::GetLedMode => "GET_LED_MODE",
            Command::SetLedBrightness => "SET_LED_BRIGHTNESS",
            Command::GetLedBrightness => "GET_LED_BRIGHTNESS",
            Command::SetEffect => "SET_EFFECT",
            Command::SetFrameRow => "SET_FRAME_ROW",
            Command::SetBladeBrightness => "SET_BLADE_BRIGHTNESS",
            Command::GetBladeBrightness => "GET_BLADE_BRIGHTNESS",
        }
    }

    /// Command class byte
    #[inline]
    pub const fn class(self) -> u8 {
        self.spec().class
    }

    /// Command id byte
    #[inline]
    pub const fn id(self) -> u8 {
        self.spec().id
    }

    /// Expected data length (0 = variable)
    #[inline]
    pub const fn expected_len(self) -> u8 {
        self.spec().expected_len
    }

    /// Find the command registered for a class/id pair
    pub fn from_wire(class: u8, id: u8) -> Option<Command> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.class() == class && c.id() == id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up the wire identity of a command
///
/// Total: the command set is closed and compiled in.
#[inline]
pub const fn lookup(mnemonic: Command) -> CommandSpec {
    mnemonic.spec()
}
