//! High-level lighting interface for Razer Chroma devices
//!
//! This crate provides LED zones, per-key matrix frames, effects and
//! suspend/resume on top of the `chroma-transport` transaction layer.
//!
//! ```text
//! [ChromaDevice]
//!    |-- Led (per zone, lazily created)
//!    |-- Frame (lazily created, matrix devices only)
//!    `-- BrightnessScaler
//!            |
//!   [TransactionExecutor] -> [Transport]
//! ```

pub mod brightness;
pub mod device;
pub mod error;
pub mod frame;
pub mod fx;
pub mod led;
pub mod model;

pub use brightness::BrightnessScaler;
pub use device::{ChromaDevice, DeviceMode, FirmwareVersion};
pub use error::DeviceError;
pub use frame::{Frame, FrameState};
pub use fx::{BreatheColors, Direction, Effect, EffectKind, EffectSet};
pub use led::{Led, LedMode, LedState, LedType, Rgb};
pub use model::{DeviceKind, DeviceModel, MatrixDims, ModelRegistry};

// Re-export the transport types callers need to open a device
pub use chroma_transport::{
    DeviceSelector, HidWiredTransport, TransactionPolicy, Transport, TransportDeviceInfo,
    TransportError,
};
