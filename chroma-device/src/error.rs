//! Device interface error types

use chroma_transport::TransportError;
use thiserror::Error;

/// Errors from device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Matrix coordinate outside the device's matrix
    #[error("Position ({row}, {col}) outside {height}x{width} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Effect kind outside the device's capability set
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    /// Feature not present on this device
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Device returned unexpected response
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl DeviceError {
    /// True for both capability rejections and device-reported NOT_SUPPORTED
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCommand(_) | Self::Transport(TransportError::UnsupportedCommand(_))
        )
    }
}
