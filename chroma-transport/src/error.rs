//! Transport error types

use thiserror::Error;

use crate::report::ReportStatus;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    // Transport (I/O) errors
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    // Report codec errors
    #[error("Argument too large: {len} bytes exceeds payload capacity of {max}")]
    ArgumentTooLarge { len: usize, max: usize },

    #[error("Malformed report: expected {expected} bytes, got {actual}")]
    MalformedReport { expected: usize, actual: usize },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Transaction mismatch: expected id 0x{expected:02X}, got 0x{actual:02X}")]
    TransactionMismatch { expected: u8, actual: u8 },

    // Transaction outcomes
    #[error("Device busy: {command} gave up after {attempts} attempts")]
    DeviceBusy { command: &'static str, attempts: u32 },

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(&'static str),

    #[error("Device reported {0}")]
    DeviceStatus(ReportStatus),

    #[error("Transaction failed: {command} after {attempts} attempts: {source}")]
    TransactionFailed {
        command: &'static str,
        attempts: u32,
        #[source]
        source: Box<TransportError>,
    },
}

impl TransportError {
    /// Framing errors raised by the report codec; never retried
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentTooLarge { .. }
                | Self::MalformedReport { .. }
                | Self::ChecksumMismatch { .. }
                | Self::TransactionMismatch { .. }
        )
    }

    /// The innermost cause of an aggregated failure
    pub fn root_cause(&self) -> &TransportError {
        match self {
            Self::TransactionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_errors_classified() {
        assert!(TransportError::ChecksumMismatch {
            expected: 1,
            actual: 2
        }
        .is_codec_error());
        assert!(TransportError::TransactionMismatch {
            expected: 1,
            actual: 2
        }
        .is_codec_error());
        assert!(!TransportError::Timeout.is_codec_error());
        assert!(!TransportError::DeviceStatus(ReportStatus::Failure).is_codec_error());
    }

    #[test]
    fn test_root_cause_unwraps_aggregate() {
        let err = TransportError::TransactionFailed {
            command: "GET_LED_COLOR",
            attempts: 4,
            source: Box::new(TransportError::Timeout),
        };
        assert!(matches!(err.root_cause(), TransportError::Timeout));
        assert!(err.to_string().contains("after 4 attempts"));
    }
}
