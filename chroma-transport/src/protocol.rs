//! Protocol constants for Razer Chroma HID reports

use std::ops::Range;

/// Size of a request/response report (excluding the HID report ID)
pub const REPORT_SIZE: usize = 90;

/// Feature report buffer as seen by hidapi (report ID 0 + report)
pub const FEATURE_REPORT_SIZE: usize = REPORT_SIZE + 1;

/// Argument bytes carried by a single report
pub const PAYLOAD_SIZE: usize = 80;

/// Bytes covered by the XOR checksum
pub const CHECKSUM_RANGE: Range<usize> = 2..88;

/// Offset of the checksum byte within a report
pub const CHECKSUM_OFFSET: usize = 88;

/// Protocol type byte used by all standard commands
pub const DEFAULT_PROTOCOL_TYPE: u8 = 0x00;

/// Transaction ID meaning "no correlation required"
///
/// The executor never allocates it; `Report::decode` skips the
/// correlation check when asked to expect it.
pub const NO_CORRELATION: u8 = 0x00;

/// Variable storage selector: persist values across power cycles
pub const VARSTORE: u8 = 0x01;

/// Marker leading every matrix row frame payload
pub const FRAME_ROW_MARKER: u8 = 0xFF;

/// Report status byte values
pub mod status {
    /// Request not yet processed (also used in outgoing requests)
    pub const NEW: u8 = 0x00;
    /// Device is busy, retry later
    pub const BUSY: u8 = 0x01;
    /// Command completed
    pub const OK: u8 = 0x02;
    /// Command failed
    pub const FAILURE: u8 = 0x03;
    /// Device timed out processing the command
    pub const TIMEOUT: u8 = 0x04;
    /// Command class/id not implemented by this device
    pub const NOT_SUPPORTED: u8 = 0x05;
}

/// Transaction timing defaults
pub mod timing {
    /// Time allowed for a response to become readable (ms)
    pub const DEFAULT_TIMEOUT_MS: u64 = 500;
    /// Retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Fixed wait before re-polling a busy device (ms)
    pub const BUSY_BACKOFF_MS: u64 = 10;
    /// Base of the exponential backoff after a failed attempt (ms)
    pub const FAILURE_BACKOFF_MS: u64 = 20;
    /// Cap on any single backoff (ms)
    pub const MAX_BACKOFF_MS: u64 = 500;
    /// Delay between writing a request and reading its response (ms)
    pub const RESPONSE_SETTLE_MS: u64 = 7;
}

/// Device identification constants
pub mod device {
    /// Razer USB vendor ID
    pub const VENDOR_ID: u16 = 0x1532;

    /// Check whether a vendor ID belongs to Razer
    #[inline]
    pub fn is_razer(vid: u16) -> bool {
        vid == VENDOR_ID
    }
}
