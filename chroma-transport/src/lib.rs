//! Transport and transaction layer for Razer Chroma devices
//!
//! This crate turns typed commands into fixed-size HID reports and drives
//! request/response transactions over a raw report transport:
//!
//! ```text
//! [HidWiredTransport / MockTransport]  ← implements Transport (raw report I/O)
//!                |
//!       [TransactionExecutor]          ← ids, retries, status handling
//!                |
//!           [ChromaDevice]
//! ```

pub mod command;
pub mod error;
pub mod flow_control;
pub mod protocol;
pub mod report;
pub mod types;

mod hid_wired;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use command::{lookup, Command, CommandSpec};
pub use error::TransportError;
pub use flow_control::{TransactionExecutor, TransactionPolicy};
pub use hid_wired::HidWiredTransport;
pub use report::{Report, ReportStatus};
pub use types::{DeviceSelector, TransportDeviceInfo};

use std::sync::Arc;
use std::time::Duration;

/// Raw report I/O - all backends implement this
///
/// Implementations move whole reports and know nothing about transaction
/// ids, retries or status codes; [`TransactionExecutor`] adds those.
pub trait Transport: Send + Sync {
    /// Write one request report (exactly `protocol::REPORT_SIZE` bytes)
    fn send_report(&self, report: &[u8]) -> Result<(), TransportError>;

    /// Read one response report, waiting at most `timeout`
    ///
    /// Fails with [`TransportError::Timeout`] when nothing arrives in time.
    fn read_report(&self, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Check if transport is still connected
    fn is_connected(&self) -> bool;

    /// Close the transport gracefully
    fn close(&self) -> Result<(), TransportError>;
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn Transport>;
