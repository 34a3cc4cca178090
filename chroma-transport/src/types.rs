//! Common types for transport layer

use serde::{Deserialize, Serialize};

/// Device identification information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface carrying the control endpoint
    pub interface_number: i32,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

/// How to find the device a transport should open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Platform HID path
    Path(String),
    /// First interface matching vendor/product (and serial, if given)
    VidPid {
        vid: u16,
        pid: u16,
        serial: Option<String>,
    },
}

impl DeviceSelector {
    pub fn vid_pid(vid: u16, pid: u16) -> Self {
        Self::VidPid {
            vid,
            pid,
            serial: None,
        }
    }
}
