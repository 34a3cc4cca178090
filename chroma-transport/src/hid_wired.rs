//! HID transport for devices attached over USB
//!
//! Requests and responses travel as HID feature reports on the device's
//! control interface, prefixed by report ID 0.

use std::ffi::CString;
use std::thread;
use std::time::{Duration, Instant};

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::protocol::{timing, FEATURE_REPORT_SIZE, REPORT_SIZE};
use crate::types::{DeviceSelector, TransportDeviceInfo};
use crate::Transport;

/// HID transport for wired USB connection
pub struct HidWiredTransport {
    /// Control interface
    device: Mutex<HidDevice>,
    /// Device information
    info: TransportDeviceInfo,
    /// Wait between a write and the matching read
    settle: Duration,
}

impl HidWiredTransport {
    /// Open the device described by `selector`
    pub fn open(api: &HidApi, selector: &DeviceSelector) -> Result<Self, TransportError> {
        let device_info = match selector {
            DeviceSelector::Path(path) => api
                .device_list()
                .find(|d| d.path().to_string_lossy() == path.as_str()),
            DeviceSelector::VidPid { vid, pid, serial } => api
                .device_list()
                .filter(|d| d.vendor_id() == *vid && d.product_id() == *pid)
                .filter(|d| match serial {
                    Some(s) => d.serial_number() == Some(s.as_str()),
                    None => true,
                })
                // Control endpoint lives on the lowest interface
                .min_by_key(|d| d.interface_number()),
        }
        .ok_or_else(|| TransportError::DeviceNotFound(format!("{selector:?}")))?;

        let info = TransportDeviceInfo {
            vid: device_info.vendor_id(),
            pid: device_info.product_id(),
            interface_number: device_info.interface_number(),
            device_path: device_info.path().to_string_lossy().into_owned(),
            serial: device_info.serial_number().map(str::to_owned),
            product_name: device_info.product_string().map(str::to_owned),
        };

        let path = CString::new(info.device_path.clone())
            .map_err(|e| TransportError::HidError(e.to_string()))?;
        let device = api.open_path(&path)?;

        info!(
            "Opened {:04x}:{:04x} ({}) on interface {}",
            info.vid,
            info.pid,
            info.product_name.as_deref().unwrap_or("unknown"),
            info.interface_number
        );

        Ok(Self::new(device, info))
    }

    /// Wrap an already opened HID device
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            info,
            settle: Duration::from_millis(timing::RESPONSE_SETTLE_MS),
        }
    }

    /// Set the wait between write and read (default 7ms)
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle = delay;
    }
}

impl Transport for HidWiredTransport {
    fn send_report(&self, report: &[u8]) -> Result<(), TransportError> {
        if report.len() != REPORT_SIZE {
            return Err(TransportError::MalformedReport {
                expected: REPORT_SIZE,
                actual: report.len(),
            });
        }

        let mut buf = [0u8; FEATURE_REPORT_SIZE];
        buf[1..].copy_from_slice(report);
        debug!("Sending report: {:02X?}", &buf[..10]);

        self.device.lock().send_feature_report(&buf)?;
        Ok(())
    }

    fn read_report(&self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let start = Instant::now();
        thread::sleep(self.settle.min(timeout));

        let mut buf = [0u8; FEATURE_REPORT_SIZE];
        let len = self.device.lock().get_feature_report(&mut buf)?;

        if start.elapsed() > timeout {
            debug!("Response arrived after {:?}", start.elapsed());
            return Err(TransportError::Timeout);
        }
        if len == 0 {
            return Err(TransportError::Timeout);
        }

        debug!("Got response: {:02X?}", &buf[..len.min(10)]);
        // Strip the report ID
        Ok(buf[1..len].to_vec())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn is_connected(&self) -> bool {
        self.device.lock().get_product_string().is_ok()
    }

    fn close(&self) -> Result<(), TransportError> {
        // HidDevice drops automatically
        Ok(())
    }
}
