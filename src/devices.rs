// Device discovery for Razer Chroma devices
// Matches attached HID devices against the model registry

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chroma_device::{ChromaDevice, DeviceModel, ModelRegistry};
use chroma_transport::protocol::device;
use chroma_transport::{DeviceSelector, HidWiredTransport, TransactionPolicy, TransportDeviceInfo};
use hidapi::HidApi;
use tracing::debug;

/// Attached device with a known model
#[derive(Debug, Clone)]
pub struct FoundDevice {
    pub info: TransportDeviceInfo,
    pub model: Arc<DeviceModel>,
}

/// List attached Razer devices that have a registered model
///
/// Each physical device exposes several HID interfaces; only the lowest
/// one (the control interface) is reported.
pub fn find_devices(api: &HidApi, registry: &ModelRegistry) -> Vec<FoundDevice> {
    let mut found: Vec<FoundDevice> = api
        .device_list()
        .filter(|d| device::is_razer(d.vendor_id()))
        .filter_map(|d| {
            let model = registry.find_by_vid_pid(d.vendor_id(), d.product_id());
            if model.is_none() {
                debug!(
                    "Skipping unknown Razer device {:04x}:{:04x}",
                    d.vendor_id(),
                    d.product_id()
                );
            }
            Some(FoundDevice {
                info: TransportDeviceInfo {
                    vid: d.vendor_id(),
                    pid: d.product_id(),
                    interface_number: d.interface_number(),
                    device_path: d.path().to_string_lossy().into_owned(),
                    serial: d.serial_number().map(str::to_owned),
                    product_name: d.product_string().map(str::to_owned),
                },
                model: model?,
            })
        })
        .collect();

    found.sort_by(|a, b| {
        (a.info.pid, &a.info.serial, a.info.interface_number).cmp(&(
            b.info.pid,
            &b.info.serial,
            b.info.interface_number,
        ))
    });
    found.dedup_by(|b, a| a.info.pid == b.info.pid && a.info.serial == b.info.serial);
    found
}

/// Open the device with product id `pid`, or the first known one
pub fn open_device(
    api: &HidApi,
    registry: &ModelRegistry,
    pid: Option<u16>,
    policy: TransactionPolicy,
) -> Result<ChromaDevice> {
    let devices = find_devices(api, registry);
    let Some(found) = devices
        .into_iter()
        .find(|d| pid.map_or(true, |pid| d.info.pid == pid))
    else {
        match pid {
            Some(pid) => bail!("No supported Razer device with PID {pid:04x} found"),
            None => bail!("No supported Razer device found"),
        }
    };

    let selector = DeviceSelector::VidPid {
        vid: found.info.vid,
        pid: found.info.pid,
        serial: found.info.serial.clone(),
    };
    let transport = HidWiredTransport::open(api, &selector)
        .with_context(|| format!("Failed to open {}", found.model.name))?;

    Ok(ChromaDevice::new(Arc::new(transport), found.model, policy)?)
}
