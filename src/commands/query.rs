//! Query (read-only) command handlers.

use super::{CommandResult, Context};
use chroma_device::{DeviceKind, EffectKind, MatrixDims};
use serde::Serialize;
use tracing::warn;

/// Device summary printed by `info`
#[derive(Serialize)]
struct InfoReport {
    name: String,
    kind: DeviceKind,
    vid: u16,
    pid: u16,
    firmware: Option<String>,
    serial: Option<String>,
    brightness: Option<f64>,
    matrix: Option<MatrixDims>,
    effects: Vec<EffectKind>,
}

/// List attached supported devices
pub fn list(ctx: &Context) -> CommandResult {
    let devices = chroma_driver::find_devices(&ctx.api, &ctx.registry);
    if devices.is_empty() {
        println!("No supported Razer devices found");
        return Ok(());
    }

    for d in devices {
        println!(
            "  {:04x}:{:04x}  {:<28} {}",
            d.info.vid,
            d.info.pid,
            d.model.name,
            d.info.serial.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Get device info (model, firmware version, serial)
pub fn info(ctx: &Context, json: bool) -> CommandResult {
    let device = ctx.open()?;
    let model = device.model();

    // Query failures are reported but don't hide the static model info
    let firmware = device
        .firmware_version()
        .map_err(|e| warn!("Failed to read firmware version: {e}"))
        .ok();
    let serial = device
        .serial_number()
        .map_err(|e| warn!("Failed to read serial number: {e}"))
        .ok();
    let brightness = device
        .brightness()
        .map_err(|e| warn!("Failed to read brightness: {e}"))
        .ok();

    let report = InfoReport {
        name: model.name.clone(),
        kind: model.kind,
        vid: model.vid,
        pid: model.pid,
        firmware: firmware.map(|v| v.to_string()),
        serial,
        brightness,
        matrix: model.matrix,
        effects: model.effects.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Device:     {} ({})", report.name, report.kind);
    println!("USB ID:     {:04x}:{:04x}", report.vid, report.pid);
    println!(
        "Firmware:   {}",
        report.firmware.as_deref().unwrap_or("unknown")
    );
    println!("Serial:     {}", report.serial.as_deref().unwrap_or("unknown"));
    match report.brightness {
        Some(level) => println!("Brightness: {level:.1}%"),
        None => println!("Brightness: unknown"),
    }
    match report.matrix {
        Some(dims) => println!("Matrix:     {} rows x {} columns", dims.height, dims.width),
        None => println!("Matrix:     none"),
    }
    let effects: Vec<_> = report.effects.iter().map(|k| k.name()).collect();
    println!(
        "Effects:    {}",
        if effects.is_empty() {
            "none".to_string()
        } else {
            effects.join(", ")
        }
    );
    Ok(())
}
