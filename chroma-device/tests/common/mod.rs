//! Simulated Razer device for integration tests
//!
//! Keeps per-LED registers and blade brightness, answers GET commands from
//! them and applies SET commands, so device-level behavior can be checked
//! against both the wire log and the simulated device state.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chroma_device::{ChromaDevice, DeviceKind, DeviceModel, EffectSet, LedType, TransactionPolicy};
use chroma_transport::mock::{MockReply, MockTransport};
use chroma_transport::{Command, Report, ReportStatus};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedRegs {
    pub enabled: u8,
    pub color: [u8; 3],
    pub mode: u8,
    pub brightness: u8,
}

#[derive(Debug, Default)]
pub struct SimState {
    /// Keyed by LED wire id
    pub leds: HashMap<u8, LedRegs>,
    pub blade_brightness: u8,
    /// Frame rows answered with FAILURE
    pub fail_rows: HashSet<u8>,
    /// Commands answered with NOT_SUPPORTED
    pub unsupported: HashSet<Command>,
    /// Commands answered with FAILURE
    pub failing: HashSet<Command>,
    /// Rows the device accepted, in order
    pub rows_applied: Vec<u8>,
}

pub struct Sim {
    pub mock: Arc<MockTransport>,
    pub state: Arc<Mutex<SimState>>,
}

impl Sim {
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(SimState::default()));
        let shared = state.clone();
        let mock = MockTransport::with_responder(move |req| respond(&mut shared.lock(), req));
        Self {
            mock: Arc::new(mock),
            state,
        }
    }

    pub fn set_led(&self, led: LedType, regs: LedRegs) {
        self.state.lock().leds.insert(led.wire(), regs);
    }

    pub fn led(&self, led: LedType) -> LedRegs {
        self.state.lock().leds.get(&led.wire()).copied().unwrap_or_default()
    }

    pub fn device(&self, model: DeviceModel) -> ChromaDevice {
        ChromaDevice::new(self.mock.clone(), Arc::new(model), fast_policy()).unwrap()
    }

    /// Brightness values sent with `command`, per request
    pub fn sent_args(&self, command: Command) -> Vec<Vec<u8>> {
        self.mock
            .requests_for(command)
            .iter()
            .map(|r| r.payload().to_vec())
            .collect()
    }
}

pub fn fast_policy() -> TransactionPolicy {
    TransactionPolicy {
        timeout_ms: 1,
        max_retries: 1,
        busy_backoff_ms: 0,
        failure_backoff_ms: 0,
        max_backoff_ms: 0,
    }
}

pub fn keyboard(height: usize, width: usize) -> DeviceModel {
    DeviceModel::new(0x0203, "Test Keyboard", DeviceKind::Keyboard)
        .with_matrix(height, width)
        .with_effects(EffectSet::keyboard())
        .with_leds(&[LedType::Backlight, LedType::Logo])
}

fn respond(state: &mut SimState, req: &Report) -> MockReply {
    let Some(command) = req.command() else {
        return MockReply::Status(ReportStatus::NotSupported);
    };
    if state.unsupported.contains(&command) {
        return MockReply::Status(ReportStatus::NotSupported);
    }
    if state.failing.contains(&command) {
        return MockReply::Status(ReportStatus::Failure);
    }

    let args = req.payload();
    let led = args.get(1).copied().unwrap_or(0);
    match command {
        Command::GetFirmwareVersion => MockReply::Ok(vec![1, 7]),
        Command::GetSerial => {
            let mut serial = b"PM1234H56789012".to_vec();
            serial.resize(22, 0);
            MockReply::Ok(serial)
        }
        Command::GetDeviceMode => MockReply::Ok(vec![0x00, 0x00]),
        Command::GetLedState => {
            MockReply::Ok(vec![args[0], led, state.leds.entry(led).or_default().enabled])
        }
        Command::GetLedColor => {
            let regs = state.leds.entry(led).or_default();
            let [r, g, b] = regs.color;
            MockReply::Ok(vec![args[0], led, r, g, b])
        }
        Command::GetLedMode => {
            MockReply::Ok(vec![args[0], led, state.leds.entry(led).or_default().mode])
        }
        Command::GetLedBrightness => MockReply::Ok(vec![
            args[0],
            led,
            state.leds.entry(led).or_default().brightness,
        ]),
        Command::SetLedState => {
            state.leds.entry(led).or_default().enabled = args[2];
            MockReply::Status(ReportStatus::Ok)
        }
        Command::SetLedColor => {
            state.leds.entry(led).or_default().color = [args[2], args[3], args[4]];
            MockReply::Status(ReportStatus::Ok)
        }
        Command::SetLedMode => {
            state.leds.entry(led).or_default().mode = args[2];
            MockReply::Status(ReportStatus::Ok)
        }
        Command::SetLedBrightness => {
            state.leds.entry(led).or_default().brightness = args[2];
            MockReply::Status(ReportStatus::Ok)
        }
        Command::GetBladeBrightness => MockReply::Ok(vec![args[0], state.blade_brightness]),
        Command::SetBladeBrightness => {
            state.blade_brightness = args[1];
            MockReply::Status(ReportStatus::Ok)
        }
        Command::SetFrameRow => {
            let row = args[1];
            if state.fail_rows.contains(&row) {
                return MockReply::Status(ReportStatus::Failure);
            }
            state.rows_applied.push(row);
            MockReply::Status(ReportStatus::Ok)
        }
        _ => MockReply::Status(ReportStatus::Ok),
    }
}
