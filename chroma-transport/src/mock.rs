//! In-memory transport for tests
//!
//! `MockTransport` records every report written and read, and answers each
//! request from a scripted queue of [`MockReply`] values, falling back to a
//! responder closure once the queue is empty. The default responder
//! acknowledges every request with `OK`, echoing its arguments.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::command::Command;
use crate::error::TransportError;
use crate::protocol::{device, NO_CORRELATION};
use crate::report::{Report, ReportStatus};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// How the simulated device answers one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// `OK` with the given payload
    Ok(Vec<u8>),
    /// The given status, echoing the request arguments
    Status(ReportStatus),
    /// `OK`, but correlated to a different transaction id
    Stale,
    /// `OK` with one payload bit flipped after the checksum was computed
    Corrupt,
    /// No response before the read times out
    Timeout,
    /// The read fails with a HID I/O error
    Io,
}

/// One recorded wire event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Write {
        transaction_id: u8,
        command: Option<Command>,
        args: Vec<u8>,
    },
    /// A read; carries the transaction id of the report returned, if any
    Read { transaction_id: Option<u8> },
}

type Responder = Box<dyn FnMut(&Report) -> MockReply + Send>;

struct MockState {
    events: Vec<WireEvent>,
    requests: Vec<Report>,
    script: VecDeque<MockReply>,
    responder: Responder,
    pending: VecDeque<Result<Vec<u8>, TransportError>>,
    connected: bool,
}

/// Simulated device transport
pub struct MockTransport {
    info: TransportDeviceInfo,
    latency: Duration,
    state: Mutex<MockState>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Transport that acknowledges everything with `OK`
    pub fn new() -> Self {
        Self::with_responder(|_| MockReply::Status(ReportStatus::Ok))
    }

    /// Transport answering requests with `responder` once the script is empty
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: FnMut(&Report) -> MockReply + Send + 'static,
    {
        Self {
            info: TransportDeviceInfo {
                vid: device::VENDOR_ID,
                device_path: "mock".into(),
                product_name: Some("Mock Chroma Device".into()),
                ..TransportDeviceInfo::default()
            },
            latency: Duration::ZERO,
            state: Mutex::new(MockState {
                events: Vec::new(),
                requests: Vec::new(),
                script: VecDeque::new(),
                responder: Box::new(responder),
                pending: VecDeque::new(),
                connected: true,
            }),
        }
    }

    /// Report the given product id in `device_info()`
    pub fn with_pid(mut self, pid: u16) -> Self {
        self.info.pid = pid;
        self
    }

    /// Sleep this long (without holding any lock) inside every write and read
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a reply for the next unanswered request
    pub fn push_reply(&self, reply: MockReply) {
        self.state.lock().script.push_back(reply);
    }

    /// Replace the fallback responder
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&Report) -> MockReply + Send + 'static,
    {
        self.state.lock().responder = Box::new(responder);
    }

    /// All wire events so far, in order
    pub fn events(&self) -> Vec<WireEvent> {
        self.state.lock().events.clone()
    }

    /// Every request report written so far
    pub fn requests(&self) -> Vec<Report> {
        self.state.lock().requests.clone()
    }

    /// Requests for one command, in order
    pub fn requests_for(&self, command: Command) -> Vec<Report> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.command() == Some(command))
            .copied()
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Forget recorded events and requests
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.events.clear();
        state.requests.clear();
    }

    fn pause(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}

fn answer(request: &Report, reply: MockReply) -> Result<Vec<u8>, TransportError> {
    match reply {
        MockReply::Ok(payload) => Ok(request.reply(ReportStatus::Ok, &payload).to_bytes()),
        MockReply::Status(status) => Ok(request.reply(status, request.payload()).to_bytes()),
        MockReply::Stale => {
            let mut raw = request.reply(ReportStatus::Ok, request.payload()).to_bytes();
            // Transaction id sits outside the checksummed range
            raw[1] = request.transaction_id().wrapping_add(0x80);
            Ok(raw)
        }
        MockReply::Corrupt => {
            let mut raw = request.reply(ReportStatus::Ok, request.payload()).to_bytes();
            raw[8] ^= 0x01;
            Ok(raw)
        }
        MockReply::Timeout => Err(TransportError::Timeout),
        MockReply::Io => Err(TransportError::HidError("mock I/O failure".into())),
    }
}

impl Transport for MockTransport {
    fn send_report(&self, report: &[u8]) -> Result<(), TransportError> {
        let request = Report::decode(report, NO_CORRELATION)?;
        {
            let mut state = self.state.lock();
            if !state.connected {
                return Err(TransportError::Disconnected);
            }
            state.events.push(WireEvent::Write {
                transaction_id: request.transaction_id(),
                command: request.command(),
                args: request.payload().to_vec(),
            });
            state.requests.push(request);

            let reply = match state.script.pop_front() {
                Some(reply) => reply,
                None => (state.responder)(&request),
            };
            let response = answer(&request, reply);
            state.pending.push_back(response);
        }
        self.pause();
        Ok(())
    }

    fn read_report(&self, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        self.pause();
        let mut state = self.state.lock();
        let response = state
            .pending
            .pop_front()
            .unwrap_or(Err(TransportError::Timeout));
        let transaction_id = response.as_ref().ok().and_then(|raw| raw.get(1).copied());
        state.events.push(WireEvent::Read { transaction_id });
        response
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn close(&self) -> Result<(), TransportError> {
        self.state.lock().connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_acknowledges_with_echo() {
        let mock = MockTransport::new();
        let request = Report::encode(Command::SetLedState, 5, &[0x01, 0x05, 0x01]).unwrap();
        mock.send_report(&request.to_bytes()).unwrap();

        let raw = mock.read_report(Duration::from_millis(1)).unwrap();
        let response = Report::decode(&raw, 5).unwrap();
        assert_eq!(response.status(), ReportStatus::Ok);
        assert_eq!(response.payload(), &[0x01, 0x05, 0x01]);
        assert_eq!(
            mock.events(),
            vec![
                WireEvent::Write {
                    transaction_id: 5,
                    command: Some(Command::SetLedState),
                    args: vec![0x01, 0x05, 0x01],
                },
                WireEvent::Read {
                    transaction_id: Some(5)
                },
            ]
        );
    }

    #[test]
    fn test_read_without_request_times_out() {
        let mock = MockTransport::new();
        assert!(matches!(
            mock.read_report(Duration::from_millis(1)),
            Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_script_takes_precedence() {
        let mock = MockTransport::new();
        mock.push_reply(MockReply::Status(ReportStatus::Busy));
        let request = Report::encode(Command::GetDeviceMode, 1, &[]).unwrap();

        mock.send_report(&request.to_bytes()).unwrap();
        let raw = mock.read_report(Duration::ZERO).unwrap();
        assert_eq!(Report::decode(&raw, 1).unwrap().status(), ReportStatus::Busy);

        mock.send_report(&request.to_bytes()).unwrap();
        let raw = mock.read_report(Duration::ZERO).unwrap();
        assert_eq!(Report::decode(&raw, 1).unwrap().status(), ReportStatus::Ok);
    }

    #[test]
    fn test_closed_transport_rejects_writes() {
        let mock = MockTransport::new();
        mock.close().unwrap();
        assert!(!mock.is_connected());
        let request = Report::encode(Command::GetDeviceMode, 1, &[]).unwrap();
        assert!(matches!(
            mock.send_report(&request.to_bytes()),
            Err(TransportError::Disconnected)
        ));
    }
}
