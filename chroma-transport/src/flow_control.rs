//! Transaction executor
//!
//! `TransactionExecutor` wraps a raw `Transport` (which only moves single
//! reports) and adds transaction semantics: id allocation, response
//! correlation, status handling and retries.
//!
//! One executor exists per physical device. Its lock is held for a whole
//! transaction including retries, so two callers never interleave their
//! requests on the wire.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::TransportError;
use crate::protocol::{timing, NO_CORRELATION};
use crate::report::{Report, ReportStatus};
use crate::types::TransportDeviceInfo;
use crate::Transport;

// ============================================================================
// Policy
// ============================================================================

/// Timeout and retry policy for transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionPolicy {
    /// Time allowed for each response (ms)
    pub timeout_ms: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed wait before retrying a BUSY device (ms)
    pub busy_backoff_ms: u64,
    /// Base of the exponential backoff after a failure (ms)
    pub failure_backoff_ms: u64,
    /// Upper bound for a single backoff (ms)
    pub max_backoff_ms: u64,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: timing::DEFAULT_TIMEOUT_MS,
            max_retries: timing::DEFAULT_MAX_RETRIES,
            busy_backoff_ms: timing::BUSY_BACKOFF_MS,
            failure_backoff_ms: timing::FAILURE_BACKOFF_MS,
            max_backoff_ms: timing::MAX_BACKOFF_MS,
        }
    }
}

impl TransactionPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn busy_backoff(&self) -> Duration {
        Duration::from_millis(self.busy_backoff_ms.min(self.max_backoff_ms))
    }

    /// Backoff after the `attempt`-th failure (0-based): base * 2^attempt, capped
    pub fn failure_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
        let ms = self
            .failure_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Upper bound on the wall-clock time of one transaction
    pub fn budget(&self) -> Duration {
        let attempts = u64::from(self.max_retries) + 1;
        let backoff: u64 = (0..self.max_retries)
            .map(|a| {
                self.failure_backoff(a)
                    .max(self.busy_backoff())
                    .as_millis() as u64
            })
            .sum();
        Duration::from_millis(self.timeout_ms.saturating_mul(attempts) + backoff)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Serialized request/response driver for one device
pub struct TransactionExecutor {
    inner: Arc<dyn Transport>,
    policy: TransactionPolicy,
    /// Last allocated transaction id; the lock is the device's
    /// serialization scope
    last_transaction_id: Mutex<u8>,
}

impl TransactionExecutor {
    pub fn new(inner: Arc<dyn Transport>, policy: TransactionPolicy) -> Self {
        Self {
            inner,
            policy,
            last_transaction_id: Mutex::new(NO_CORRELATION),
        }
    }

    /// Access the wrapped raw transport.
    pub fn inner(&self) -> &Arc<dyn Transport> {
        &self.inner
    }

    pub fn policy(&self) -> &TransactionPolicy {
        &self.policy
    }

    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }

    /// Most recently allocated transaction id (0 before the first request)
    pub fn last_transaction_id(&self) -> u8 {
        *self.last_transaction_id.lock()
    }

    /// Run one transaction with the executor's policy, returning the payload
    pub fn execute(&self, command: Command, args: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.execute_with(command, args, &self.policy)
    }

    /// Run one transaction with an explicit policy
    ///
    /// - `OK` returns the response payload.
    /// - `BUSY` is retried after a fixed backoff; exhaustion gives `DeviceBusy`.
    /// - `NOT_SUPPORTED` fails at once with `UnsupportedCommand`.
    /// - `FAILURE`, `TIMEOUT` and transport I/O errors are retried with
    ///   exponential backoff; exhaustion gives `TransactionFailed` carrying
    ///   the last cause.
    /// - Codec errors are returned immediately.
    pub fn execute_with(
        &self,
        command: Command,
        args: &[u8],
        policy: &TransactionPolicy,
    ) -> Result<Vec<u8>, TransportError> {
        let mut last_id = self.last_transaction_id.lock();
        let attempts = policy.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            let transaction_id = next_transaction_id(*last_id);
            *last_id = transaction_id;

            let request = Report::encode(command, transaction_id, args)?;
            let is_last = attempt + 1 >= attempts;

            let cause = match self.exchange(&request, policy.timeout()) {
                Ok(response) => match response.status() {
                    ReportStatus::Ok => {
                        debug!(
                            "{} [{:02X}] ok: {:02X?}",
                            command,
                            transaction_id,
                            response.payload()
                        );
                        return Ok(response.payload().to_vec());
                    }
                    ReportStatus::Busy => {
                        if is_last {
                            warn!("{} still busy after {} attempts", command, attempts);
                            return Err(TransportError::DeviceBusy {
                                command: command.name(),
                                attempts,
                            });
                        }
                        debug!("{} [{:02X}] busy, retrying", command, transaction_id);
                        thread::sleep(policy.busy_backoff());
                        attempt += 1;
                        continue;
                    }
                    ReportStatus::NotSupported => {
                        debug!("{} not supported by device", command);
                        return Err(TransportError::UnsupportedCommand(command.name()));
                    }
                    status => TransportError::DeviceStatus(status),
                },
                Err(e) if e.is_codec_error() => {
                    warn!("{} [{:02X}] rejected: {}", command, transaction_id, e);
                    return Err(e);
                }
                Err(e) => e,
            };

            if is_last {
                warn!("{} failed after {} attempts: {}", command, attempts, cause);
                return Err(TransportError::TransactionFailed {
                    command: command.name(),
                    attempts,
                    source: Box::new(cause),
                });
            }

            let delay = policy.failure_backoff(attempt);
            debug!(
                "{} [{:02X}] attempt {} failed: {}; retrying in {:?}",
                command,
                transaction_id,
                attempt + 1,
                cause,
                delay
            );
            thread::sleep(delay);
            attempt += 1;
        }
    }

    /// Write a request and read its correlated response
    fn exchange(&self, request: &Report, timeout: Duration) -> Result<Report, TransportError> {
        self.inner.send_report(&request.to_bytes())?;
        let raw = self.inner.read_report(timeout)?;
        Report::decode(&raw, request.transaction_id())
    }
}

/// Next id after `last`, wrapping at 256 and skipping the reserved 0
#[inline]
fn next_transaction_id(last: u8) -> u8 {
    match last.wrapping_add(1) {
        NO_CORRELATION => 1,
        id => id,
    }
}
