//! Report codec
//!
//! A report is a fixed 90-byte frame:
//!
//! ```text
//! [0]     status            [5]  data_size
//! [1]     transaction_id    [6]  command_class
//! [2..4]  remaining_packets [7]  command_id
//! [4]     protocol_type     [8..88] args (zero padded)
//! [88]    checksum = XOR of bytes [2..88)
//! [89]    reserved
//! ```

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::command::Command;
use crate::error::TransportError;
use crate::protocol::{
    status, CHECKSUM_RANGE, DEFAULT_PROTOCOL_TYPE, NO_CORRELATION, PAYLOAD_SIZE, REPORT_SIZE,
};

/// Status byte of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    /// Outgoing request / not yet processed
    New,
    Busy,
    Ok,
    Failure,
    Timeout,
    NotSupported,
    /// Status byte outside the documented set
    Unknown(u8),
}

impl ReportStatus {
    pub fn from_u8(v: u8) -> Self {
        match v {
            status::NEW => Self::New,
            status::BUSY => Self::Busy,
            status::OK => Self::Ok,
            status::FAILURE => Self::Failure,
            status::TIMEOUT => Self::Timeout,
            status::NOT_SUPPORTED => Self::NotSupported,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::New => status::NEW,
            Self::Busy => status::BUSY,
            Self::Ok => status::OK,
            Self::Failure => status::FAILURE,
            Self::Timeout => status::TIMEOUT,
            Self::NotSupported => status::NOT_SUPPORTED,
            Self::Unknown(v) => v,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("NEW"),
            Self::Busy => f.write_str("BUSY"),
            Self::Ok => f.write_str("OK"),
            Self::Failure => f.write_str("FAILURE"),
            Self::Timeout => f.write_str("TIMEOUT"),
            Self::NotSupported => f.write_str("NOT_SUPPORTED"),
            Self::Unknown(v) => write!(f, "UNKNOWN(0x{v:02X})"),
        }
    }
}

/// A request or response report
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Report {
    status: u8,
    transaction_id: u8,
    remaining_packets: [u8; 2],
    protocol_type: u8,
    data_size: u8,
    command_class: u8,
    command_id: u8,
    args: [u8; PAYLOAD_SIZE],
    checksum: u8,
    reserved: u8,
}

impl Report {
    const EMPTY: Report = Report {
        status: status::NEW,
        transaction_id: NO_CORRELATION,
        remaining_packets: [0; 2],
        protocol_type: DEFAULT_PROTOCOL_TYPE,
        data_size: 0,
        command_class: 0,
        command_id: 0,
        args: [0; PAYLOAD_SIZE],
        checksum: 0,
        reserved: 0,
    };

    /// Encode a request report
    ///
    /// Unused payload bytes are zero, so identical inputs always produce
    /// identical bytes.
    pub fn encode(
        command: Command,
        transaction_id: u8,
        args: &[u8],
    ) -> Result<Report, TransportError> {
        if args.len() > PAYLOAD_SIZE {
            return Err(TransportError::ArgumentTooLarge {
                len: args.len(),
                max: PAYLOAD_SIZE,
            });
        }

        let spec = command.spec();
        let mut report = Self::EMPTY;
        report.transaction_id = transaction_id;
        // Bounded by PAYLOAD_SIZE (80) above
        report.data_size = (spec.expected_len as usize).max(args.len()) as u8;
        report.command_class = spec.class;
        report.command_id = spec.id;
        report.args[..args.len()].copy_from_slice(args);
        report.checksum = report.compute_checksum();
        Ok(report)
    }

    /// Decode and validate a response report
    ///
    /// `expected_transaction_id` is the id of the request this response
    /// answers; [`NO_CORRELATION`] skips the check. The status is returned
    /// as-is for the caller to interpret.
    pub fn decode(raw: &[u8], expected_transaction_id: u8) -> Result<Report, TransportError> {
        let report = Report::read_from_bytes(raw).map_err(|_| TransportError::MalformedReport {
            expected: REPORT_SIZE,
            actual: raw.len(),
        })?;

        let computed = report.compute_checksum();
        if computed != report.checksum {
            return Err(TransportError::ChecksumMismatch {
                expected: computed,
                actual: report.checksum,
            });
        }

        if expected_transaction_id != NO_CORRELATION
            && report.transaction_id != expected_transaction_id
        {
            return Err(TransportError::TransactionMismatch {
                expected: expected_transaction_id,
                actual: report.transaction_id,
            });
        }

        Ok(report)
    }

    /// Build the device's answer to this request
    ///
    /// Echoes transaction id and command, carries `payload` and `status`.
    /// Used by device simulators.
    pub fn reply(&self, status: ReportStatus, payload: &[u8]) -> Report {
        let len = payload.len().min(PAYLOAD_SIZE);
        let mut report = *self;
        report.status = status.to_u8();
        report.args = [0; PAYLOAD_SIZE];
        report.args[..len].copy_from_slice(&payload[..len]);
        report.data_size = (self.data_size as usize).max(len) as u8;
        report.checksum = report.compute_checksum();
        report
    }

    /// XOR checksum over the header tail and payload
    pub fn compute_checksum(&self) -> u8 {
        self.as_bytes()[CHECKSUM_RANGE]
            .iter()
            .fold(0u8, |acc, &b| acc ^ b)
    }

    pub fn status(&self) -> ReportStatus {
        ReportStatus::from_u8(self.status)
    }

    pub fn transaction_id(&self) -> u8 {
        self.transaction_id
    }

    pub fn remaining_packets(&self) -> u16 {
        u16::from_be_bytes(self.remaining_packets)
    }

    pub fn protocol_type(&self) -> u8 {
        self.protocol_type
    }

    pub fn data_size(&self) -> u8 {
        self.data_size
    }

    pub fn command_class(&self) -> u8 {
        self.command_class
    }

    pub fn command_id(&self) -> u8 {
        self.command_id
    }

    /// Registered command matching this report's class/id, if any
    pub fn command(&self) -> Option<Command> {
        Command::from_wire(self.command_class, self.command_id)
    }

    /// Full zero-padded argument area
    pub fn args(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.args
    }

    /// Argument bytes up to `data_size`
    pub fn payload(&self) -> &[u8] {
        let len = (self.data_size as usize).min(PAYLOAD_SIZE);
        &self.args[..len]
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Wire bytes of this report
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}
