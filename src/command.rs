//! Command dispatch.
//!
//! The transport (USB serial, stdin, a radio stack) only has to deliver an
//! endpoint identifier and a payload; [`dispatch`] looks the endpoint up in
//! [`ENDPOINTS`] and applies its mutation to the [`ConfigStore`].

use core::fmt;

use heapless::Vec;
use serde::Deserialize;

use crate::config::{ConfigStore, EnableMask};
use crate::log::*;

pub const SERVICE_UUID: &str = "61535c46-202a-4859-a213-520ef987c606";
pub const RATE_UUID: &str = "69e01dc5-b098-417a-9e2e-be69bc86c2ae";
pub const ENABLE_MASK_UUID: &str = "a6b1e3f2-5c2d-4f0e-9b7a-2d41c8e90f13";
pub const TARGET_TEMPERATURE_UUID: &str = "3f9d7a10-8e4b-4c61-a2f5-7b0c5e6d2a84";

/// Result of a well-formed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The value was not acceptable; the store is unchanged.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2040", derive(defmt::Format))]
pub enum CommandError {
    UnknownEndpoint,
    /// Every endpoint takes exactly one byte.
    PayloadLength(usize),
    Malformed,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownEndpoint => write!(f, "Unknown endpoint"),
            CommandError::PayloadLength(len) => {
                write!(f, "Expected a 1 byte payload, got {} bytes", len)
            }
            CommandError::Malformed => write!(f, "Malformed request"),
        }
    }
}

pub struct Endpoint {
    pub uuid: &'static str,
    pub alias: &'static str,
    pub apply: fn(&ConfigStore, u8) -> WriteOutcome,
}

impl Endpoint {
    pub fn matches(&self, id: &str) -> bool {
        id.eq_ignore_ascii_case(self.uuid) || id == self.alias
    }
}

pub static ENDPOINTS: [Endpoint; 3] = [
    Endpoint {
        uuid: RATE_UUID,
        alias: "rate",
        apply: write_rate,
    },
    Endpoint {
        uuid: ENABLE_MASK_UUID,
        alias: "enable",
        apply: write_enable_mask,
    },
    Endpoint {
        uuid: TARGET_TEMPERATURE_UUID,
        alias: "temperature",
        apply: write_target_temperature,
    },
];

pub fn write_rate(store: &ConfigStore, value: u8) -> WriteOutcome {
    if store.set_rate(value) {
        WriteOutcome::Applied
    } else {
        WriteOutcome::Ignored
    }
}

pub fn write_enable_mask(store: &ConfigStore, value: u8) -> WriteOutcome {
    store.set_enable_mask(EnableMask::from_bits_truncate(value));
    WriteOutcome::Applied
}

pub fn write_target_temperature(store: &ConfigStore, value: u8) -> WriteOutcome {
    store.set_temperature(value as f32);
    WriteOutcome::Applied
}

pub fn find_endpoint(id: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|endpoint| endpoint.matches(id))
}

pub fn dispatch(
    store: &ConfigStore,
    id: &str,
    payload: &[u8],
) -> Result<WriteOutcome, CommandError> {
    let endpoint = find_endpoint(id).ok_or(CommandError::UnknownEndpoint)?;
    let [value] = payload else {
        return Err(CommandError::PayloadLength(payload.len()));
    };
    Ok((endpoint.apply)(store, *value))
}

/// One line of the serial command protocol:
/// `{"endpoint":"rate","value":72}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WriteRequest<'a> {
    pub endpoint: &'a str,
    pub value: u8,
}

impl<'a> WriteRequest<'a> {
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        serde_json_core::from_str::<WriteRequest<'a>>(line.trim())
            .map(|(request, _)| request)
            .map_err(|_| CommandError::Malformed)
    }

    pub fn apply(&self, store: &ConfigStore) -> Result<WriteOutcome, CommandError> {
        dispatch(store, self.endpoint, &[self.value])
    }
}

/// Parse and apply one request line from a serial transport, logging the result.
pub fn execute_line(store: &ConfigStore, line: &str) -> Result<WriteOutcome, CommandError> {
    let request = WriteRequest::parse(line).inspect_err(|e| {
        warn!("Rejected command line {:?}: {}", line.trim(), e);
    })?;
    match request.apply(store) {
        Ok(WriteOutcome::Applied) => {
            info!("{} <- {}", request.endpoint, request.value);
            Ok(WriteOutcome::Applied)
        }
        Ok(WriteOutcome::Ignored) => {
            warn!("{} ignored value {}", request.endpoint, request.value);
            Ok(WriteOutcome::Ignored)
        }
        Err(e) => {
            warn!("Rejected write to {}: {}", request.endpoint, e);
            Err(e)
        }
    }
}

/// Longest request line a serial transport will buffer.
pub const LINE_CAPACITY: usize = 128;

/// Reassembles newline-terminated request lines from reads that may split
/// a line anywhere.
#[derive(Debug, Default)]
pub struct LineBuffer {
    line: Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Appends `data` and calls `on_line` with each completed line, trimmed.
    /// Blank, overlong and non-UTF-8 lines are dropped.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(&str)) {
        for &byte in data {
            if byte != b'\n' {
                if self.line.push(byte).is_err() {
                    self.overflowed = true;
                }
                continue;
            }

            if self.overflowed {
                warn!("Command line longer than {} bytes, dropped", LINE_CAPACITY);
            } else {
                match core::str::from_utf8(&self.line) {
                    Ok(text) if !text.trim().is_empty() => on_line(text.trim()),
                    Ok(_) => {}
                    Err(_) => warn!("Ignoring command line that is not UTF-8"),
                }
            }
            self.line.clear();
            self.overflowed = false;
        }
    }
}
