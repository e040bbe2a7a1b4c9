//! Serial port adapter for the transport traits.
//!
//! The port is opened once. [`open`] clones the handle so the transmit and
//! receive loops each own one half. There is no reconnect: if opening fails,
//! both halves are closed and the loops idle against them.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::{info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use transmitter_core::{ByteSource, FrameSink, LinkStatus, TransportError};

/// Map an I/O error onto the core error type.
#[must_use]
pub fn transport_error(err: &io::Error) -> TransportError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
        io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => TransportError::Closed,
        _ => TransportError::Io,
    }
}

/// Write half of the link.
pub struct SerialWriter {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialWriter {
    /// A writer that is never open.
    #[must_use]
    pub fn closed() -> Self {
        Self { port: None }
    }
}

impl FrameSink for SerialWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(bytes).map_err(|e| transport_error(&e))
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

/// Read half of the link.
pub struct SerialReader {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialReader {
    /// A reader that is never open.
    #[must_use]
    pub fn closed() -> Self {
        Self { port: None }
    }
}

impl ByteSource for SerialReader {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        match port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(transport_error(&e)),
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

/// Both halves of an opened link plus the status to show.
pub struct SerialLink {
    pub writer: SerialWriter,
    pub reader: SerialReader,
    pub status: LinkStatus,
}

impl SerialLink {
    /// Both halves closed, showing `status`.
    #[must_use]
    pub fn closed(status: LinkStatus) -> Self {
        Self {
            writer: SerialWriter::closed(),
            reader: SerialReader::closed(),
            status,
        }
    }
}

/// Open `path` at `baud`, 8N1 without flow control.
///
/// Failure is not an error for the caller: it is logged and returned as a
/// closed link with [`LinkStatus::Error`].
pub fn open(path: &str, baud: u32, read_timeout: Duration) -> SerialLink {
    match try_open(path, baud, read_timeout) {
        Ok((writer, reader)) => {
            info!("Status: Connected to {path} at {baud} baud");
            SerialLink {
                writer,
                reader,
                status: LinkStatus::Connected,
            }
        }
        Err(e) => {
            warn!("Status: Error - {path}: {e}");
            SerialLink::closed(LinkStatus::Error(open_error(&e)))
        }
    }
}

fn try_open(
    path: &str,
    baud: u32,
    read_timeout: Duration,
) -> serialport::Result<(SerialWriter, SerialReader)> {
    let port = serialport::new(path, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(read_timeout)
        .open()?;
    let reader = port.try_clone()?;

    Ok((
        SerialWriter { port: Some(port) },
        SerialReader { port: Some(reader) },
    ))
}

fn open_error(err: &serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => TransportError::Closed,
        serialport::ErrorKind::Io(kind) => transport_error(&io::Error::from(kind)),
        _ => TransportError::Io,
    }
}
