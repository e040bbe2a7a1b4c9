//! Receive cycle: SBUS frames or diagnostic text lines from the link.

use core::fmt;

use heapless::Vec;
use sbus_proto::{decode, validate, Frame, FrameAccumulator, FrameError, DECODED_CHANNELS};

use crate::transport::{ByteSource, LinkStatus, StatusCell, TransportError};

/// Maximum length of one text line, excluding the terminator.
pub const MAX_LINE_LENGTH: usize = 256;

/// Bytes requested from the source per read.
const READ_CHUNK: usize = 64;

/// Sleep between polls when nothing arrived, in milliseconds.
pub const IDLE_SLEEP_MS: u64 = 10;

/// Sleep after a read error, in milliseconds.
pub const ERROR_SLEEP_MS: u64 = 100;

/// How received bytes are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveMode {
    /// Consecutive 25-byte SBUS frames.
    Frame,
    /// LF-terminated diagnostic text.
    #[default]
    Line,
}

/// Error type for receive-side parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    /// A text line exceeded [`MAX_LINE_LENGTH`]; it is dropped up to the
    /// next LF.
    LineTooLong,
}

impl fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineTooLong => write!(f, "line longer than {MAX_LINE_LENGTH} bytes"),
        }
    }
}

/// Something the receive cycle produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveEvent<'a> {
    /// A complete frame and its first 12 channels.
    Frame {
        raw: &'a Frame,
        channels: [u16; DECODED_CHANNELS],
    },
    /// A frame that failed validation (only with validation enabled).
    Rejected { raw: &'a Frame, error: FrameError },
    /// A complete, non-blank text line without its terminator.
    Line(&'a str),
    /// Input was dropped.
    Discarded(ReceiveError),
}

/// Builds text lines from single bytes.
///
/// - LF ends a line. Lines that are empty or whitespace-only are dropped.
/// - CR is discarded wherever it appears.
/// - Non-ASCII bytes are discarded.
/// - A partial line persists across reads.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8, MAX_LINE_LENGTH>,
    complete: bool,
    overflowed: bool,
}

impl LineAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            complete: false,
            overflowed: false,
        }
    }

    /// Push one byte.
    ///
    /// Returns `Ok(true)` when the byte completed a line, which stays
    /// available from [`line`](Self::line) until the next push. Overflow is
    /// reported once per overlong line.
    pub fn push(&mut self, byte: u8) -> Result<bool, ReceiveError> {
        if self.complete {
            self.complete = false;
            self.buffer.clear();
        }

        match byte {
            b'\n' => {
                if core::mem::take(&mut self.overflowed) {
                    self.buffer.clear();
                    return Ok(false);
                }
                if self.buffer.iter().all(|&b| is_blank(b)) {
                    self.buffer.clear();
                    return Ok(false);
                }
                self.complete = true;
                Ok(true)
            }
            b'\r' => Ok(false),
            b if !b.is_ascii() => Ok(false),
            _ if self.overflowed => Ok(false),
            b => {
                if self.buffer.push(b).is_err() {
                    self.buffer.clear();
                    self.overflowed = true;
                    return Err(ReceiveError::LineTooLong);
                }
                Ok(false)
            }
        }
    }

    /// The last completed line, or `""` if none is pending.
    #[must_use]
    pub fn line(&self) -> &str {
        if self.complete {
            // Only ASCII bytes are ever stored
            core::str::from_utf8(&self.buffer).unwrap_or_default()
        } else {
            ""
        }
    }

    /// Bytes of the line currently being assembled.
    #[must_use]
    pub fn pending(&self) -> usize {
        if self.complete {
            0
        } else {
            self.buffer.len()
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.complete = false;
        self.overflowed = false;
    }
}

/// ASCII whitespace including vertical tab, which `u8::is_ascii_whitespace`
/// leaves out.
fn is_blank(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0B
}

/// Reads a [`ByteSource`] and turns the bytes into [`ReceiveEvent`]s.
pub struct Receiver<'a, B> {
    source: B,
    mode: ReceiveMode,
    validate: bool,
    frames: FrameAccumulator,
    lines: LineAssembler,
    buf: [u8; READ_CHUNK],
    status: Option<&'a StatusCell>,
    failing: bool,
}

impl<'a, B: ByteSource> Receiver<'a, B> {
    pub fn new(source: B, mode: ReceiveMode) -> Self {
        Self {
            source,
            mode,
            validate: false,
            frames: FrameAccumulator::new(),
            lines: LineAssembler::new(),
            buf: [0; READ_CHUNK],
            status: None,
            failing: false,
        }
    }

    /// Reject frames with a bad header or footer instead of decoding them.
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Report read failures and recoveries through `status`.
    #[must_use]
    pub fn with_status(mut self, status: &'a StatusCell) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn mode(&self) -> ReceiveMode {
        self.mode
    }

    pub fn source(&self) -> &B {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut B {
        &mut self.source
    }

    /// Read once and deliver every event the bytes complete.
    ///
    /// Returns the number of bytes read; `0` when nothing was available.
    pub fn poll<F>(&mut self, mut handler: F) -> Result<usize, TransportError>
    where
        F: FnMut(ReceiveEvent<'_>),
    {
        if !self.source.is_open() {
            return Err(TransportError::Closed);
        }

        let n = match self.source.read_available(&mut self.buf) {
            Ok(n) => n,
            Err(TransportError::Timeout) => 0,
            Err(e) => {
                if !self.failing {
                    self.failing = true;
                    warn!("receive failed: {:?}", e);
                    self.report(LinkStatus::Error(e));
                }
                return Err(e);
            }
        };

        if self.failing {
            self.failing = false;
            info!("receive recovered");
            self.report(LinkStatus::Connected);
        }

        let bytes = &self.buf[..n];
        match self.mode {
            ReceiveMode::Frame => {
                let mut rest = bytes;
                while !rest.is_empty() {
                    let (done, tail) = self.frames.push_bytes(rest);
                    rest = tail;
                    let Some(frame) = done else { continue };

                    if self.validate {
                        if let Err(error) = validate(&frame) {
                            warn!("frame rejected: {:?}", error);
                            handler(ReceiveEvent::Rejected { raw: &frame, error });
                            continue;
                        }
                    }
                    if let Some(channels) = decode(&frame) {
                        trace!("rx {:?}", frame);
                        handler(ReceiveEvent::Frame {
                            raw: &frame,
                            channels,
                        });
                    }
                }
            }
            ReceiveMode::Line => {
                for &byte in bytes {
                    match self.lines.push(byte) {
                        Ok(true) => handler(ReceiveEvent::Line(self.lines.line())),
                        Ok(false) => {}
                        Err(e) => {
                            warn!("receive: {:?}", e);
                            handler(ReceiveEvent::Discarded(e));
                        }
                    }
                }
            }
        }

        Ok(n)
    }

    fn report(&self, status: LinkStatus) {
        if let Some(cell) = self.status {
            cell.update(status);
        }
    }
}

#[cfg(feature = "std")]
impl<B: ByteSource> Receiver<'_, B> {
    /// Poll until `running` is cleared.
    ///
    /// Reads back to back while data keeps arriving, sleeps
    /// [`IDLE_SLEEP_MS`] when idle or closed and [`ERROR_SLEEP_MS`] after an
    /// error.
    pub fn run<F>(&mut self, running: &crate::RunFlag, mut handler: F)
    where
        F: FnMut(ReceiveEvent<'_>),
    {
        use std::time::Duration;

        debug!("receive loop started in {:?} mode", self.mode);
        while running.is_running() {
            match self.poll(&mut handler) {
                Ok(0) | Err(TransportError::Closed) => {
                    std::thread::sleep(Duration::from_millis(IDLE_SLEEP_MS));
                }
                Ok(_) => {}
                Err(_) => std::thread::sleep(Duration::from_millis(ERROR_SLEEP_MS)),
            }
        }
        debug!("receive loop stopped");
    }
}
