//! Serial link traits, errors and the shared link status.

use core::cell::Cell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Error type for link operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The link is not open (never opened, or lost).
    Closed,
    /// The operation did not complete within the link's timeout.
    Timeout,
    /// Any other I/O failure reported by the driver.
    Io,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "port closed",
            Self::Timeout => "timed out",
            Self::Io => "I/O error",
        })
    }
}

/// Outbound half of the serial link.
pub trait FrameSink {
    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Check if the link is open for writing.
    fn is_open(&self) -> bool;
}

/// Inbound half of the serial link.
pub trait ByteSource {
    /// Read whatever bytes are available into `buf`, waiting at most the
    /// link's read timeout.
    ///
    /// `Ok(0)` means nothing arrived. Implementations may also report an
    /// expired wait as [`TransportError::Timeout`]; receivers treat both the
    /// same.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Check if the link is open for reading.
    fn is_open(&self) -> bool;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write(bytes)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read_available(buf)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// State of the serial link as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// Not opened yet.
    #[default]
    Ready,
    Connected,
    /// Closed on request.
    Disconnected,
    /// Opening failed or the link started failing.
    Error(TransportError),
}

impl LinkStatus {
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Status: Ready"),
            Self::Connected => f.write_str("Status: Connected"),
            Self::Disconnected => f.write_str("Status: Disconnected"),
            Self::Error(e) => write!(f, "Status: Error - {e}"),
        }
    }
}

/// Link status shared between the transport loops and the display.
///
/// Loops write it when the link changes state; the display reads it on
/// every refresh.
pub struct StatusCell {
    inner: Mutex<CriticalSectionRawMutex, Cell<LinkStatus>>,
}

impl StatusCell {
    #[must_use]
    pub const fn new(status: LinkStatus) -> Self {
        Self {
            inner: Mutex::new(Cell::new(status)),
        }
    }

    #[must_use]
    pub fn get(&self) -> LinkStatus {
        self.inner.lock(Cell::get)
    }

    /// Store `status`, returning the previous value.
    pub fn replace(&self, status: LinkStatus) -> LinkStatus {
        self.inner.lock(|cell| cell.replace(status))
    }

    /// Store `status` and log the change if it differs from the current one.
    pub fn update(&self, status: LinkStatus) {
        let previous = self.replace(status);
        if previous != status {
            match status {
                LinkStatus::Error(e) => warn!("link error: {:?}", e),
                _ => debug!("link status {:?} -> {:?}", previous, status),
            }
        }
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new(LinkStatus::Ready)
    }
}

impl fmt::Debug for StatusCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StatusCell").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_status_strings() {
        assert_eq!(LinkStatus::Ready.to_string(), "Status: Ready");
        assert_eq!(LinkStatus::Connected.to_string(), "Status: Connected");
        assert_eq!(LinkStatus::Disconnected.to_string(), "Status: Disconnected");
        assert_eq!(
            LinkStatus::Error(TransportError::Closed).to_string(),
            "Status: Error - port closed"
        );
    }

    #[test]
    fn test_status_cell_replace() {
        let cell = StatusCell::default();
        assert_eq!(cell.get(), LinkStatus::Ready);
        assert_eq!(cell.replace(LinkStatus::Connected), LinkStatus::Ready);
        cell.update(LinkStatus::Error(TransportError::Io));
        assert!(cell.get().is_error());
    }

    #[test]
    fn test_status_cell_shared_between_threads() {
        let cell = StatusCell::default();
        std::thread::scope(|s| {
            s.spawn(|| cell.update(LinkStatus::Connected));
        });
        assert_eq!(cell.get(), LinkStatus::Connected);
    }
}
