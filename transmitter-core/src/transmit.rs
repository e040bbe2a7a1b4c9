//! Transmit cycle: encode the channel store and write it out.

use sbus_proto::{encode, Frame};

use crate::channels::ChannelStore;
use crate::transport::{FrameSink, LinkStatus, StatusCell, TransportError};

/// Result of one transmit tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Sent,
    /// The sink was not open; nothing was written.
    Skipped,
    /// The write failed. The next tick tries again.
    Failed(TransportError),
}

/// Frame counters, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitStats {
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Periodically sends the channel store over a [`FrameSink`].
///
/// Fire and forget: there is no acknowledgement and no retry. A failed write
/// is logged once when the link starts failing and the loop carries on.
pub struct Transmitter<'a, S> {
    sink: S,
    store: &'a ChannelStore,
    status: Option<&'a StatusCell>,
    stats: TransmitStats,
    failing: bool,
}

impl<'a, S: FrameSink> Transmitter<'a, S> {
    pub fn new(sink: S, store: &'a ChannelStore) -> Self {
        Self {
            sink,
            store,
            status: None,
            stats: TransmitStats::default(),
            failing: false,
        }
    }

    /// Report write failures and recoveries through `status`.
    #[must_use]
    pub fn with_status(mut self, status: &'a StatusCell) -> Self {
        self.status = Some(status);
        self
    }

    /// Encode the current snapshot and write it.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.sink.is_open() {
            self.stats.skipped = self.stats.skipped.wrapping_add(1);
            return TickOutcome::Skipped;
        }

        let frame: Frame = encode(&self.store.snapshot());
        match self.sink.write(&frame) {
            Ok(()) => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                if self.failing {
                    self.failing = false;
                    info!("transmit recovered");
                    self.report(LinkStatus::Connected);
                }
                trace!("tx {:?}", frame);
                TickOutcome::Sent
            }
            Err(e) => {
                self.stats.failed = self.stats.failed.wrapping_add(1);
                if !self.failing {
                    self.failing = true;
                    warn!("transmit failed: {:?}", e);
                    self.report(LinkStatus::Error(e));
                }
                TickOutcome::Failed(e)
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> TransmitStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn report(&self, status: LinkStatus) {
        if let Some(cell) = self.status {
            cell.update(status);
        }
    }
}

#[cfg(feature = "std")]
impl<S: FrameSink> Transmitter<'_, S> {
    /// Transmit every `period` until `running` is cleared.
    pub fn run(&mut self, running: &crate::RunFlag, period: std::time::Duration) -> TransmitStats {
        let mut ticker = crate::Ticker::every(period);
        debug!("transmit loop started");
        while running.is_running() {
            self.tick();
            ticker.next();
        }
        let stats = self.stats;
        debug!(
            "transmit loop stopped: {} sent, {} skipped, {} failed",
            stats.sent,
            stats.skipped,
            stats.failed
        );
        stats
    }
}
