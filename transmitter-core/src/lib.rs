//! Platform-agnostic transmitter logic: channel state, keyboard mapping and
//! the transmit/receive cycles.
//!
//! # Overview
//!
//! - [`channels`]: the shared [`ChannelStore`] and [`SwitchPosition`]
//! - [`keymap`]: key bindings ([`KeyMap`], [`DEFAULT_KEYMAP`])
//! - [`input`]: the [`InputMapper`] and its [`KeySource`] trait
//! - [`transport`]: link traits ([`FrameSink`], [`ByteSource`]) and [`LinkStatus`]
//! - [`transmit`]: the periodic [`Transmitter`]
//! - [`receive`]: the [`Receiver`] for SBUS frames or text lines
//! - [`runtime`]: the [`RunFlag`] and, with `std`, the [`Ticker`]
//!
//! Data flows in one direction:
//!
//! ```text
//! KeySource -> InputMapper -> ChannelStore -> Transmitter -> FrameSink
//!                                             Receiver    <- ByteSource
//! ```
//!
//! # Example
//!
//! ```rust
//! use transmitter_core::{ChannelStore, InputMapper, Key, KeySource};
//!
//! struct Holding(char);
//!
//! impl KeySource for Holding {
//!     fn is_held(&self, key: Key) -> bool {
//!         key.char() == self.0
//!     }
//! }
//!
//! let store = ChannelStore::new();
//! let mut mapper = InputMapper::default();
//!
//! mapper.poll(&Holding('w'), &store);
//! assert_eq!(store.get(2), 1010);
//! ```
//!
//! # Features
//!
//! - **`std`**: blocking run loops and [`Ticker`]
//! - **`log`**: log through the `log` facade
//! - **`defmt`**: log through `defmt` (embedded)
//! - **`critical-section`**: atomics through `critical-section` on targets
//!   without native CAS

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod fmt;

pub mod channels;
pub mod input;
pub mod keymap;
pub mod receive;
pub mod runtime;
pub mod transmit;
pub mod transport;

pub use channels::{
    proportion, ChannelStore, SwitchPosition, AXIS_MAX, AXIS_MIN, AXIS_NEUTRAL, CHANNEL_COUNT,
    CHANNEL_NAMES, NEUTRAL_CHANNELS, SWITCH_CHANNELS, SWITCH_COUNT,
};
pub use input::{InputMapper, KeySource, PollOutcome, ToggleLatch};
pub use keymap::{AxisBinding, Key, KeyMap, SnapBinding, ToggleBinding, AXIS_STEP, DEFAULT_KEYMAP};
pub use receive::{
    LineAssembler, ReceiveError, ReceiveEvent, ReceiveMode, Receiver, MAX_LINE_LENGTH,
};
pub use runtime::RunFlag;
#[cfg(feature = "std")]
pub use runtime::Ticker;
pub use transmit::{TickOutcome, TransmitStats, Transmitter};
pub use transport::{ByteSource, FrameSink, LinkStatus, StatusCell, TransportError};

pub use sbus_proto;
