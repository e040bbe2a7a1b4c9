//! SBUS wire format: frame encoding, decoding and stream accumulation.
//!
//! This crate provides everything needed to put channel values on an SBUS
//! link and read them back:
//!
//! - **Encoding**: [`encode()`] packs 16 channel values into a 25-byte [`Frame`]
//! - **Decoding**: [`decode()`] recovers the first 12 channel values from a frame
//! - **Validation**: [`validate()`] optionally checks header and footer bytes
//! - **Streams**: [`FrameAccumulator`] reassembles frames from arbitrary chunks
//! - **Bit cursors**: [`BitWriter`] and [`BitReader`] for LSB-first bit fields
//!
//! # Frame Format
//!
//! ```text
//! +------+--------------------------------+-------+--------+
//! | 0x0F | 16 x 11-bit channels (22 bytes)| flags | 0x00   |
//! +------+--------------------------------+-------+--------+
//!   [0]              [1..=22]               [23]    [24]
//! ```
//!
//! Channels are packed as contiguous 11-bit little-endian fields, channel 1
//! first: bit 0 of channel 1 is bit 0 of byte 1, bit 0 of channel 2 is bit 3
//! of byte 2, and so on. 16 x 11 = 176 bits fill the 22 data bytes exactly.
//!
//! The flag byte carries failsafe (bit 7) and the two digital channels
//! (bits 6 and 5). Frames produced by [`encode()`] always carry
//! [`FrameFlags::NONE`].
//!
//! # Examples
//!
//! ```
//! use sbus_proto::{decode, encode, HEADER};
//!
//! let mut channels = [1000u16; 16];
//! channels[4] = 500;
//!
//! let frame = encode(&channels);
//! assert_eq!(frame[0], HEADER);
//!
//! let decoded = decode(&frame).unwrap();
//! assert_eq!(decoded[..], channels[..12]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bits;
pub mod frame;
pub mod stream;

pub use bits::{BitReader, BitWriter};
pub use frame::{
    decode, encode, validate, Frame, FrameError, FrameFlags, CHANNEL_BITS, CHANNEL_COUNT,
    CHANNEL_MASK, DECODED_CHANNELS, FOOTER, FRAME_LEN, HEADER,
};
pub use stream::FrameAccumulator;

/// Default baud rate of the serial link carrying frames.
pub const DEFAULT_BAUDRATE: u32 = 115_200;
