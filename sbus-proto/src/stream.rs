//! Reassembly of frames from a byte stream.

use crate::frame::{Frame, FRAME_LEN};

/// Collects bytes from arbitrary-sized reads into complete frames.
///
/// Bytes are counted off in arrival order, 25 at a time. No attempt is made
/// to find a header byte: the accumulator is positional, like [`decode`],
/// and a stream that starts mid-frame stays misaligned.
///
/// [`decode`]: crate::decode
///
/// # Example
///
/// ```
/// use sbus_proto::{encode, FrameAccumulator};
///
/// let frame = encode(&[1000; 16]);
/// let mut acc = FrameAccumulator::new();
///
/// let (done, _) = acc.push_bytes(&frame[..10]);
/// assert!(done.is_none());
///
/// let (done, rest) = acc.push_bytes(&frame[10..]);
/// assert_eq!(done, Some(frame));
/// assert!(rest.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    buffer: [u8; FRAME_LEN],
    len: usize,
}

impl FrameAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAME_LEN],
            len: 0,
        }
    }

    /// Push a single byte, returning the frame it completes.
    pub fn push_byte(&mut self, byte: u8) -> Option<Frame> {
        self.buffer[self.len] = byte;
        self.len += 1;

        if self.len == FRAME_LEN {
            self.len = 0;
            Some(self.buffer)
        } else {
            None
        }
    }

    /// Push a chunk of bytes.
    ///
    /// Stops at the first completed frame and returns it together with the
    /// unconsumed rest of the chunk, which the caller feeds back in.
    pub fn push_bytes<'b>(&mut self, bytes: &'b [u8]) -> (Option<Frame>, &'b [u8]) {
        let take = (FRAME_LEN - self.len).min(bytes.len());
        let (head, rest) = bytes.split_at(take);

        self.buffer[self.len..self.len + take].copy_from_slice(head);
        self.len += take;

        if self.len == FRAME_LEN {
            self.len = 0;
            (Some(self.buffer), rest)
        } else {
            (None, rest)
        }
    }

    /// Number of bytes of the frame currently being assembled.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.len
    }

    /// Discard any partially assembled frame.
    #[inline]
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::frame::encode;
    use std::vec::Vec;

    fn sample(first: u16) -> Frame {
        let mut channels = [500u16; 16];
        channels[0] = first;
        encode(&channels)
    }

    #[test]
    fn test_byte_by_byte() {
        let frame = sample(1234);
        let mut acc = FrameAccumulator::new();

        for &b in &frame[..FRAME_LEN - 1] {
            assert_eq!(acc.push_byte(b), None);
        }
        assert_eq!(acc.pending(), FRAME_LEN - 1);
        assert_eq!(acc.push_byte(frame[FRAME_LEN - 1]), Some(frame));
        assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn test_chunk_holding_two_frames() {
        let a = sample(360);
        let b = sample(1680);
        let mut stream = Vec::new();
        stream.extend_from_slice(&a);
        stream.extend_from_slice(&b);
        stream.extend_from_slice(&a[..5]);

        let mut acc = FrameAccumulator::new();
        let mut frames = Vec::new();
        let mut rest = stream.as_slice();
        while !rest.is_empty() {
            let (done, tail) = acc.push_bytes(rest);
            frames.extend(done);
            rest = tail;
        }

        assert_eq!(frames, [a, b]);
        assert_eq!(acc.pending(), 5);
    }

    #[test]
    fn test_partial_frame_persists_across_pushes() {
        let frame = sample(999);
        let mut acc = FrameAccumulator::new();

        assert_eq!(acc.push_bytes(&frame[..7]).0, None);
        assert_eq!(acc.push_bytes(&frame[7..20]).0, None);
        assert_eq!(acc.push_bytes(&frame[20..]).0, Some(frame));
    }

    #[test]
    fn test_reset_discards_partial() {
        let frame = sample(1000);
        let mut acc = FrameAccumulator::new();
        let _ = acc.push_bytes(&[0xAA; 3]);
        acc.reset();
        assert_eq!(acc.push_bytes(&frame).0, Some(frame));
    }
}
