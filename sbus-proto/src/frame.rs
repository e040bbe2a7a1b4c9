//! SBUS frame layout, encoder and decoder.

use core::fmt;

use crate::bits::{BitReader, BitWriter};

/// Total frame length in bytes.
pub const FRAME_LEN: usize = 25;

/// Frame start byte.
pub const HEADER: u8 = 0x0F;

/// Frame end byte.
pub const FOOTER: u8 = 0x00;

/// Number of proportional channels packed into a frame.
pub const CHANNEL_COUNT: usize = 16;

/// Number of channels recovered by [`decode`].
///
/// Channels 13-16 are present in the bitstream but not reconstructed;
/// consumers of decoded frames are written against exactly 12 values.
pub const DECODED_CHANNELS: usize = 12;

/// Width of one channel field in bits.
pub const CHANNEL_BITS: u32 = 11;

/// Mask selecting the bits of one channel field.
pub const CHANNEL_MASK: u16 = 0x07FF;

/// Offset of the first channel byte.
const DATA_START: usize = 1;

/// Offset of the flag byte.
const FLAG_INDEX: usize = 23;

/// Offset of the footer byte.
const FOOTER_INDEX: usize = 24;

/// One encoded SBUS frame.
pub type Frame = [u8; FRAME_LEN];

/// Contents of the flag byte (byte 23).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFlags(pub u8);

impl FrameFlags {
    /// Failsafe active on the transmitting side.
    pub const FAILSAFE: Self = Self(1 << 7);
    /// Digital channel 17.
    pub const CHANNEL_17: Self = Self(1 << 6);
    /// Digital channel 18.
    pub const CHANNEL_18: Self = Self(1 << 5);

    /// No flags set. Every frame from [`encode`] carries this value.
    pub const NONE: Self = Self(0);

    /// Read the flag byte of a frame.
    #[inline]
    #[must_use]
    pub const fn of(frame: &Frame) -> Self {
        Self(frame[FLAG_INDEX])
    }

    /// Check if the given flag(s) are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, flag: FrameFlags) -> bool {
        (self.0 & flag.0) == flag.0
    }

    /// Get the raw byte.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Reasons [`validate`] rejects a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer than [`FRAME_LEN`] bytes were supplied.
    TooShort(usize),
    /// Byte 0 is not [`HEADER`].
    BadHeader(u8),
    /// Byte 24 is not [`FOOTER`].
    BadFooter(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "frame too short ({len} of {FRAME_LEN} bytes)"),
            Self::BadHeader(byte) => write!(f, "bad header byte 0x{byte:02X}"),
            Self::BadFooter(byte) => write!(f, "bad footer byte 0x{byte:02X}"),
        }
    }
}

/// Encode 16 channel values into an SBUS frame.
///
/// Values are not range-checked: each channel contributes only its low 11
/// bits, so `2048 + n` encodes exactly like `n`. The flag byte and footer are
/// always zero.
///
/// # Example
///
/// ```
/// use sbus_proto::{encode, FOOTER, HEADER};
///
/// let frame = encode(&[0u16; 16]);
/// assert_eq!(frame[0], HEADER);
/// assert!(frame[1..].iter().all(|&b| b == FOOTER));
/// ```
#[must_use]
pub fn encode(channels: &[u16; CHANNEL_COUNT]) -> Frame {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = HEADER;

    let mut writer = BitWriter::new(&mut frame[DATA_START..FLAG_INDEX]);
    for &value in channels {
        writer.write(value, CHANNEL_BITS);
    }

    frame[FLAG_INDEX] = FrameFlags::NONE.bits();
    frame[FOOTER_INDEX] = FOOTER;
    frame
}

/// Decode the first 12 channel values from a received byte sequence.
///
/// Returns `None` when fewer than [`FRAME_LEN`] bytes are available; the
/// caller keeps buffering and retries. Only the first 25 bytes are looked at.
///
/// Decoding is positional: header, flag and footer bytes are not checked, so
/// a misaligned stream decodes to garbage rather than an error. Use
/// [`validate`] first when that matters.
#[must_use]
pub fn decode(bytes: &[u8]) -> Option<[u16; DECODED_CHANNELS]> {
    if bytes.len() < FRAME_LEN {
        return None;
    }

    let mut reader = BitReader::new(&bytes[DATA_START..FLAG_INDEX]);
    let mut channels = [0u16; DECODED_CHANNELS];
    for value in &mut channels {
        *value = reader.read(CHANNEL_BITS) & CHANNEL_MASK;
    }

    Some(channels)
}

/// Check the framing bytes of a received byte sequence.
///
/// Never called by [`decode`]; frame consumers opt in.
pub fn validate(bytes: &[u8]) -> Result<(), FrameError> {
    if bytes.len() < FRAME_LEN {
        return Err(FrameError::TooShort(bytes.len()));
    }
    if bytes[0] != HEADER {
        return Err(FrameError::BadHeader(bytes[0]));
    }
    if bytes[FOOTER_INDEX] != FOOTER {
        return Err(FrameError::BadFooter(bytes[FOOTER_INDEX]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// Power-on channel layout: sticks and CH6 at 1000, switches at 500.
    const NEUTRAL: [u16; CHANNEL_COUNT] = [
        1000, 1000, 1000, 1000, 500, 1000, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    ];

    const NEUTRAL_FRAME: Frame =
        hex!("0F E8 43 1F FA D0 47 1F F4 D1 87 3E F4 A1 0F 7D E8 43 1F FA D0 87 3E 00 00");

    /// Reference byte formulas for the first channel group, spelled out.
    fn reference_bytes(c: &[u16; CHANNEL_COUNT]) -> [u8; 11] {
        [
            (c[0] & 0xFF) as u8,
            (((c[0] >> 8) & 0x07) | ((c[1] & 0x1F) << 3)) as u8,
            (((c[1] >> 5) & 0x3F) | ((c[2] & 0x03) << 6)) as u8,
            ((c[2] >> 2) & 0xFF) as u8,
            (((c[2] >> 10) & 0x01) | ((c[3] & 0x7F) << 1)) as u8,
            (((c[3] >> 7) & 0x0F) | ((c[4] & 0x0F) << 4)) as u8,
            (((c[4] >> 4) & 0x7F) | ((c[5] & 0x01) << 7)) as u8,
            ((c[5] >> 1) & 0xFF) as u8,
            (((c[5] >> 9) & 0x03) | ((c[6] & 0x3F) << 2)) as u8,
            (((c[6] >> 6) & 0x1F) | ((c[7] & 0x07) << 5)) as u8,
            ((c[7] >> 3) & 0xFF) as u8,
        ]
    }

    #[test]
    fn test_encode_neutral_frame() {
        assert_eq!(encode(&NEUTRAL), NEUTRAL_FRAME);
    }

    #[test]
    fn test_encode_matches_shift_and_mask_formulas() {
        let channels = [
            17, 2047, 1, 1024, 360, 1680, 999, 3, 1500, 0, 2046, 777, 12, 1111, 500, 2000,
        ];
        let frame = encode(&channels);
        assert_eq!(frame[1..12], reference_bytes(&channels));

        // Second group of eight channels repeats the same byte pattern
        let mut shifted = [0u16; CHANNEL_COUNT];
        shifted[..8].copy_from_slice(&channels[8..]);
        assert_eq!(frame[12..23], reference_bytes(&shifted));
    }

    #[test]
    fn test_encode_out_of_range_wraps_to_11_bits() {
        let mut wrapped = NEUTRAL;
        wrapped[0] = 2048 + 1000;
        wrapped[7] = 0xFFFF;

        let mut masked = NEUTRAL;
        masked[7] = 0x07FF;

        assert_eq!(encode(&wrapped), encode(&masked));
    }

    #[test]
    fn test_encode_flags_and_footer_zero() {
        let frame = encode(&[2047; CHANNEL_COUNT]);
        assert_eq!(frame[0], HEADER);
        assert_eq!(FrameFlags::of(&frame), FrameFlags::NONE);
        assert_eq!(frame[24], FOOTER);
        assert!(frame[1..23].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_decode_neutral_frame() {
        let decoded = decode(&NEUTRAL_FRAME).unwrap();
        assert_eq!(decoded[..], NEUTRAL[..DECODED_CHANNELS]);
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(decode(&NEUTRAL_FRAME[..24]), None);
        assert_eq!(decode(&[]), None);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut long = [0u8; 40];
        long[..FRAME_LEN].copy_from_slice(&NEUTRAL_FRAME);
        long[FRAME_LEN..].fill(0xAA);
        assert_eq!(decode(&long), decode(&NEUTRAL_FRAME));
    }

    #[test]
    fn test_decode_does_not_check_header() {
        let mut frame = NEUTRAL_FRAME;
        frame[0] = 0x55;
        frame[23] = 0xFF;
        frame[24] = 0x12;
        assert_eq!(decode(&frame).unwrap()[..], NEUTRAL[..DECODED_CHANNELS]);
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(&NEUTRAL_FRAME), Ok(()));

        let mut frame = NEUTRAL_FRAME;
        frame[0] = 0x0E;
        assert_eq!(validate(&frame), Err(FrameError::BadHeader(0x0E)));

        let mut frame = NEUTRAL_FRAME;
        frame[24] = 0x04;
        assert_eq!(validate(&frame), Err(FrameError::BadFooter(0x04)));

        assert_eq!(validate(&NEUTRAL_FRAME[..3]), Err(FrameError::TooShort(3)));
    }

    #[test]
    fn test_flags() {
        let flags = FrameFlags(0b1010_0000);
        assert!(flags.contains(FrameFlags::FAILSAFE));
        assert!(flags.contains(FrameFlags::CHANNEL_18));
        assert!(!flags.contains(FrameFlags::CHANNEL_17));
    }
}
