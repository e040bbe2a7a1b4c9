//! Property tests for the frame codec.

use proptest::prelude::*;
use sbus_proto::{
    decode, encode, FrameAccumulator, CHANNEL_BITS, CHANNEL_COUNT, DECODED_CHANNELS, FOOTER,
    FRAME_LEN, HEADER,
};

fn channels() -> impl Strategy<Value = [u16; CHANNEL_COUNT]> {
    prop::array::uniform16(0u16..=2047)
}

/// Byte indices (within the frame) touched by channel `k`'s 11-bit slot.
fn slot_bytes(k: usize) -> core::ops::RangeInclusive<usize> {
    let first_bit = k * CHANNEL_BITS as usize;
    let last_bit = first_bit + CHANNEL_BITS as usize - 1;
    (1 + first_bit / 8)..=(1 + last_bit / 8)
}

proptest! {
    /// Every in-range vector survives encode/decode on the channels the
    /// decoder reconstructs.
    #[test]
    fn round_trip_first_twelve(values in channels()) {
        let frame = encode(&values);
        let decoded = decode(&frame).unwrap();
        prop_assert_eq!(&decoded[..], &values[..DECODED_CHANNELS]);
    }

    /// Framing bytes never depend on channel values.
    #[test]
    fn framing_bytes_constant(values in channels()) {
        let frame = encode(&values);
        prop_assert_eq!(frame[0], HEADER);
        prop_assert_eq!(frame[23], 0);
        prop_assert_eq!(frame[24], FOOTER);
    }

    /// Changing one channel only rewrites the bytes its slot overlaps and
    /// leaves every other decoded channel alone.
    #[test]
    fn single_channel_change_is_isolated(
        values in channels(),
        k in 0usize..CHANNEL_COUNT,
        replacement in 0u16..=2047,
    ) {
        let mut changed = values;
        changed[k] = replacement;

        let before = encode(&values);
        let after = encode(&changed);

        let touched = slot_bytes(k);
        for i in 0..FRAME_LEN {
            if !touched.contains(&i) {
                prop_assert_eq!(before[i], after[i], "byte {} changed for channel {}", i, k);
            }
        }

        let decoded = decode(&after).unwrap();
        for (j, &v) in decoded.iter().enumerate() {
            if j != k {
                prop_assert_eq!(v, values[j]);
            }
        }
    }

    /// Frames split at arbitrary points reassemble unchanged.
    #[test]
    fn accumulator_reassembles_any_split(values in channels(), split in 0usize..=FRAME_LEN) {
        let frame = encode(&values);
        let mut acc = FrameAccumulator::new();

        let (first, rest) = acc.push_bytes(&frame[..split]);
        prop_assert!(first.is_none() || split == FRAME_LEN);
        prop_assert!(rest.is_empty());

        let done = first.or_else(|| acc.push_bytes(&frame[split..]).0);
        prop_assert_eq!(done, Some(frame));
    }
}
