//! LSB-first bit cursors for packing fixed-width fields into bytes.
//!
//! Fields are laid out little-endian: the lowest bit of a field lands on the
//! lowest free bit of the current byte, and a field that does not fit in the
//! remainder of a byte continues at bit 0 of the next one.

/// Writes fixed-width fields into a byte buffer, lowest bit first.
///
/// The writer ORs bits into the buffer, so the target must start zeroed.
///
/// # Example
///
/// ```
/// use sbus_proto::BitWriter;
///
/// let mut buf = [0u8; 3];
/// let mut writer = BitWriter::new(&mut buf);
/// writer.write(0x7FF, 11);
/// writer.write(0x001, 11);
/// assert_eq!(buf, [0xFF, 0x0F, 0x00]);
/// ```
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    bit: usize,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at bit 0 of `buf`.
    #[inline]
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, bit: 0 }
    }

    /// Append the low `width` bits of `value`; higher bits are discarded.
    ///
    /// # Panics
    ///
    /// Panics if `width > 16` or the field runs past the end of the buffer.
    pub fn write(&mut self, value: u16, width: u32) {
        assert!(width <= 16, "field width exceeds 16 bits");

        let mut value = u32::from(value) & field_mask(width);
        let mut remaining = width as usize;

        while remaining > 0 {
            let index = self.bit / 8;
            let offset = self.bit % 8;
            let take = (8 - offset).min(remaining);

            let chunk = (value & field_mask(take as u32)) as u8;
            self.buf[index] |= chunk << offset;

            value >>= take;
            remaining -= take;
            self.bit += take;
        }
    }

    /// Number of bits written so far.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.bit
    }
}

/// Reads fixed-width fields from a byte buffer, lowest bit first.
///
/// The exact inverse of [`BitWriter`].
pub struct BitReader<'a> {
    buf: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at bit 0 of `buf`.
    #[inline]
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, bit: 0 }
    }

    /// Read the next `width` bits as an unsigned value.
    ///
    /// # Panics
    ///
    /// Panics if `width > 16` or the field runs past the end of the buffer.
    pub fn read(&mut self, width: u32) -> u16 {
        assert!(width <= 16, "field width exceeds 16 bits");

        let mut value: u32 = 0;
        let mut filled = 0usize;

        while filled < width as usize {
            let index = self.bit / 8;
            let offset = self.bit % 8;
            let take = (8 - offset).min(width as usize - filled);

            let chunk = u32::from(self.buf[index] >> offset) & field_mask(take as u32);
            value |= chunk << filled;

            filled += take;
            self.bit += take;
        }

        value as u16
    }

    /// Number of bits consumed so far.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.bit
    }
}

#[inline]
const fn field_mask(width: u32) -> u32 {
    (1u32 << width) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_field_within_one_byte() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write(0b101, 3);
        writer.write(0b11, 2);
        assert_eq!(writer.position(), 5);
        assert_eq!(buf[0], 0b0001_1101);
    }

    #[test]
    fn test_write_field_spanning_three_bytes() {
        // 6 bits of padding push an 11-bit field across bytes 0, 1 and 2
        let mut buf = [0u8; 3];
        let mut writer = BitWriter::new(&mut buf);
        writer.write(0, 6);
        writer.write(0x7FF, 11);
        assert_eq!(buf, [0xC0, 0xFF, 0x01]);
    }

    #[test]
    fn test_write_discards_high_bits() {
        let mut buf = [0u8; 2];
        let mut writer = BitWriter::new(&mut buf);
        writer.write(0x0800 | 0x0005, 11);
        assert_eq!(buf, [0x05, 0x00]);
    }

    #[test]
    fn test_read_matches_write() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);
        writer.write(1234, 11);
        writer.write(42, 11);
        writer.write(0x3FF, 10);

        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.read(11), 1234);
        assert_eq!(reader.read(11), 42);
        assert_eq!(reader.read(10), 0x3FF);
        assert_eq!(reader.position(), 32);
    }

    #[test]
    #[should_panic]
    fn test_write_past_end_panics() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write(0x7FF, 11);
    }
}
