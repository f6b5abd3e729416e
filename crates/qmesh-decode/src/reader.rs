//! Little-endian cursor over a tile buffer.

use crate::error::{DecodeError, DecodeResult};

/// Bounds-checked reader. Every read names the section it belongs to so
/// truncation errors point at the offending part of the tile.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take `len` bytes, failing with [`DecodeError::Truncated`].
    pub(crate) fn take(&mut self, len: usize, section: &'static str) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                section,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Take a block whose length was declared by the tile itself.
    ///
    /// Unlike [`Reader::take`] this reports [`DecodeError::SectionTooLong`],
    /// since the buffer is not short, the declaration is wrong.
    pub(crate) fn take_declared(
        &mut self,
        declared: usize,
        section: &'static str,
    ) -> DecodeResult<&'a [u8]> {
        if declared > self.remaining() {
            return Err(DecodeError::SectionTooLong {
                section,
                declared,
                available: self.remaining(),
            });
        }
        self.take(declared, section)
    }

    /// Skip forward to the next multiple of `alignment`.
    pub(crate) fn align(&mut self, alignment: usize, section: &'static str) -> DecodeResult<()> {
        let padding = (alignment - self.pos % alignment) % alignment;
        self.take(padding, section).map(|_| ())
    }

    pub(crate) fn read_u8(&mut self, section: &'static str) -> DecodeResult<u8> {
        Ok(self.take(1, section)?[0])
    }

    pub(crate) fn read_u16(&mut self, section: &'static str) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.array(section)?))
    }

    pub(crate) fn read_u32(&mut self, section: &'static str) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.array(section)?))
    }

    pub(crate) fn read_f32(&mut self, section: &'static str) -> DecodeResult<f32> {
        Ok(f32::from_le_bytes(self.array(section)?))
    }

    pub(crate) fn read_f64(&mut self, section: &'static str) -> DecodeResult<f64> {
        Ok(f64::from_le_bytes(self.array(section)?))
    }

    /// Read a `u32` element count and check that `count * element_size`
    /// bytes are actually present.
    pub(crate) fn read_count(
        &mut self,
        element_size: usize,
        section: &'static str,
    ) -> DecodeResult<usize> {
        let count = self.read_u32(section)? as usize;
        let declared = count.saturating_mul(element_size);
        if declared > self.remaining() {
            return Err(DecodeError::SectionTooLong {
                section,
                declared,
                available: self.remaining(),
            });
        }
        Ok(count)
    }

    fn array<const N: usize>(&mut self, section: &'static str) -> DecodeResult<[u8; N]> {
        let bytes = self.take(N, section)?;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u16("test").unwrap(), 0x1234);
        assert_eq!(reader.read_u32("test").unwrap(), 0x1234_5678);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_section() {
        let mut reader = Reader::new(&[1, 2, 3]);
        match reader.read_u32("vertex count") {
            Err(DecodeError::Truncated {
                section,
                needed,
                available,
            }) => {
                assert_eq!(section, "vertex count");
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_align_skips_padding() {
        let data = [0u8; 8];
        let mut reader = Reader::new(&data);
        reader.take(2, "test").unwrap();
        reader.align(4, "test").unwrap();
        assert_eq!(reader.position(), 4);
        reader.align(4, "test").unwrap();
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_declared_count_exceeding_buffer() {
        // Count of 100 u16 values with only 4 bytes following.
        let data = [100, 0, 0, 0, 1, 2, 3, 4];
        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_count(2, "west indices"),
            Err(DecodeError::SectionTooLong { declared: 200, .. })
        ));
    }
}
