use std::{
    fmt,
    io::{self, Cursor},
};

use byteorder::{BigEndian, ReadBytesExt};

use crate::Result;

type Endian = BigEndian;

/// A value read from the class file, together with the offset of its first byte.
#[derive(Clone, Copy, PartialEq)]
pub struct Scalar<T> {
    pub value: T,
    pub offset: usize,
}

pub type U1 = Scalar<u8>;
pub type U2 = Scalar<u16>;
pub type U4 = Scalar<u32>;

impl<T> Scalar<T> {
    pub fn new(value: T, offset: usize) -> Self {
        Self { value, offset }
    }

    /// Number of bytes the value occupied in the class file.
    pub fn width(&self) -> usize {
        std::mem::size_of::<T>()
    }

    /// Offset of the first byte after the value.
    pub fn end(&self) -> usize {
        self.offset + self.width()
    }
}

impl<T: fmt::Debug> fmt::Debug for Scalar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.value, self.offset)
    }
}

/// Forward-only reader over a borrowed byte buffer.
///
/// Offsets handed out are absolute: a cursor over a sub-slice of the class file
/// is created with the offset of that sub-slice as its base.
pub struct ByteCursor<'a> {
    r: Cursor<&'a [u8]>,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    pub(crate) fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self {
            r: Cursor::new(buf),
            base,
        }
    }

    /// Absolute offset of the next byte.
    pub fn offset(&self) -> usize {
        self.base + self.position()
    }

    /// Offset of the next byte relative to the start of this cursor's buffer.
    pub fn position(&self) -> usize {
        self.r.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.r.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u1(&mut self) -> Result<U1> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_u8()?, offset))
    }

    pub fn read_u2(&mut self) -> Result<U2> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_u16::<Endian>()?, offset))
    }

    pub fn read_u4(&mut self) -> Result<U4> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_u32::<Endian>()?, offset))
    }

    pub fn read_i4(&mut self) -> Result<Scalar<i32>> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_i32::<Endian>()?, offset))
    }

    pub fn read_f4(&mut self) -> Result<Scalar<f32>> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_f32::<Endian>()?, offset))
    }

    pub fn read_i8(&mut self) -> Result<Scalar<i64>> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_i64::<Endian>()?, offset))
    }

    pub fn read_f8(&mut self) -> Result<Scalar<f64>> {
        let offset = self.offset();
        Ok(Scalar::new(self.r.read_f64::<Endian>()?, offset))
    }

    /// Borrows the next `len` bytes of the buffer and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "needed {len} bytes at offset {}, only {} left",
                    self.offset(),
                    self.remaining()
                ),
            )
            .into());
        }

        let buf: &'a [u8] = *self.r.get_ref();
        let start = self.position();
        self.r.set_position((start + len) as u64);

        Ok(&buf[start..start + len])
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }
}

#[cfg(test)]
mod byte_cursor_tests {
    use super::*;

    #[test]
    fn it_should_tag_values_with_their_offsets() {
        let mut cursor = ByteCursor::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);

        let a = cursor.read_u1().unwrap();
        let b = cursor.read_u2().unwrap();
        let c = cursor.read_u4().unwrap();

        assert_eq!((a.value, a.offset, a.width()), (0x01, 0, 1));
        assert_eq!((b.value, b.offset, b.width()), (0x0203, 1, 2));
        assert_eq!((c.value, c.offset, c.width()), (0x04050607, 3, 4));
        assert_eq!(a.end(), b.offset);
        assert_eq!(b.end(), c.offset);
        assert!(cursor.is_empty());
    }

    #[test]
    fn it_should_report_absolute_offsets_for_sub_slices() {
        let mut cursor = ByteCursor::with_base(&[0xAA, 0xBB], 100);

        assert_eq!(cursor.read_u1().unwrap().offset, 100);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.offset(), 101);
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(ByteCursor::new(&[0x01, 0x02, 0x03]).read_u4().is_err());

        let mut cursor = ByteCursor::new(&[0x01, 0x02, 0x03]);
        assert!(cursor.read_bytes(4).is_err());
        assert_eq!(cursor.read_bytes(3).unwrap(), &[0x01, 0x02, 0x03]);
    }
}
