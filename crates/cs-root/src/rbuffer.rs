//! Big-endian cursor over streamed ROOT bytes.

use crate::error::{Result, RootError};

/// `kByteCountMask`: set on the leading u32 of a streamed object carrying a byte count.
pub const BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// Read cursor over a byte slice.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($name:ident, $ty:ty, $n:expr) => {
        #[doc = concat!("Read a big-endian `", stringify!($ty), "`.")]
        pub fn $name(&mut self) -> Result<$ty> {
            let b = self.read_bytes($n)?;
            let mut arr = [0u8; $n];
            arr.copy_from_slice(b);
            Ok(<$ty>::from_be_bytes(arr))
        }
    };
}

impl<'a> RBuffer<'a> {
    /// Cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor at an absolute position.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to `pos`.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    read_be!(read_u16, u16, 2);
    read_be!(read_i16, i16, 2);
    read_be!(read_u32, u32, 4);
    read_be!(read_i32, i32, 4);
    read_be!(read_u64, u64, 8);
    read_be!(read_i64, i64, 8);
    read_be!(read_f64, f64, 8);

    /// Read a `TString`: one length byte (or 255 followed by a u32 length) and the bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = match self.read_u8()? {
            255 => self.read_u32()? as usize,
            n => n as usize,
        };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated class name as written after `kNewClassTag`.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(RootError::Deserialization(format!(
                "unterminated class name at offset {}",
                self.pos
            )));
        };
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read a streamer version header.
    ///
    /// Returns the class version and, when a byte count is present, the
    /// absolute position where the object ends.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw & BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !BYTE_COUNT_MASK) as usize;
            let version = self.read_u16()?;
            Ok((version, Some(start + 4 + byte_count)))
        } else {
            // Plain u16 version, rewind over the two bytes we over-read.
            self.pos = start + 2;
            Ok(((raw >> 16) as u16, None))
        }
    }

    /// Skip a versioned object using its byte count.
    pub fn skip_versioned(&mut self, what: &str) -> Result<()> {
        let (_ver, end) = self.read_version()?;
        let end = end.ok_or_else(|| {
            RootError::Deserialization(format!("{what} has no byte count, cannot skip"))
        })?;
        self.set_pos(end);
        Ok(())
    }

    /// Read a `TObject` header (version, fUniqueID, fBits).
    pub fn read_tobject(&mut self) -> Result<()> {
        let _ver = self.read_u16()?;
        let _unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & 0x0000_0010 != 0 {
            // kIsReferenced: process id follows
            self.skip(2)?;
        }
        Ok(())
    }

    /// Read a `TNamed`, returning `(name, title)`.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let (_ver, _end) = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        Ok((name, title))
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.checked_add(n).is_none_or(|end| end > self.data.len()) {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0102_0304u32.to_be_bytes());
        data.extend_from_slice(&(-7i16).to_be_bytes());
        data.extend_from_slice(&std::f64::consts::E.to_be_bytes());
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_i16().unwrap(), -7);
        assert_eq!(r.read_f64().unwrap(), std::f64::consts::E);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn long_tstring() {
        let mut data = vec![255];
        data.extend_from_slice(&300u32.to_be_bytes());
        data.extend(std::iter::repeat_n(b'x', 300));
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap().len(), 300);
    }

    #[test]
    fn cstring_consumes_terminator() {
        let data = b"TBranchElement\0\x07";
        let mut r = RBuffer::new(data);
        assert_eq!(r.read_cstring().unwrap(), "TBranchElement");
        assert_eq!(r.read_u8().unwrap(), 7);
    }

    #[test]
    fn cstring_without_terminator_fails() {
        let mut r = RBuffer::new(b"TLeaf");
        assert!(r.read_cstring().is_err());
    }

    #[test]
    fn version_with_and_without_byte_count() {
        let mut data = Vec::new();
        data.extend_from_slice(&(BYTE_COUNT_MASK | 6).to_be_bytes());
        data.extend_from_slice(&13u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&5u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 2]);
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_version().unwrap(), (13, Some(10)));
        r.set_pos(10);
        assert_eq!(r.read_version().unwrap(), (5, None));
        assert_eq!(r.pos(), 12);
    }

    #[test]
    fn underflow_is_reported() {
        let mut r = RBuffer::new(&[1, 2]);
        match r.read_u32() {
            Err(RootError::BufferUnderflow { need: 4, have: 2, .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
