//! Basket reading: one compressed block of consecutive entries of a branch.

use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// An inflated basket.
#[derive(Debug, Clone)]
pub struct Basket {
    /// Entry data, without the trailing offset table.
    pub data: Vec<u8>,
    /// Byte range boundaries of each entry within `data` (`n_entries + 1` values),
    /// when the basket carries an entry-offset table.
    pub entry_offsets: Option<Vec<usize>>,
}

impl Basket {
    /// Read the basket whose key sits at `seek`.
    ///
    /// The key header is followed by the `TBasket` fields; `fLast` marks the end of
    /// the entry data (counted from the key start). Variable-size branches append
    /// `[count: i32][offset: i32; n_entries][0]` after it, offsets also counted from
    /// the key start.
    pub fn read(file: &[u8], seek: u64, is_large: bool, n_entries: usize) -> Result<Self> {
        let pos = seek as usize;
        if pos >= file.len() {
            return Err(RootError::BufferUnderflow { offset: pos, need: 1, have: 0 });
        }
        let mut r = RBuffer::at(file, pos);
        let key = Key::read(&mut r, is_large)?;
        let _version = r.read_u16()?;
        let _buffer_size = r.read_i32()?;
        let _nev_buf_size = r.read_i32()?;
        let _nev_buf = r.read_i32()?;
        let last = r.read_i32()?.max(0) as usize;
        let _flag = r.read_u8()?;

        let key_len = key.key_len as usize;
        let payload = key.read_payload(file)?;
        let border = last.checked_sub(key_len).filter(|b| *b <= payload.len()).ok_or_else(|| {
            RootError::Deserialization(format!(
                "basket at {pos}: fLast {last} outside payload of {} bytes",
                payload.len()
            ))
        })?;

        let entry_offsets = if payload.len() > border {
            Some(parse_entry_offsets(&payload[border..], key_len, border, n_entries)?)
        } else {
            None
        };
        let mut data = payload;
        data.truncate(border);
        Ok(Basket { data, entry_offsets })
    }
}

fn parse_entry_offsets(
    tail: &[u8],
    key_len: usize,
    border: usize,
    n_entries: usize,
) -> Result<Vec<usize>> {
    let mut r = RBuffer::new(tail);
    let _count = r.read_i32()?;
    let mut offsets = Vec::with_capacity(n_entries + 1);
    for _ in 0..n_entries {
        let raw = r.read_i32()?.max(0) as usize;
        let off = raw.checked_sub(key_len).filter(|o| *o <= border).ok_or_else(|| {
            RootError::Deserialization(format!("entry offset {raw} outside basket data"))
        })?;
        offsets.push(off);
    }
    offsets.push(border);
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(RootError::Deserialization("entry offsets are not monotonic".into()));
    }
    Ok(offsets)
}
