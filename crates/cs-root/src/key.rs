//! TKey records: the headers that locate every object in a ROOT file.

use crate::decompress::decompress;
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;

/// A parsed TKey header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Bytes on disk, key header included.
    pub n_bytes: u32,
    /// Key class version (> 1000 means 64-bit seeks).
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header.
    pub key_len: u16,
    /// Cycle number.
    pub cycle: u16,
    /// Absolute file position of this key.
    pub seek_key: u64,
    /// Class name of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
}

impl Key {
    /// Parse a key at the cursor.
    pub fn read(r: &mut RBuffer, file_is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let seek_key = if version > 1000 || file_is_large {
            let seek = r.read_u64()?;
            let _seek_pdir = r.read_u64()?;
            seek
        } else {
            let seek = r.read_u32()? as u64;
            let _seek_pdir = r.read_u32()?;
            seek
        };

        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let _title = r.read_string()?;

        Ok(Key { n_bytes, version, obj_len, key_len, cycle, seek_key, class_name, name })
    }

    /// Whether the object bytes are stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len as usize != (self.n_bytes as usize).saturating_sub(self.key_len as usize)
    }

    /// Read and, if needed, inflate the object bytes that follow this key in `file`.
    pub fn read_payload(&self, file: &[u8]) -> Result<Vec<u8>> {
        let start = self.seek_key as usize;
        let end = start + self.n_bytes as usize;
        if end > file.len() || (self.key_len as u32) > self.n_bytes {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: self.n_bytes as usize,
                have: file.len().saturating_sub(start),
            });
        }
        let body = &file[start + self.key_len as usize..end];
        if self.is_compressed() {
            decompress(body, self.obj_len as usize)
        } else {
            Ok(body.to_vec())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Serialize a small-file key header (32-bit seeks) followed by `body`.
    pub(crate) fn encode_key(class_name: &str, name: &str, seek: u32, body: &[u8]) -> Vec<u8> {
        let key_len = (4 + 2 + 4 + 4 + 2 + 2 + 4 + 4)
            + (1 + class_name.len())
            + (1 + name.len())
            + 1;
        let mut out = Vec::new();
        out.extend_from_slice(&((key_len + body.len()) as u32).to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(key_len as u16).to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&seek.to_be_bytes());
        out.extend_from_slice(&100u32.to_be_bytes());
        for s in [class_name, name, ""] {
            out.push(s.len() as u8);
            out.extend_from_slice(s.as_bytes());
        }
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn parse_small_key_and_payload() {
        let mut file = vec![0u8; 16];
        file.extend(encode_key("TTree", "events", 16, b"payload"));
        let mut r = RBuffer::at(&file, 16);
        let key = Key::read(&mut r, false).unwrap();
        assert_eq!(key.class_name, "TTree");
        assert_eq!(key.name, "events");
        assert_eq!(key.seek_key, 16);
        assert!(!key.is_compressed());
        assert_eq!(key.read_payload(&file).unwrap(), b"payload");
    }

    #[test]
    fn truncated_payload_errors() {
        let mut file = encode_key("TTree", "t", 0, b"0123456789");
        file.truncate(file.len() - 3);
        let key = Key::read(&mut RBuffer::new(&file), false).unwrap();
        assert!(key.read_payload(&file).is_err());
    }
}
