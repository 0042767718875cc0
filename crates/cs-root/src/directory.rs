//! Directory key lists.

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Ordered list of keys stored in one directory.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list located at `seek_keys`.
    ///
    /// The list is itself prefixed by a key header, then a u32 count and the keys.
    pub fn read_key_list(file: &[u8], seek_keys: usize, is_large: bool) -> Result<Self> {
        let mut r = RBuffer::at(file, seek_keys);
        let _header = Key::read(&mut r, is_large)?;
        let n_keys = r.read_u32()? as usize;
        let keys = (0..n_keys).map(|_| Key::read(&mut r, is_large)).collect::<Result<Vec<_>>>()?;
        Ok(Directory { keys })
    }

    /// All keys in file order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The highest cycle of the key called `name`.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::encode_key;

    #[test]
    fn highest_cycle_wins() {
        let mut list_body = 2u32.to_be_bytes().to_vec();
        let k1 = encode_key("TTree", "events", 0, &[]);
        let mut k2 = encode_key("TTree", "events", 0, &[]);
        // Bump the cycle of the second key (offset 16 in the header).
        k2[16..18].copy_from_slice(&5u16.to_be_bytes());
        list_body.extend(k1);
        list_body.extend(k2);
        let file = encode_key("TList", "", 0, &list_body);

        let dir = Directory::read_key_list(&file, 0, false).unwrap();
        assert_eq!(dir.keys().len(), 2);
        assert_eq!(dir.find_key("events").unwrap().cycle, 5);
        assert!(dir.find_key("missing").is_none());
    }
}
