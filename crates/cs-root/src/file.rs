//! TFile header parsing and the top-level reader interface.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::branch_reader::{BranchReader, JaggedCol};
use crate::directory::Directory;
use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;
use crate::streamer::read_ttree;
use crate::tree::Tree;

const ROOT_MAGIC: &[u8; 4] = b"root";

/// File bytes: memory-mapped from disk or owned (tests, in-memory files).
enum Backing {
    Owned(Vec<u8>),
    Mmap(memmap2::Mmap),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Owned(v) => v,
            Backing::Mmap(m) => m,
        }
    }
}

/// Location of the top-level key list.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    is_large: bool,
    seek_keys: u64,
}

/// A ROOT file opened for reading trees.
pub struct RootFile {
    data: Backing,
    header: FileHeader,
    path: PathBuf,
}

impl RootFile {
    /// Open and memory-map a file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the mapping is read-only; input files are not modified while open.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_backing(Backing::Mmap(mmap), path)
    }

    /// Parse a file held in memory. `path` is only used in messages.
    pub fn from_bytes(data: Vec<u8>, path: PathBuf) -> Result<Self> {
        Self::from_backing(Backing::Owned(data), path)
    }

    fn from_backing(data: Backing, path: PathBuf) -> Result<Self> {
        if data.len() < 64 || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = parse_header(&data)?;
        log::debug!("opened {} ({} bytes, large={})", path.display(), data.len(), header.is_large);
        Ok(Self { data, header, path })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file bytes.
    pub fn file_data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.header.is_large
    }

    /// Names and classes of the top-level keys.
    pub fn list_keys(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .top_directory()?
            .keys()
            .iter()
            .map(|k| (k.name.clone(), k.class_name.clone()))
            .collect())
    }

    /// Read the metadata of a top-level TTree.
    pub fn get_tree(&self, name: &str) -> Result<Tree> {
        let dir = self.top_directory()?;
        let key = dir.find_key(name).ok_or_else(|| RootError::TreeNotFound(name.to_string()))?;
        if key.class_name != "TTree" {
            return Err(RootError::TreeNotFound(format!("'{name}' is a {}", key.class_name)));
        }
        let payload = key.read_payload(&self.data)?;
        read_ttree(&payload, key.key_len as usize)
    }

    /// Reader for one branch of `tree`.
    pub fn branch_reader<'a>(&'a self, tree: &'a Tree, branch: &str) -> Result<BranchReader<'a>> {
        let info = tree
            .find_branch(branch)
            .ok_or_else(|| RootError::BranchNotFound(branch.to_string()))?;
        Ok(BranchReader::new(&self.data, info, self.header.is_large))
    }

    /// Read a branch as a jagged column.
    pub fn branch_data_jagged(&self, tree: &Tree, branch: &str) -> Result<JaggedCol> {
        self.branch_reader(tree, branch)?.as_jagged_f64()
    }

    fn top_directory(&self) -> Result<Directory> {
        if self.header.seek_keys == 0 {
            return Ok(Directory::default());
        }
        Directory::read_key_list(&self.data, self.header.seek_keys as usize, self.header.is_large)
    }
}

/// Parse the file header and the top directory record that follows the name record.
///
/// ```text
/// offset  size  field
///    0      4   magic "root"
///    4      4   fVersion (>= 1000000: 64-bit seeks)
///    8      4   fBEGIN
///   ...         fEND, fSeekFree, fNbytesFree, nfree (widths depend on fVersion)
///               fNbytesName
/// ```
/// The directory record lives at `fBEGIN + fNbytesName`.
fn parse_header(data: &[u8]) -> Result<FileHeader> {
    let mut r = RBuffer::at(data, 4);
    let version = r.read_u32()?;
    let is_large = version >= 1_000_000;
    let begin = r.read_u32()? as usize;
    r.skip(if is_large { 16 } else { 8 })?; // fEND, fSeekFree
    r.skip(8)?; // fNbytesFree, nfree
    let nbytes_name = r.read_u32()? as usize;

    let dir_offset = begin + nbytes_name;
    if dir_offset >= data.len() {
        return Err(RootError::Deserialization("directory record past end of file".into()));
    }
    let mut r = RBuffer::at(data, dir_offset);
    let dir_version = r.read_u16()?;
    r.skip(4 * 4)?; // fDatimeC, fDatimeM, fNbytesKeys, fNbytesName
    let seek_keys = if dir_version > 1000 {
        r.skip(16)?; // fSeekDir, fSeekParent
        r.read_u64()?
    } else {
        r.skip(8)?;
        r.read_u32()? as u64
    };
    Ok(FileHeader { is_large, seek_keys })
}
