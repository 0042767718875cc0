//! Column extraction from TTree branches.

use rayon::prelude::*;

use crate::basket::Basket;
use crate::error::{Result, RootError};
use crate::rbuffer::BYTE_COUNT_MASK;
use crate::tree::{BranchInfo, LeafType};

/// Length of the header ROOT writes before each streamed `std::vector<T>`:
/// byte count (u32), class version (u16) and element count (u32).
const STL_VECTOR_HEADER_LEN: usize = 10;

/// A jagged (variable-length) column: flat values + per-entry offsets.
///
/// `offsets` has length `n_entries + 1`. Entry `i` has values
/// `flat[offsets[i]..offsets[i+1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JaggedCol {
    /// Flat array of all values across all entries.
    pub flat: Vec<f64>,
    /// Entry boundaries: `offsets.len() == n_entries + 1`.
    pub offsets: Vec<usize>,
}

impl JaggedCol {
    /// Build from per-entry rows.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut flat = Vec::new();
        let mut offsets = vec![0];
        for row in rows {
            flat.extend_from_slice(row.as_ref());
            offsets.push(flat.len());
        }
        Self { flat, offsets }
    }

    /// Values of entry `row`.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.flat[self.offsets[row]..self.offsets[row + 1]]
    }

    /// Iterate over entries.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.offsets.windows(2).map(|w| &self.flat[w[0]..w[1]])
    }

    /// Number of entries.
    pub fn n_entries(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

/// Reader for one branch of a tree.
pub struct BranchReader<'a> {
    file_data: &'a [u8],
    branch: &'a BranchInfo,
    is_large: bool,
}

impl<'a> BranchReader<'a> {
    /// Create a reader over the branch's baskets in `file_data`.
    pub fn new(file_data: &'a [u8], branch: &'a BranchInfo, is_large: bool) -> Self {
        Self { file_data, branch, is_large }
    }

    /// Read every entry as a jagged `f64` column.
    ///
    /// Baskets are inflated in parallel; entries are then decoded in order.
    pub fn as_jagged_f64(&self) -> Result<JaggedCol> {
        let baskets = self.read_all_baskets_par()?;
        let leaf_type = self.branch.leaf_type;
        let mut flat = Vec::new();
        let mut offsets = vec![0usize];

        for (i, basket) in baskets.iter().enumerate() {
            let n_entries = self.branch.basket_entries(i);
            match &basket.entry_offsets {
                Some(entry_offsets) => {
                    decode_variable_entries(&basket.data, entry_offsets, leaf_type, &mut flat, &mut offsets)
                        .map_err(|e| with_branch(e, &self.branch.name))?;
                }
                None => {
                    decode_fixed_entries(&basket.data, n_entries, leaf_type, &mut flat, &mut offsets)
                        .map_err(|e| with_branch(e, &self.branch.name))?;
                }
            }
        }

        // Entries held in the tree's in-memory basket are not read.
        let read = offsets.len() - 1;
        if read as u64 != self.branch.entries {
            return Err(RootError::Deserialization(format!(
                "branch '{}': {} of {} entries on disk",
                self.branch.name, read, self.branch.entries
            )));
        }
        Ok(JaggedCol { flat, offsets })
    }

    /// Read every entry as a flat `f64` vector (one or more values per entry).
    pub fn as_f64(&self) -> Result<Vec<f64>> {
        Ok(self.as_jagged_f64()?.flat)
    }

    fn read_all_baskets_par(&self) -> Result<Vec<Basket>> {
        (0..self.branch.n_baskets())
            .into_par_iter()
            .map(|i| {
                Basket::read(
                    self.file_data,
                    self.branch.basket_seek[i],
                    self.is_large,
                    self.branch.basket_entries(i),
                )
            })
            .collect()
    }
}

fn with_branch(e: RootError, branch: &str) -> RootError {
    match e {
        RootError::Deserialization(msg) => RootError::Deserialization(format!("branch '{branch}': {msg}")),
        RootError::TypeMismatch(msg) => RootError::TypeMismatch(format!("branch '{branch}': {msg}")),
        other => other,
    }
}

/// Entries delimited by an offset table: split members hold raw elements,
/// top-level STL vectors carry a streamer header before their elements.
fn decode_variable_entries(
    data: &[u8],
    entry_offsets: &[usize],
    leaf_type: LeafType,
    flat: &mut Vec<f64>,
    offsets: &mut Vec<usize>,
) -> Result<()> {
    let elem_size = leaf_type.byte_size();
    let chunks: Vec<&[u8]> = entry_offsets
        .windows(2)
        .map(|w| data.get(w[0]..w[1]))
        .collect::<Option<_>>()
        .ok_or_else(|| RootError::Deserialization("entry offsets exceed basket data".into()))?;

    let streamed = chunks.iter().any(|c| c.len() % elem_size != 0)
        || chunks.iter().find(|c| !c.is_empty()).is_some_and(|c| stl_vector_body(c, elem_size).is_some());

    for chunk in chunks {
        let body = if streamed {
            stl_vector_body(chunk, elem_size).ok_or_else(|| {
                RootError::Deserialization(format!(
                    "malformed std::vector entry of {} bytes",
                    chunk.len()
                ))
            })?
        } else {
            chunk
        };
        flat.extend(body.chunks_exact(elem_size).map(|b| decode_one_f64(b, leaf_type)));
        offsets.push(flat.len());
    }
    Ok(())
}

/// Fixed-size entries: the data splits evenly into `n_entries` rows.
fn decode_fixed_entries(
    data: &[u8],
    n_entries: usize,
    leaf_type: LeafType,
    flat: &mut Vec<f64>,
    offsets: &mut Vec<usize>,
) -> Result<()> {
    if n_entries == 0 {
        return Ok(());
    }
    let elem_size = leaf_type.byte_size();
    let n_values = data.len() / elem_size;
    if data.len() % elem_size != 0 || n_values % n_entries != 0 {
        return Err(RootError::TypeMismatch(format!(
            "{} bytes do not split into {n_entries} entries of {leaf_type:?}",
            data.len()
        )));
    }
    let per_entry = n_values / n_entries;
    flat.extend(data.chunks_exact(elem_size).map(|b| decode_one_f64(b, leaf_type)));
    let base = offsets.last().copied().unwrap_or(0);
    offsets.extend((1..=n_entries).map(|i| base + i * per_entry));
    Ok(())
}

/// Element bytes of one ROOT-streamed `std::vector<T>` entry, if the header checks out.
fn stl_vector_body(chunk: &[u8], elem_size: usize) -> Option<&[u8]> {
    let header = chunk.get(..STL_VECTOR_HEADER_LEN)?;
    let raw = u32::from_be_bytes(header[0..4].try_into().ok()?);
    if raw & BYTE_COUNT_MASK == 0 || (raw & !BYTE_COUNT_MASK) as usize != chunk.len() - 4 {
        return None;
    }
    let n = u32::from_be_bytes(header[6..10].try_into().ok()?) as usize;
    let body = &chunk[STL_VECTOR_HEADER_LEN..];
    (n.checked_mul(elem_size)? == body.len()).then_some(body)
}

fn decode_one_f64(b: &[u8], leaf_type: LeafType) -> f64 {
    let mut buf = [0u8; 8];
    buf[..b.len()].copy_from_slice(b);
    match leaf_type {
        LeafType::F64 => f64::from_be_bytes(buf),
        LeafType::F32 => f32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
        LeafType::I32 => i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
        LeafType::U32 => u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64,
        LeafType::I64 => i64::from_be_bytes(buf) as f64,
        LeafType::U64 => u64::from_be_bytes(buf) as f64,
        LeafType::I16 => i16::from_be_bytes([buf[0], buf[1]]) as f64,
        LeafType::I8 => buf[0] as i8 as f64,
        LeafType::Bool => f64::from(u8::from(buf[0] != 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be_f32s(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn streamed(values: &[f32]) -> Vec<u8> {
        let mut out = (BYTE_COUNT_MASK | (6 + 4 * values.len() as u32)).to_be_bytes().to_vec();
        out.extend_from_slice(&9u16.to_be_bytes());
        out.extend_from_slice(&(values.len() as u32).to_be_bytes());
        out.extend(be_f32s(values));
        out
    }

    #[test]
    fn raw_split_member_entries() {
        let data = be_f32s(&[1.0, 2.0, 3.0]);
        let (mut flat, mut offsets) = (Vec::new(), vec![0]);
        decode_variable_entries(&data, &[0, 8, 8, 12], LeafType::F32, &mut flat, &mut offsets).unwrap();
        assert_eq!(flat, vec![1.0, 2.0, 3.0]);
        assert_eq!(offsets, vec![0, 2, 2, 3]);
    }

    #[test]
    fn streamed_vector_entries() {
        let mut data = streamed(&[0.5, 0.25]);
        let split = data.len();
        data.extend(streamed(&[]));
        let (mut flat, mut offsets) = (Vec::new(), vec![0]);
        decode_variable_entries(&data, &[0, split, data.len()], LeafType::F32, &mut flat, &mut offsets)
            .unwrap();
        assert_eq!(flat, vec![0.5, 0.25]);
        assert_eq!(offsets, vec![0, 2, 2]);
    }

    #[test]
    fn streamed_header_with_wrong_count_is_rejected() {
        let mut chunk = streamed(&[1.0, 2.0]);
        chunk[9] = 3;
        assert!(stl_vector_body(&chunk, 4).is_none());
    }

    #[test]
    fn fixed_entries_continue_offsets() {
        let data: Vec<u8> = [1.0f64, 2.0, 3.0, 4.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        let (mut flat, mut offsets) = (vec![9.0], vec![0, 1]);
        decode_fixed_entries(&data, 2, LeafType::F64, &mut flat, &mut offsets).unwrap();
        assert_eq!(offsets, vec![0, 1, 3, 5]);
        assert_eq!(flat.len(), 5);
        assert!(decode_fixed_entries(&data, 3, LeafType::F64, &mut flat, &mut offsets).is_err());
    }

    #[test]
    fn short_baskets_are_an_error() {
        use crate::RootFile;
        use crate::testing::{BranchSpec, write_tree_file};

        let data = write_tree_file("events", &[BranchSpec::scalar_f64("x", 3)]);
        let file = RootFile::from_bytes(data, "short.root".into()).unwrap();
        let mut tree = file.get_tree("events").unwrap();
        assert_eq!(file.branch_data_jagged(&tree, "x").unwrap().n_entries(), 3);

        let branch = tree.branches.iter_mut().find(|b| b.name == "x").unwrap();
        branch.entries = 5;
        let err = BranchReader::new(file.file_data(), branch, file.is_large()).as_jagged_f64().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("branch 'x': 3 of 5 entries on disk"), "{msg}");
    }

    #[test]
    fn jagged_rows() {
        let col = JaggedCol::from_rows([vec![1.0], vec![], vec![2.0, 3.0]]);
        assert_eq!(col.n_entries(), 3);
        assert_eq!(col.row(2), &[2.0, 3.0]);
        assert_eq!(col.rows().map(<[f64]>::len).collect::<Vec<_>>(), vec![1, 0, 2]);
    }
}
