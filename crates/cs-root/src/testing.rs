//! Writer for small synthetic ROOT files.
//!
//! Produces uncompressed files holding one TTree with the three branch layouts
//! calostat reads: plain scalar `TBranch`, split members of a collection and
//! ROOT-streamed `vector<float>`. Only enabled for tests (`test-util`).

use std::collections::HashMap;

use crate::rbuffer::BYTE_COUNT_MASK;
use crate::streamer::{CLASS_MASK, MAP_OFFSET, NEW_CLASS_TAG};

const FILE_BEGIN: usize = 100;
const NAME_RECORD_LEN: usize = 32;
const MAX_BASKETS: usize = 4;
const SMALL_KEY_FIXED_LEN: usize = 4 + 2 + 4 + 4 + 2 + 2 + 4 + 4;
const BASKET_HEADER_LEN: usize = 2 + 4 + 4 + 4 + 4 + 1;

/// Storage layout of a test branch.
#[derive(Debug, Clone)]
pub enum BranchKind {
    /// One `double` per entry in a plain `TBranch`.
    ScalarF64,
    /// A float member split out of a collection branch called `parent`.
    SplitMember {
        /// Name of the collection branch.
        parent: String,
    },
    /// A top-level `vector<float>` with a ROOT streamer header per entry.
    StlVectorF32,
}

/// A branch and its per-entry values.
#[derive(Debug, Clone)]
pub struct BranchSpec {
    /// Full branch name.
    pub name: String,
    /// On-disk layout.
    pub kind: BranchKind,
    /// Values of each entry.
    pub rows: Vec<Vec<f64>>,
}

impl BranchSpec {
    /// Scalar double branch with `n` entries counting up from zero.
    pub fn scalar_f64(name: &str, n: usize) -> Self {
        Self::with_rows(name, BranchKind::ScalarF64, (0..n).map(|i| vec![i as f64]).collect())
    }

    /// Split float member with `n` empty entries.
    pub fn split_member(parent: &str, name: &str, n: usize) -> Self {
        Self::with_rows(name, BranchKind::SplitMember { parent: parent.into() }, vec![Vec::new(); n])
    }

    /// Streamed `vector<float>` with `n` empty entries.
    pub fn stl_vector_f32(name: &str, n: usize) -> Self {
        Self::with_rows(name, BranchKind::StlVectorF32, vec![Vec::new(); n])
    }

    /// Branch with explicit rows.
    pub fn with_rows(name: &str, kind: BranchKind, rows: Vec<Vec<f64>>) -> Self {
        Self { name: name.into(), kind, rows }
    }

    fn has_offsets(&self) -> bool {
        !matches!(self.kind, BranchKind::ScalarF64)
    }

    fn encode_row(&self, row: &[f64]) -> Vec<u8> {
        let mut out = Vec::new();
        match self.kind {
            BranchKind::ScalarF64 => {
                for v in row {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
            BranchKind::SplitMember { .. } => {
                for v in row {
                    out.extend_from_slice(&(*v as f32).to_be_bytes());
                }
            }
            BranchKind::StlVectorF32 => {
                let byte_count = 2 + 4 + 4 * row.len() as u32;
                out.extend_from_slice(&(BYTE_COUNT_MASK | byte_count).to_be_bytes());
                out.extend_from_slice(&9u16.to_be_bytes());
                out.extend_from_slice(&(row.len() as u32).to_be_bytes());
                for v in row {
                    out.extend_from_slice(&(*v as f32).to_be_bytes());
                }
            }
        }
        out
    }
}

/// Streamer writer mirroring the reader in [`crate::streamer`].
pub struct StreamWriter {
    buf: Vec<u8>,
    key_len: usize,
    classes: HashMap<String, u32>,
}

impl StreamWriter {
    /// Writer for a payload that will sit behind a key header of `key_len` bytes.
    pub fn new(key_len: usize) -> Self {
        Self { buf: Vec::new(), key_len, classes: HashMap::new() }
    }

    /// Finished payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn string(&mut self, s: &str) {
        self.buf.push(s.len() as u8);
        self.put(s.as_bytes());
    }

    fn begin(&mut self) -> usize {
        let at = self.buf.len();
        self.put(&[0; 4]);
        at
    }

    fn end(&mut self, at: usize) {
        let count = (self.buf.len() - at - 4) as u32 | BYTE_COUNT_MASK;
        self.buf[at..at + 4].copy_from_slice(&count.to_be_bytes());
    }

    fn versioned(&mut self, version: u16) -> usize {
        let at = self.begin();
        self.put(&version.to_be_bytes());
        at
    }

    fn tobject(&mut self) {
        self.put(&1u16.to_be_bytes());
        self.put(&0u32.to_be_bytes());
        self.put(&0x0300_0000u32.to_be_bytes());
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        let at = self.versioned(1);
        self.tobject();
        self.string(name);
        self.string(title);
        self.end(at);
    }

    fn opaque(&mut self, version: u16, len: usize) {
        let at = self.versioned(version);
        self.put(&vec![0; len]);
        self.end(at);
    }

    fn object(&mut self, class: &str) -> usize {
        let at = self.begin();
        let tag_pos = self.buf.len();
        if let Some(&offset) = self.classes.get(class) {
            self.put(&(CLASS_MASK | offset).to_be_bytes());
        } else {
            self.put(&NEW_CLASS_TAG.to_be_bytes());
            self.put(class.as_bytes());
            self.buf.push(0);
            let offset = (tag_pos + self.key_len + MAP_OFFSET) as u32;
            self.classes.insert(class.to_string(), offset);
        }
        at
    }

    fn objarray(&mut self, count: i32, body: impl FnOnce(&mut Self)) {
        let at = self.versioned(3);
        self.tobject();
        self.string("");
        self.put(&count.to_be_bytes());
        self.put(&0i32.to_be_bytes());
        body(self);
        self.end(at);
    }

    fn leaf(&mut self, class: &str, name: &str, data_type: i32) {
        let obj = self.object(class);
        let outer = self.versioned(1);
        let base = self.versioned(2);
        self.tnamed(name, name);
        self.put(&1i32.to_be_bytes());
        self.put(&4i32.to_be_bytes());
        self.put(&0i32.to_be_bytes());
        self.put(&[0, 0]);
        self.put(&0u32.to_be_bytes());
        self.end(base);
        if class == "TLeafElement" {
            self.put(&(-1i32).to_be_bytes());
            self.put(&data_type.to_be_bytes());
        } else {
            self.put(&[0; 8]);
        }
        self.end(outer);
        self.end(obj);
    }

    /// Write an inline TObjArray of leaves given as `(class, name, EDataType)`.
    pub fn leaf_array(&mut self, leaves: &[(&str, &str, i32)]) {
        self.objarray(leaves.len() as i32, |w| {
            for (class, name, data_type) in leaves {
                w.leaf(class, name, *data_type);
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn tbranch(
        &mut self,
        name: &str,
        entries: u64,
        offsets: bool,
        basket: Option<(u64, u32)>,
        leaf: (&str, i32),
        n_children: i32,
        children: impl FnOnce(&mut Self),
    ) {
        let at = self.versioned(13);
        self.tnamed(name, name);
        self.opaque(2, 4);
        self.put(&101i32.to_be_bytes());
        self.put(&32000i32.to_be_bytes());
        self.put(&(if offsets { 1000i32 } else { 0 }).to_be_bytes());
        self.put(&(basket.is_some() as i32).to_be_bytes());
        self.put(&(entries as i64).to_be_bytes());
        self.opaque(1, 1);
        self.put(&0i32.to_be_bytes());
        self.put(&(MAX_BASKETS as i32).to_be_bytes());
        self.put(&99i32.to_be_bytes());
        self.put(&(entries as i64).to_be_bytes());
        self.put(&0i64.to_be_bytes());
        self.put(&0i64.to_be_bytes());
        self.put(&0i64.to_be_bytes());

        self.objarray(n_children, children);
        self.objarray(1, |w| w.leaf(leaf.0, name, leaf.1));
        self.objarray(0, |_| {});

        let (seek, n_bytes) = basket.unwrap_or((0, 0));
        self.buf.push(1);
        for i in 0..MAX_BASKETS {
            let v = if i == 0 { n_bytes as i32 } else { 0 };
            self.put(&v.to_be_bytes());
        }
        self.buf.push(1);
        for i in 0..MAX_BASKETS {
            let v = if i == 1 && basket.is_some() { entries as i64 } else { 0 };
            self.put(&v.to_be_bytes());
        }
        self.buf.push(1);
        for i in 0..MAX_BASKETS {
            let v = if i == 0 { seek as i64 } else { 0 };
            self.put(&v.to_be_bytes());
        }
        self.string("");
        self.end(at);
    }

    #[allow(clippy::too_many_arguments)]
    fn branch_element(
        &mut self,
        name: &str,
        class_name: &str,
        entries: u64,
        basket: Option<(u64, u32)>,
        data_type: i32,
        n_children: i32,
        children: impl FnOnce(&mut Self),
    ) {
        let obj = self.object("TBranchElement");
        let at = self.versioned(10);
        let leaf = ("TLeafElement", data_type);
        self.tbranch(name, entries, true, basket, leaf, n_children, children);
        self.string(class_name);
        self.string("");
        self.string("");
        self.put(&0u32.to_be_bytes());
        self.put(&1i16.to_be_bytes());
        self.put(&(-1i32).to_be_bytes());
        self.put(&0i32.to_be_bytes());
        self.put(&(-1i32).to_be_bytes());
        self.put(&(-1i32).to_be_bytes());
        self.put(&0u32.to_be_bytes());
        self.put(&0u32.to_be_bytes());
        self.end(at);
        self.end(obj);
    }

    fn branch(&mut self, spec: &BranchSpec, basket: Option<(u64, u32)>) {
        let entries = spec.rows.len() as u64;
        match &spec.kind {
            BranchKind::ScalarF64 => {
                let obj = self.object("TBranch");
                self.tbranch(&spec.name, entries, false, basket, ("TLeafD", 0), 0, |_| {});
                self.end(obj);
            }
            BranchKind::StlVectorF32 => {
                self.branch_element(&spec.name, "vector<float>", entries, basket, -1, 0, |_| {});
            }
            BranchKind::SplitMember { parent } => {
                let collection = format!("vector<{parent}Data>");
                let member = format!("{parent}Data");
                self.branch_element(parent, &collection, entries, None, -1, 1, |w| {
                    w.branch_element(&spec.name, &member, entries, basket, 5, 0, |_| {});
                });
            }
        }
    }

    /// Write a TTree streamer; `baskets[i]` locates the single basket of `branches[i]`.
    pub fn ttree(&mut self, name: &str, entries: u64, branches: &[BranchSpec], baskets: &[(u64, u32)]) {
        let at = self.versioned(20);
        self.tnamed(name, "");
        self.opaque(2, 6);
        self.opaque(2, 4);
        self.opaque(2, 8);
        self.put(&(entries as i64).to_be_bytes());
        for _ in 0..4 {
            self.put(&0i64.to_be_bytes());
        }
        self.put(&1f64.to_be_bytes());
        for v in [0i32, 25, 0, 1000, 0] {
            self.put(&v.to_be_bytes());
        }
        for _ in 0..6 {
            self.put(&0i64.to_be_bytes());
        }
        self.put(&[1, 1]);
        self.opaque(1, 1);
        self.objarray(branches.len() as i32, |w| {
            for (i, spec) in branches.iter().enumerate() {
                w.branch(spec, baskets.get(i).copied());
            }
        });
        self.end(at);
    }
}

/// Build a complete uncompressed ROOT file holding one TTree.
///
/// Every branch gets a single basket. All branches must have the same number of rows.
pub fn write_tree_file(tree_name: &str, branches: &[BranchSpec]) -> Vec<u8> {
    let entries = branches.first().map_or(0, |b| b.rows.len()) as u64;
    let mut file = vec![0u8; FILE_BEGIN + NAME_RECORD_LEN];

    // Top directory record; seek_keys is patched once the key list is placed.
    let dir_pos = file.len();
    file.extend_from_slice(&5u16.to_be_bytes());
    file.extend_from_slice(&[0u8; 4 * 7]);
    file.resize(256, 0);

    let baskets: Vec<(u64, u32)> =
        branches.iter().map(|b| write_basket(&mut file, tree_name, b)).collect();

    let tree_key_len = key_len(&["TTree", tree_name, ""], 0);
    let mut w = StreamWriter::new(tree_key_len);
    w.ttree(tree_name, entries, branches, &baskets);
    let payload = w.into_bytes();
    let tree_seek = file.len();
    let tree_key = key_header(tree_seek, tree_key_len, payload.len(), &["TTree", tree_name, ""]);
    file.extend_from_slice(&tree_key);
    file.extend_from_slice(&payload);

    let keys_seek = file.len();
    let list_len = key_len(&["TFile", "test.root", ""], 0);
    let mut list_body = 1u32.to_be_bytes().to_vec();
    list_body.extend_from_slice(&tree_key);
    file.extend(key_header(keys_seek, list_len, list_body.len(), &["TFile", "test.root", ""]));
    file.extend(list_body);

    let seek_keys_at = dir_pos + 2 + 4 * 6;
    file[seek_keys_at..seek_keys_at + 4].copy_from_slice(&(keys_seek as u32).to_be_bytes());

    let file_len = file.len() as u32;
    let mut header = Vec::with_capacity(FILE_BEGIN);
    header.extend_from_slice(b"root");
    for v in [62_606u32, FILE_BEGIN as u32, file_len, 0, 0, 0, NAME_RECORD_LEN as u32] {
        header.extend_from_slice(&v.to_be_bytes());
    }
    header.push(4);
    header.extend_from_slice(&[0u8; 4 * 3 + 18]);
    file[..header.len()].copy_from_slice(&header);
    file
}

fn key_len(strings: &[&str], extra: usize) -> usize {
    SMALL_KEY_FIXED_LEN + strings.iter().map(|s| 1 + s.len()).sum::<usize>() + extra
}

fn key_header(seek: usize, key_len: usize, obj_len: usize, strings: &[&str]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key_len);
    out.extend_from_slice(&((key_len + obj_len) as u32).to_be_bytes());
    out.extend_from_slice(&4u16.to_be_bytes());
    out.extend_from_slice(&(obj_len as u32).to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(key_len as u16).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&(seek as u32).to_be_bytes());
    out.extend_from_slice(&(FILE_BEGIN as u32).to_be_bytes());
    for s in strings {
        out.push(s.len() as u8);
        out.extend_from_slice(s.as_bytes());
    }
    out
}

fn write_basket(file: &mut Vec<u8>, tree_name: &str, spec: &BranchSpec) -> (u64, u32) {
    let seek = file.len();
    let strings = ["TBasket", spec.name.as_str(), tree_name];
    let kl = key_len(&strings, BASKET_HEADER_LEN);

    let mut data = Vec::new();
    let mut starts = Vec::with_capacity(spec.rows.len());
    for row in &spec.rows {
        starts.push(kl + data.len());
        data.extend(spec.encode_row(row));
    }
    let last = kl + data.len();
    let mut payload = data;
    if spec.has_offsets() {
        payload.extend_from_slice(&((starts.len() + 1) as i32).to_be_bytes());
        for s in &starts {
            payload.extend_from_slice(&(*s as i32).to_be_bytes());
        }
        payload.extend_from_slice(&0i32.to_be_bytes());
    }

    let mut header = key_header(seek, kl, payload.len(), &strings);
    header.extend_from_slice(&3u16.to_be_bytes());
    header.extend_from_slice(&32000i32.to_be_bytes());
    header.extend_from_slice(&(if spec.has_offsets() { 1000i32 } else { 8 }).to_be_bytes());
    header.extend_from_slice(&(spec.rows.len() as i32).to_be_bytes());
    header.extend_from_slice(&(last as i32).to_be_bytes());
    header.push(0);
    debug_assert_eq!(header.len(), kl);

    file.extend_from_slice(&header);
    file.extend_from_slice(&payload);
    (seek as u64, (kl + payload.len()) as u32)
}
