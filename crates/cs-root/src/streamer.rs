//! TTree / TBranch / TLeaf streamer parsing.
//!
//! Objects nested in a TTree payload are written with ROOT's object-reference
//! scheme: each element carries a byte count, then either `kNewClassTag`
//! followed by a NUL-terminated class name, or `kClassMask | offset` pointing
//! back at an earlier class name. Offsets are measured from the start of the
//! key (payload position + key length) plus `kMapOffset`, and are shared by the
//! whole payload.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::{BYTE_COUNT_MASK, RBuffer};
use crate::tree::{BranchInfo, LeafType, Tree};

pub(crate) const NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
pub(crate) const CLASS_MASK: u32 = 0x8000_0000;
pub(crate) const MAP_OFFSET: usize = 2;

/// Class-name registry for one streamed payload.
pub(crate) struct StreamContext {
    key_len: usize,
    classes: HashMap<usize, String>,
}

impl StreamContext {
    pub(crate) fn new(key_len: usize) -> Self {
        Self { key_len, classes: HashMap::new() }
    }

    /// Read an object header written by `WriteObjectAny`.
    ///
    /// Returns `None` for null pointers and references to already streamed
    /// objects; otherwise the class name and the absolute end of the object.
    fn read_object_header(&mut self, r: &mut RBuffer) -> Result<Option<(String, usize)>> {
        let beg = r.pos();
        let raw = r.read_u32()?;
        if raw == NEW_CLASS_TAG || raw & BYTE_COUNT_MASK == 0 {
            if raw == 0 || raw & CLASS_MASK == 0 {
                return Ok(None);
            }
            return Err(RootError::Deserialization(format!(
                "object without byte count at offset {beg} (tag {raw:#010x})"
            )));
        }
        let end = beg + 4 + (raw & !BYTE_COUNT_MASK) as usize;

        let tag_pos = r.pos();
        let tag = r.read_u32()?;
        let class = if tag == NEW_CLASS_TAG {
            let name = r.read_cstring()?;
            self.classes.insert(tag_pos + self.key_len + MAP_OFFSET, name.clone());
            name
        } else if tag & CLASS_MASK != 0 {
            let offset = (tag & !CLASS_MASK) as usize;
            match self.classes.get(&offset) {
                Some(name) => name.clone(),
                None => {
                    log::debug!("unresolved class reference {offset} at {tag_pos}, skipping object");
                    String::new()
                }
            }
        } else {
            return Err(RootError::Deserialization(format!(
                "unexpected class tag {tag:#010x} at offset {tag_pos}"
            )));
        };
        Ok(Some((class, end)))
    }
}

/// Parse a TTree from its key payload. `key_len` is the length of the key header.
pub fn read_ttree(payload: &[u8], key_len: usize) -> Result<Tree> {
    let mut r = RBuffer::new(payload);
    let mut ctx = StreamContext::new(key_len);

    let (ver, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TTree has no byte count".into()))?;
    if ver < 16 {
        return Err(RootError::Deserialization(format!("TTree version {ver} is not supported")));
    }

    let (name, _title) = r.read_tnamed()?;
    for att in ["TAttLine", "TAttFill", "TAttMarker"] {
        r.skip_versioned(att)?;
    }

    let entries = r.read_i64()?.max(0) as u64;
    r.skip(8 * 3)?; // fTotBytes, fZipBytes, fSavedBytes
    if ver >= 18 {
        r.skip(8)?; // fFlushedBytes
    }
    r.skip(8 + 4 * 3)?; // fWeight, fTimerInterval, fScanField, fUpdate
    if ver >= 18 {
        r.skip(4)?; // fDefaultEntryOffsetLen
    }
    let n_cluster_range = if ver >= 19 { r.read_i32()?.max(0) as usize } else { 0 };
    r.skip(8 * 4)?; // fMaxEntries, fMaxEntryLoop, fMaxVirtualSize, fAutoSave
    if ver >= 18 {
        r.skip(8)?; // fAutoFlush
    }
    r.skip(8)?; // fEstimate
    if ver >= 19 {
        // fClusterRangeEnd and fClusterSize, each behind a one-byte array marker.
        for _ in 0..2 {
            r.skip(1 + 8 * n_cluster_range)?;
        }
    }
    if ver >= 20 {
        r.skip_versioned("TIOFeatures")?;
    }

    let branches = read_objarray(&mut r, &mut ctx, read_branch_element)?;
    r.set_pos(end);

    log::debug!("tree '{name}': {entries} entries, {} branches", branches.len());
    Ok(Tree { name, entries, branches })
}

type ElementReader<T> = fn(&mut RBuffer, &mut StreamContext, &str) -> Result<Vec<T>>;

/// Read an inline TObjArray, handing each non-null element to `read_one`.
///
/// An element that fails to parse is skipped using its byte count.
fn read_objarray<T>(
    r: &mut RBuffer,
    ctx: &mut StreamContext,
    read_one: ElementReader<T>,
) -> Result<Vec<T>> {
    let (_ver, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TObjArray has no byte count".into()))?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let count = r.read_i32()?.max(0);
    let _low_bound = r.read_i32()?;

    let mut out = Vec::new();
    for _ in 0..count {
        let Some((class, obj_end)) = ctx.read_object_header(r)? else {
            continue;
        };
        match read_one(r, ctx, &class) {
            Ok(items) => out.extend(items),
            Err(e) => log::debug!("skipping unreadable {class}: {e}"),
        }
        r.set_pos(obj_end);
    }
    r.set_pos(end);
    Ok(out)
}

/// One element of a branch list: the branch itself followed by its sub-branches.
fn read_branch_element(
    r: &mut RBuffer,
    ctx: &mut StreamContext,
    class: &str,
) -> Result<Vec<BranchInfo>> {
    let (own, children) = match class {
        "TBranch" => read_tbranch(r, ctx)?,
        "TBranchElement" => {
            let (_ver, end) = r.read_version()?;
            let (mut own, children) = read_tbranch(r, ctx)?;
            let class_name = r.read_string()?;
            if let Some(end) = end {
                r.set_pos(end);
            }
            if let Some(stl) = LeafType::from_stl_class(&class_name) {
                own.leaf_type = Some(stl);
            }
            own.info.class_name = Some(class_name);
            (own, children)
        }
        other => {
            log::debug!("ignoring branch class {other}");
            return Ok(Vec::new());
        }
    };
    let mut out: Vec<BranchInfo> = own.finish().into_iter().collect();
    out.extend(children);
    Ok(out)
}

/// Branch whose element type may still be unknown while its containing
/// `TBranchElement` is being parsed.
struct ParsedBranch {
    info: BranchInfo,
    leaf_type: Option<LeafType>,
}

impl ParsedBranch {
    fn finish(self) -> Option<BranchInfo> {
        match self.leaf_type {
            Some(lt) => Some(BranchInfo { leaf_type: lt, ..self.info }),
            None => {
                log::debug!("branch '{}' has no numeric element type", self.info.name);
                None
            }
        }
    }
}

/// Parse the `TBranch` base, returning the branch and all of its descendants.
fn read_tbranch(
    r: &mut RBuffer,
    ctx: &mut StreamContext,
) -> Result<(ParsedBranch, Vec<BranchInfo>)> {
    let (ver, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TBranch has no byte count".into()))?;
    if ver < 10 {
        return Err(RootError::Deserialization(format!("TBranch version {ver} is not supported")));
    }

    let (name, _title) = r.read_tnamed()?;
    r.skip_versioned("TAttFill")?;

    let _compress = r.read_i32()?;
    let _basket_size = r.read_i32()?;
    let entry_offset_len = r.read_i32()?.max(0) as usize;
    let write_basket = r.read_i32()?.max(0) as usize;
    let _entry_number = r.read_i64()?;
    if ver >= 13 {
        r.skip_versioned("TIOFeatures")?;
    }
    let _offset = r.read_i32()?;
    let max_baskets = r.read_i32()?.max(0) as usize;
    let _split_level = r.read_i32()?;
    let entries = r.read_i64()?.max(0) as u64;
    if ver >= 11 {
        let _first_entry = r.read_i64()?;
    }
    let _tot_bytes = r.read_i64()?;
    let _zip_bytes = r.read_i64()?;

    let children = read_objarray(r, ctx, read_branch_element)?;
    let leaves = read_objarray(r, ctx, read_leaf)?;
    r.skip_versioned("fBaskets")?;

    if write_basket > max_baskets {
        return Err(RootError::Deserialization(format!(
            "branch '{name}': fWriteBasket {write_basket} > fMaxBaskets {max_baskets}"
        )));
    }
    let _marker = r.read_u8()?;
    let mut basket_bytes = Vec::with_capacity(write_basket);
    for i in 0..max_baskets {
        let v = r.read_i32()?;
        if i < write_basket {
            basket_bytes.push(v.max(0) as u32);
        }
    }
    let _marker = r.read_u8()?;
    let mut basket_entry = Vec::with_capacity(write_basket + 1);
    for i in 0..max_baskets {
        let v = r.read_i64()?;
        if i <= write_basket {
            basket_entry.push(v.max(0) as u64);
        }
    }
    let _marker = r.read_u8()?;
    let mut basket_seek = Vec::with_capacity(write_basket);
    for i in 0..max_baskets {
        let v = r.read_i64()?;
        if i < write_basket {
            basket_seek.push(v.max(0) as u64);
        }
    }
    r.set_pos(end);

    let own = ParsedBranch {
        info: BranchInfo {
            name,
            leaf_type: LeafType::F64,
            class_name: None,
            entries,
            entry_offset_len,
            basket_entry,
            basket_seek,
            basket_bytes,
        },
        leaf_type: leaves.first().copied().flatten(),
    };
    Ok((own, children))
}

/// Parse one leaf, returning its element type if it is numeric.
fn read_leaf(r: &mut RBuffer, ctx: &mut StreamContext, class: &str) -> Result<Vec<Option<LeafType>>> {
    let (_ver, _end) = r.read_version()?;

    let (_ver, leaf_end) = r.read_version()?;
    let leaf_end = leaf_end.ok_or_else(|| RootError::Deserialization("TLeaf has no byte count".into()))?;
    let _ = r.read_tnamed()?;
    let _len = r.read_i32()?;
    let _len_type = r.read_i32()?;
    let _offset = r.read_i32()?;
    let _is_range = r.read_u8()?;
    let is_unsigned = r.read_u8()? != 0;
    // fLeafCount: registered for later class references, body skipped.
    if let Some((_, count_end)) = ctx.read_object_header(r)? {
        r.set_pos(count_end);
    }
    r.set_pos(leaf_end);

    let leaf_type = if class == "TLeafElement" {
        let _id = r.read_i32()?;
        LeafType::from_data_type(r.read_i32()?)
    } else {
        LeafType::from_leaf_class(class, is_unsigned)
    };
    Ok(vec![leaf_type])
}
