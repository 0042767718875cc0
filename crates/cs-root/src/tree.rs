//! TTree and branch metadata.

/// Element type stored in a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafType {
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 16-bit signed integer.
    I16,
    /// 8-bit signed integer.
    I8,
    /// Boolean stored as one byte.
    Bool,
}

impl LeafType {
    /// Size in bytes of one element.
    pub fn byte_size(self) -> usize {
        match self {
            LeafType::F32 | LeafType::I32 | LeafType::U32 => 4,
            LeafType::F64 | LeafType::I64 | LeafType::U64 => 8,
            LeafType::I16 => 2,
            LeafType::I8 | LeafType::Bool => 1,
        }
    }

    /// Type of a plain leaf class (`TLeafF`, `TLeafD`, ...).
    pub fn from_leaf_class(class_name: &str, unsigned: bool) -> Option<Self> {
        Some(match (class_name, unsigned) {
            ("TLeafF", _) => LeafType::F32,
            ("TLeafD", _) => LeafType::F64,
            ("TLeafI", false) => LeafType::I32,
            ("TLeafI", true) => LeafType::U32,
            ("TLeafL", false) => LeafType::I64,
            ("TLeafL", true) => LeafType::U64,
            ("TLeafS", _) => LeafType::I16,
            ("TLeafB", _) => LeafType::I8,
            ("TLeafO", _) => LeafType::Bool,
            _ => return None,
        })
    }

    /// Type from a streamer `EDataType` code, as carried by `TLeafElement::fType`.
    ///
    /// Array and pointer offsets (`+20`, `+40`) are folded onto the base type.
    pub fn from_data_type(code: i32) -> Option<Self> {
        let base = match code {
            21..=39 => code - 20,
            41..=59 => code - 40,
            _ => code,
        };
        Some(match base {
            1 => LeafType::I8,
            2 => LeafType::I16,
            3 | 6 => LeafType::I32,
            4 | 16 => LeafType::I64,
            5 | 19 => LeafType::F32,
            8 | 9 => LeafType::F64,
            13 | 15 => LeafType::U32,
            14 | 17 => LeafType::U64,
            18 => LeafType::Bool,
            _ => return None,
        })
    }

    /// Element type of an STL container class name such as `vector<float>`.
    pub fn from_stl_class(class_name: &str) -> Option<Self> {
        let inner = class_name
            .trim()
            .strip_prefix("vector<")
            .or_else(|| class_name.trim().strip_prefix("std::vector<"))?
            .strip_suffix('>')?
            .trim();
        Some(match inner {
            "float" | "Float_t" => LeafType::F32,
            "double" | "Double_t" => LeafType::F64,
            "int" | "Int_t" => LeafType::I32,
            "unsigned int" | "UInt_t" => LeafType::U32,
            "long" | "Long64_t" | "long long" => LeafType::I64,
            "unsigned long" | "ULong64_t" | "unsigned long long" => LeafType::U64,
            "short" | "Short_t" => LeafType::I16,
            "char" | "Char_t" => LeafType::I8,
            "bool" | "Bool_t" => LeafType::Bool,
            _ => return None,
        })
    }
}

/// Metadata for one branch.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    /// Full branch name (split members keep their dotted name).
    pub name: String,
    /// Element type.
    pub leaf_type: LeafType,
    /// `fClassName` of a `TBranchElement`, if any.
    pub class_name: Option<String>,
    /// Number of entries.
    pub entries: u64,
    /// `fEntryOffsetLen`: non-zero when baskets carry per-entry offsets.
    pub entry_offset_len: usize,
    /// First entry of each basket (one more element than baskets).
    pub basket_entry: Vec<u64>,
    /// Absolute file position of each basket.
    pub basket_seek: Vec<u64>,
    /// Compressed size of each basket.
    pub basket_bytes: Vec<u32>,
}

impl BranchInfo {
    /// Number of baskets written to disk.
    pub fn n_baskets(&self) -> usize {
        self.basket_seek.len()
    }

    /// Number of entries stored in basket `i`.
    pub fn basket_entries(&self, i: usize) -> usize {
        let start = self.basket_entry.get(i).copied().unwrap_or(0);
        let end = self.basket_entry.get(i + 1).copied().unwrap_or(self.entries);
        end.saturating_sub(start) as usize
    }
}

/// A TTree's branch layout.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Tree name.
    pub name: String,
    /// Number of entries.
    pub entries: u64,
    /// All branches, depth-first.
    pub branches: Vec<BranchInfo>,
}

impl Tree {
    /// Branch with this exact name.
    pub fn find_branch(&self, name: &str) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// Names of all branches.
    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stl_class_element_types() {
        assert_eq!(LeafType::from_stl_class("vector<float>"), Some(LeafType::F32));
        assert_eq!(LeafType::from_stl_class("std::vector<double>"), Some(LeafType::F64));
        assert_eq!(LeafType::from_stl_class("vector<edm4hep::ClusterData>"), None);
        assert_eq!(LeafType::from_stl_class("edm4hep::ClusterData"), None);
    }

    #[test]
    fn data_type_codes_fold_offsets() {
        assert_eq!(LeafType::from_data_type(5), Some(LeafType::F32));
        assert_eq!(LeafType::from_data_type(25), Some(LeafType::F32));
        assert_eq!(LeafType::from_data_type(48), Some(LeafType::F64));
        assert_eq!(LeafType::from_data_type(-1), None);
    }

    #[test]
    fn basket_entry_counts() {
        let b = BranchInfo {
            name: "x".into(),
            leaf_type: LeafType::F32,
            class_name: None,
            entries: 25,
            entry_offset_len: 0,
            basket_entry: vec![0, 10, 20],
            basket_seek: vec![100, 200, 300],
            basket_bytes: vec![1, 1, 1],
        };
        assert_eq!(b.n_baskets(), 3);
        assert_eq!(b.basket_entries(0), 10);
        assert_eq!(b.basket_entries(2), 5);
    }
}
