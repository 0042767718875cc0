//! Event sources: named jagged columns of reals.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cs_core::{Error, Result};
use cs_root::{JaggedCol, RootError, RootFile, Tree};

/// Per-event columnar data, addressed by column (branch) name.
pub trait EventSource {
    /// All entries of `column`, one (possibly empty) row per event.
    fn jagged(&self, column: &str) -> Result<JaggedCol>;

    /// Number of events.
    fn n_entries(&self) -> usize;

    /// Human-readable origin, for logs and error messages.
    fn describe(&self) -> String {
        "<events>".to_string()
    }
}

/// A TTree inside a ROOT file.
pub struct RootEventSource {
    file: RootFile,
    tree: Tree,
}

impl RootEventSource {
    /// Open `path` and load the metadata of `tree_name`.
    pub fn open(path: impl AsRef<Path>, tree_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = RootFile::open(path)
            .map_err(|e| Error::Root(format!("opening {}: {e}", path.display())))?;
        let tree = file
            .get_tree(tree_name)
            .map_err(|e| Error::Root(format!("reading tree '{tree_name}' in {}: {e}", path.display())))?;
        log::debug!(
            "{}: tree '{}' with {} entries, {} branches",
            path.display(),
            tree.name,
            tree.entries,
            tree.branches.len()
        );
        Ok(Self { file, tree })
    }

    /// Wrap an already opened file.
    pub fn from_file(file: RootFile, tree_name: &str) -> Result<Self> {
        let tree = file.get_tree(tree_name).map_err(|e| Error::Root(e.to_string()))?;
        Ok(Self { file, tree })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Branch names available in the tree.
    pub fn branch_names(&self) -> Vec<&str> {
        self.tree.branch_names()
    }
}

impl EventSource for RootEventSource {
    fn jagged(&self, column: &str) -> Result<JaggedCol> {
        self.file.branch_data_jagged(&self.tree, column).map_err(|e| match e {
            RootError::BranchNotFound(name) => Error::ColumnNotFound(name),
            other => Error::Root(format!("{}: {other}", self.file.path().display())),
        })
    }

    fn n_entries(&self) -> usize {
        self.tree.entries as usize
    }

    fn describe(&self) -> String {
        self.file.path().display().to_string()
    }
}

/// In-memory columns, for synthetic data and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSource {
    columns: HashMap<String, JaggedCol>,
    n_entries: usize,
}

impl MemoryEventSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. All columns must have the same number of entries.
    pub fn with_column(mut self, name: impl Into<String>, col: JaggedCol) -> Result<Self> {
        let name = name.into();
        if !self.columns.is_empty() && col.n_entries() != self.n_entries {
            return Err(Error::Validation(format!(
                "column '{name}' has {} entries, expected {}",
                col.n_entries(),
                self.n_entries
            )));
        }
        self.n_entries = col.n_entries();
        self.columns.insert(name, col);
        Ok(self)
    }

    /// Add a column built from per-event rows.
    pub fn with_rows<I, R>(self, name: impl Into<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        self.with_column(name, JaggedCol::from_rows(rows))
    }
}

impl EventSource for MemoryEventSource {
    fn jagged(&self, column: &str) -> Result<JaggedCol> {
        self.columns.get(column).cloned().ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    fn n_entries(&self) -> usize {
        self.n_entries
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
