//! # cs-root
//!
//! Native reader for the TTree columns calostat consumes.
//!
//! Only the read path needed for per-event numeric collections is implemented:
//! the file header, the top-level key list, TTree metadata (plain `TBranch` and
//! split `TBranchElement` hierarchies) and basket decoding into jagged `f64`
//! columns. Supports zlib, LZ4, ZSTD, and XZ compressed baskets.
//!
//! ## Example
//!
//! ```no_run
//! use cs_root::RootFile;
//!
//! let f = RootFile::open("ALLEGRO_RECO_1000evt_50GeV_photon.root").unwrap();
//! let tree = f.get_tree("events").unwrap();
//! let energies = f.branch_data_jagged(&tree, "AugmentedEMBCaloClusters.energy").unwrap();
//! println!("{} events", energies.n_entries());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod basket;
pub mod branch_reader;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod key;
pub mod rbuffer;
pub mod streamer;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod tree;

pub use branch_reader::{BranchReader, JaggedCol};
pub use error::{Result, RootError};
pub use file::RootFile;
pub use tree::{BranchInfo, LeafType, Tree};
