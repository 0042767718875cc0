//! # cs-calo
//!
//! Analysis core for calorimeter simulation output.
//!
//! Two pipelines live here:
//!
//! - **energy response**: [`truth`] pulls the truth energy out of a file name,
//!   [`response`] turns one collection of cluster energies into a fitted
//!   response point, and [`scan`] runs that over every file and collection and
//!   writes the summary table.
//! - **shower shapes**: [`shower`] decodes the fixed-stride shape-parameter
//!   record into per-layer columns and [`pmf`] normalizes them into
//!   probability-mass histograms for comparison plots.
//!
//! Event data is reached through the [`EventSource`] trait, so everything
//! except [`RootEventSource`] runs against in-memory columns in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod discover;
pub mod gauss_fit;
pub mod optimizer;
pub mod pmf;
pub mod response;
pub mod scan;
pub mod shower;
pub mod source;
pub mod truth;

pub use discover::{discover_inputs, wildcard_regex};
pub use gauss_fit::Chi2GaussianFitter;
pub use pmf::{PMF_BINS, PMF_HI, PMF_LO, ShapePmf, pmf_histogram};
pub use response::{
    N_BINS, NOISE_FLOOR, ResponsePoint, half_range, leading_clusters, process_collection,
    response_histogram,
};
pub use scan::{CSV_HEADER, ResponseTable, ScanInput, scan_files};
pub use shower::{LAYER_STEP, N_LAYERS, STRIDE, ShapeVariable, ShowerShapeTable};
pub use source::{EventSource, MemoryEventSource, RootEventSource};
pub use truth::truth_energy_from_name;
