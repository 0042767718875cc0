//! Probability-mass histograms for shower-shape comparisons.

use cs_core::{Histogram1D, Result, UpperEdge};
use serde::{Deserialize, Serialize};

/// Number of bins.
pub const PMF_BINS: usize = 49;
/// Lower edge of the first bin.
pub const PMF_LO: f64 = 0.0;
/// Upper edge of the last bin (inclusive).
pub const PMF_HI: f64 = 1.03;

/// Histogram over `[PMF_LO, PMF_HI]` with the last bin closed, filled with `values`.
pub fn pmf_histogram(values: &[f64]) -> Result<Histogram1D> {
    let mut hist = Histogram1D::uniform(PMF_BINS, PMF_LO, PMF_HI)?.with_upper_edge(UpperEdge::Closed);
    hist.fill_all(values.iter().copied());
    Ok(hist)
}

/// A normalized distribution together with the counts it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePmf {
    /// Bin edges (`PMF_BINS + 1`).
    pub bin_edges: Vec<f64>,
    /// Fraction of in-range entries per bin; all zero when nothing is in range.
    pub pmf: Vec<f64>,
    /// Number of input values, in range or not.
    pub n_entries: usize,
    /// Number of values that landed in a bin.
    pub n_in_range: usize,
}

impl ShapePmf {
    /// Normalized histogram of `values`.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let hist = pmf_histogram(values)?;
        let n_in_range = hist.integral() as usize;
        if n_in_range == 0 {
            log::warn!("no values in [{PMF_LO}, {PMF_HI}] among {} entries, PMF is all zero", values.len());
        }
        Ok(Self {
            pmf: hist.normalized(),
            bin_edges: hist.bin_edges,
            n_entries: values.len(),
            n_in_range,
        })
    }

    /// Bin centres.
    pub fn bin_centers(&self) -> Vec<f64> {
        self.bin_edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }
}
