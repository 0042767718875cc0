//! Common data types for calostat

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a fill exactly on the last bin edge is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpperEdge {
    /// `[lo, hi)` for every bin: a value equal to the last edge is overflow.
    Open,
    /// The last bin is `[lo, hi]`, the convention of `numpy.histogram`.
    Closed,
}

/// A 1D histogram with fixed bin edges.
///
/// Besides bin contents it keeps running fill statistics over the in-range
/// entries (sum of weights, weighted sum of `x` and of `x^2`), so [`mean`] and
/// [`std_dev`] describe the filled values rather than bin centres.
///
/// [`mean`]: Histogram1D::mean
/// [`std_dev`]: Histogram1D::std_dev
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Bin edges (length = n_bins + 1, strictly increasing).
    pub bin_edges: Vec<f64>,
    /// Bin contents (sum of weights per bin).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Sum of weights below the first edge.
    pub underflow: f64,
    /// Sum of weights above the last edge.
    pub overflow: f64,
    /// Number of fill calls, including under/overflow.
    pub entries: u64,
    /// Treatment of values equal to the last edge.
    pub upper_edge: UpperEdge,
    tsumw: f64,
    tsumwx: f64,
    tsumwx2: f64,
}

impl Histogram1D {
    /// Histogram with `n_bins` equal-width bins over `[lo, hi)`.
    pub fn uniform(n_bins: usize, lo: f64, hi: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Validation("histogram needs at least one bin".into()));
        }
        if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
            return Err(Error::Validation(format!("invalid histogram range [{lo}, {hi}]")));
        }
        let step = (hi - lo) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| lo + i as f64 * step).collect();
        edges.push(hi);
        Self::with_edges(edges)
    }

    /// Histogram with explicit, strictly increasing bin edges.
    pub fn with_edges(bin_edges: Vec<f64>) -> Result<Self> {
        if bin_edges.len() < 2 {
            return Err(Error::Validation(format!(
                "histogram needs at least 2 edges, got {}",
                bin_edges.len()
            )));
        }
        if bin_edges.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::Validation("bin edges must be strictly increasing".into()));
        }
        let n = bin_edges.len() - 1;
        Ok(Self {
            bin_edges,
            bin_content: vec![0.0; n],
            sumw2: vec![0.0; n],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            upper_edge: UpperEdge::Open,
            tsumw: 0.0,
            tsumwx: 0.0,
            tsumwx2: 0.0,
        })
    }

    /// Set the treatment of values on the last edge.
    pub fn with_upper_edge(mut self, upper_edge: UpperEdge) -> Self {
        self.upper_edge = upper_edge;
        self
    }

    /// Number of bins (excluding under/overflow).
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Lower edge of the first bin.
    pub fn x_min(&self) -> f64 {
        self.bin_edges[0]
    }

    /// Upper edge of the last bin.
    pub fn x_max(&self) -> f64 {
        self.bin_edges[self.bin_edges.len() - 1]
    }

    /// Centre of bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        0.5 * (self.bin_edges[i] + self.bin_edges[i + 1])
    }

    /// Width of bin `i`.
    pub fn bin_width(&self, i: usize) -> f64 {
        self.bin_edges[i + 1] - self.bin_edges[i]
    }

    /// Bin index for `x`, `None` for under/overflow and NaN.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        let edges = &self.bin_edges;
        let last = edges.len() - 1;
        if x.is_nan() || x < edges[0] {
            return None;
        }
        if x >= edges[last] {
            return match self.upper_edge {
                UpperEdge::Closed if x == edges[last] => Some(last - 1),
                _ => None,
            };
        }
        // First edge strictly greater than x, minus one.
        let upper = edges.partition_point(|&e| e <= x);
        Some(upper - 1)
    }

    /// Fill one value with unit weight.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    /// Fill one value with weight `w`.
    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        self.entries += 1;
        match self.find_bin(x) {
            Some(b) => {
                self.bin_content[b] += w;
                self.sumw2[b] += w * w;
                self.tsumw += w;
                self.tsumwx += w * x;
                self.tsumwx2 += w * x * x;
            }
            None if x < self.x_min() => self.underflow += w,
            None => self.overflow += w,
        }
    }

    /// Fill every value of an iterator with unit weight.
    pub fn fill_all<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        for x in values {
            self.fill(x);
        }
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Mean of the in-range filled values. `None` if nothing is in range.
    pub fn mean(&self) -> Option<f64> {
        (self.tsumw > 0.0).then(|| self.tsumwx / self.tsumw)
    }

    /// Standard deviation of the in-range filled values. `None` if nothing is in range.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let var = self.tsumwx2 / self.tsumw - mean * mean;
        Some(var.abs().sqrt())
    }

    /// Bin contents divided by their sum (a probability mass function).
    ///
    /// Returns all zeros when the histogram has no in-range content.
    pub fn normalized(&self) -> Vec<f64> {
        let total = self.integral();
        if total <= 0.0 {
            return vec![0.0; self.n_bins()];
        }
        self.bin_content.iter().map(|c| c / total).collect()
    }
}

/// Starting point of a Gaussian fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianSeed {
    /// Peak height.
    pub constant: f64,
    /// Centre.
    pub mean: f64,
    /// Width (must be > 0).
    pub sigma: f64,
}

/// Result of fitting `constant * exp(-0.5 * ((x - mean) / sigma)^2)` to a histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianFit {
    /// Fitted peak height.
    pub constant: f64,
    /// Fitted centre.
    pub mean: f64,
    /// Fitted width (always non-negative).
    pub sigma: f64,
    /// Chi-square at the minimum.
    pub chi2: f64,
    /// Degrees of freedom (used bins minus free parameters).
    pub ndf: usize,
    /// Convergence status reported by the minimizer.
    pub converged: bool,
}

impl GaussianFit {
    /// Chi-square per degree of freedom, `None` when `ndf == 0`.
    pub fn chi2_per_ndf(&self) -> Option<f64> {
        (self.ndf > 0).then(|| self.chi2 / self.ndf as f64)
    }
}
