//! Energy response of one cluster collection in one file.

use cs_core::{Error, GaussianFitter, GaussianSeed, Histogram1D, Result};
use cs_root::JaggedCol;
use serde::{Deserialize, Serialize};

use crate::gauss_fit::expected_peak;
use crate::source::EventSource;

/// Cluster energies at or below this value are treated as noise.
pub const NOISE_FLOOR: f64 = 0.1;

/// Bins of the response histogram.
pub const N_BINS: usize = 600;

/// Width of the fit window in empirical standard deviations on each side of the mean.
const FIT_WINDOW_SIGMAS: f64 = 2.0;

/// Fitted response of one (file, collection) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePoint {
    /// Truth energy of the file (GeV).
    pub truth_gev: f64,
    /// Fitted mean of `(E_reco - E_truth) / E_truth`.
    pub mean: f64,
    /// Resolution: fitted sigma divided by `1 + mean`.
    pub sigma: f64,
    /// Fitted sigma before the response correction.
    pub raw_sigma: f64,
    /// Events with at least one cluster above the noise floor.
    pub n_pass: usize,
}

/// Half-width of the response histogram range for a given truth energy.
///
/// Wider at low energy where the stochastic term dominates.
pub fn half_range(truth_gev: f64) -> f64 {
    0.30 * (1.0 / truth_gev + 1.5).sqrt()
}

/// Leading (highest) cluster energy of every event that has a cluster above
/// [`NOISE_FLOOR`]. Events without one are dropped.
pub fn leading_clusters(energies: &JaggedCol) -> Vec<f64> {
    energies
        .rows()
        .filter_map(|row| {
            row.iter().copied().filter(|&e| e > NOISE_FLOOR).fold(None, |best: Option<f64>, e| {
                Some(best.map_or(e, |b| b.max(e)))
            })
        })
        .collect()
}

/// Histogram of fractional deviations `(lead - truth) / truth` over
/// `[-half_range, +half_range]`.
pub fn response_histogram(leading: &[f64], truth_gev: f64) -> Result<Histogram1D> {
    let hr = half_range(truth_gev);
    let mut hist = Histogram1D::uniform(N_BINS, -hr, hr)?;
    hist.fill_all(leading.iter().map(|&e| (e - truth_gev) / truth_gev));
    Ok(hist)
}

/// Fit the response histogram of `collection` in `source`.
///
/// The Gaussian is seeded from the histogram's fill statistics (peak height
/// from the in-window count) and fitted within two standard deviations of the
/// empirical mean. A fit that reports no convergence is an error.
pub fn process_collection<S, F>(
    source: &S,
    collection: &str,
    truth_gev: f64,
    fitter: &F,
) -> Result<ResponsePoint>
where
    S: EventSource + ?Sized,
    F: GaussianFitter + ?Sized,
{
    if !(truth_gev > 0.0 && truth_gev.is_finite()) {
        return Err(Error::Validation(format!("truth energy must be positive, got {truth_gev}")));
    }

    let energies = source.jagged(collection)?;
    let leading = leading_clusters(&energies);
    if leading.is_empty() {
        return Err(Error::EmptySelection { collection: collection.to_string(), truth_gev });
    }
    let n_pass = leading.len();
    log::debug!(
        "{} '{}': {n_pass}/{} events above noise floor",
        source.describe(),
        collection,
        energies.n_entries()
    );

    let hist = response_histogram(&leading, truth_gev)?;
    let (Some(mean0), Some(std0)) = (hist.mean(), hist.std_dev()) else {
        return Err(Error::DegenerateHistogram(format!(
            "'{collection}' at {truth_gev} GeV: all {n_pass} responses outside +-{:.4}",
            half_range(truth_gev)
        )));
    };

    if std0 == 0.0 {
        log::warn!(
            "'{collection}' at {truth_gev} GeV: every in-range response equals {mean0}, skipping fit"
        );
        return Ok(ResponsePoint { truth_gev, mean: mean0, sigma: 0.0, raw_sigma: 0.0, n_pass });
    }

    let window = (mean0 - FIT_WINDOW_SIGMAS * std0, mean0 + FIT_WINDOW_SIGMAS * std0);
    let in_window: f64 = (0..hist.n_bins())
        .filter(|&i| (window.0..=window.1).contains(&hist.bin_center(i)))
        .map(|i| hist.bin_content[i])
        .sum();
    let seed = GaussianSeed {
        constant: expected_peak(in_window, hist.bin_width(0), std0),
        mean: mean0,
        sigma: std0,
    };
    let fit = fitter.fit(&hist, &seed, window)?;
    if !fit.converged {
        return Err(Error::Computation(format!(
            "{} '{collection}' at {truth_gev} GeV: {} fit did not converge",
            source.describe(),
            fitter.name()
        )));
    }

    Ok(ResponsePoint {
        truth_gev,
        mean: fit.mean,
        sigma: fit.sigma / (1.0 + fit.mean),
        raw_sigma: fit.sigma,
        n_pass,
    })
}
