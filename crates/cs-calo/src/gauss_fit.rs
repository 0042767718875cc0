//! Binned Gaussian fit.
//!
//! The model `c * exp(-0.5 * ((x - mu) / s)^2)` is evaluated at bin centres of
//! every bin whose centre lies in the fit window. Bin contents are treated as
//! Poisson counts and the fit minimizes the likelihood-ratio chi-square
//!
//! `2 * sum(f - y + y * ln(y / f))`
//!
//! (Baker-Cousins). Empty bins contribute `2 f`, so sparse histograms do not
//! drag the width toward zero the way a `sqrt(n)`-weighted chi-square does.

use cs_core::{Error, GaussianFit, GaussianFitter, GaussianSeed, Histogram1D, Result};

use crate::optimizer::{LbfgsbOptimizer, ObjectiveFunction, OptimizerConfig};

const N_PARAMS: usize = 3;

/// Relative distance from a bound below which a parameter counts as stuck on it.
const BOUND_TOL: f64 = 1e-6;

/// Bins inside the fit window.
#[derive(Debug, Clone, Default)]
struct FitPoints {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl FitPoints {
    fn collect(hist: &Histogram1D, window: (f64, f64)) -> Self {
        let mut pts = Self::default();
        for i in 0..hist.n_bins() {
            let x = hist.bin_center(i);
            if x < window.0 || x > window.1 {
                continue;
            }
            pts.x.push(x);
            pts.y.push(hist.bin_content[i].max(0.0));
        }
        pts
    }

    fn len(&self) -> usize {
        self.x.len()
    }

    fn populated(&self) -> usize {
        self.y.iter().filter(|&&y| y > 0.0).count()
    }

    fn total(&self) -> f64 {
        self.y.iter().sum()
    }
}

/// Likelihood chi-square in rescaled coordinates
/// `u = (c / c0, (mu - mu0) / s0, s / s0)`.
struct PoissonChi2 {
    pts: FitPoints,
    seed: GaussianSeed,
}

impl PoissonChi2 {
    fn physical(&self, u: &[f64]) -> (f64, f64, f64) {
        let GaussianSeed { constant: c0, mean: mu0, sigma: s0 } = self.seed;
        (u[0] * c0, mu0 + u[1] * s0, u[2] * s0)
    }
}

impl ObjectiveFunction for PoissonChi2 {
    fn eval(&self, u: &[f64]) -> Result<f64> {
        let (c, mu, s) = self.physical(u);
        let ln_c = c.ln();
        let mut chi2 = 0.0;
        for (&x, &y) in self.pts.x.iter().zip(&self.pts.y) {
            let z = (x - mu) / s;
            let f = c * (-0.5 * z * z).exp();
            chi2 += f - y;
            if y > 0.0 {
                // y * ln(y / f) with ln f taken analytically, finite even where f underflows.
                chi2 += y * (y.ln() - ln_c + 0.5 * z * z);
            }
        }
        Ok(2.0 * chi2)
    }

    fn gradient(&self, u: &[f64]) -> Result<Vec<f64>> {
        let (c, mu, s) = self.physical(u);
        let (mut dc, mut dmu, mut ds) = (0.0, 0.0, 0.0);
        for (&x, &y) in self.pts.x.iter().zip(&self.pts.y) {
            let z = (x - mu) / s;
            let g = (-0.5 * z * z).exp();
            let r = c * g - y;
            dc += g - y / c;
            dmu += r * z / s;
            ds += r * z * z / s;
        }
        let GaussianSeed { constant: c0, sigma: s0, .. } = self.seed;
        Ok(vec![2.0 * dc * c0, 2.0 * dmu * s0, 2.0 * ds * s0])
    }
}

/// Gaussian fitter minimizing the Poisson likelihood chi-square with bounded L-BFGS.
#[derive(Debug, Clone, Default)]
pub struct Chi2GaussianFitter {
    config: OptimizerConfig,
}

impl Chi2GaussianFitter {
    /// Fitter with explicit minimizer settings.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }
}

/// Peak height of a Gaussian of width `sigma` holding `n` entries in bins of `bin_width`.
pub fn expected_peak(n: f64, bin_width: f64, sigma: f64) -> f64 {
    n * bin_width / ((2.0 * std::f64::consts::PI).sqrt() * sigma)
}

impl GaussianFitter for Chi2GaussianFitter {
    fn fit(&self, hist: &Histogram1D, seed: &GaussianSeed, window: (f64, f64)) -> Result<GaussianFit> {
        if !(seed.sigma > 0.0 && seed.sigma.is_finite()) {
            return Err(Error::Validation(format!("fit seed needs sigma > 0, got {}", seed.sigma)));
        }
        if !(window.1 > window.0) {
            return Err(Error::Validation(format!("empty fit window [{}, {}]", window.0, window.1)));
        }

        let pts = FitPoints::collect(hist, window);
        let populated = pts.populated();
        if populated < N_PARAMS {
            return Err(Error::DegenerateHistogram(format!(
                "{populated} populated bins in [{:.5}, {:.5}], need at least {N_PARAMS}",
                window.0, window.1
            )));
        }
        let n = pts.len();

        let bin_width = hist.bin_width(0);
        let constant = if seed.constant > 0.0 {
            seed.constant
        } else {
            expected_peak(pts.total(), bin_width, seed.sigma).max(1.0)
        };
        let seed = GaussianSeed { constant, ..*seed };
        let objective = PoissonChi2 { pts, seed };

        let span = (window.1 - window.0) / seed.sigma;
        // A Gaussian narrower than one bin is not resolved by the histogram.
        let min_width = bin_width / seed.sigma;
        let bounds = [(1e-3, 1e3), (-span, span), (min_width, 10.0 * span.max(1.0))];
        let init = [1.0, 0.0, (2.0 * min_width).max(1.0)];
        let result = LbfgsbOptimizer::new(self.config.clone()).minimize(&objective, &init, &bounds)?;
        log::debug!("Gaussian fit over {n} bins: {result}");

        if !result.converged {
            return Err(Error::Computation(format!("Gaussian fit did not converge: {}", result.message)));
        }
        const NAMES: [&str; N_PARAMS] = ["constant", "mean", "sigma"];
        for ((&v, &(lo, hi)), name) in result.parameters.iter().zip(&bounds).zip(NAMES) {
            let tol = BOUND_TOL * (hi - lo);
            if v <= lo + tol || v >= hi - tol {
                let (c, mu, s) = objective.physical(&result.parameters);
                return Err(Error::Computation(format!(
                    "Gaussian fit ended on the {name} bound (c={c:.4}, mu={mu:.5}, sigma={s:.5})"
                )));
            }
        }

        let (c, mu, s) = objective.physical(&result.parameters);
        Ok(GaussianFit {
            constant: c,
            mean: mu,
            sigma: s.abs(),
            chi2: result.fval,
            ndf: n - N_PARAMS,
            converged: result.converged,
        })
    }

    fn name(&self) -> &str {
        "chi2-lbfgs"
    }
}
