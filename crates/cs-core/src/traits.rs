//! Core traits for calostat
//!
//! The response processor only needs "fit a Gaussian to this histogram inside
//! this window". Keeping that behind a trait lets the analysis run against the
//! argmin-based fitter in production and against trivial fitters in tests.

use crate::Result;
use crate::types::{GaussianFit, GaussianSeed, Histogram1D};

/// Gaussian fit backend.
pub trait GaussianFitter {
    /// Fit a Gaussian to the bins of `hist` whose centre lies in `[window.0, window.1]`.
    fn fit(
        &self,
        hist: &Histogram1D,
        seed: &GaussianSeed,
        window: (f64, f64),
    ) -> Result<GaussianFit>;

    /// Backend name (e.g., "chi2-lbfgs")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SeedEcho;

    impl GaussianFitter for SeedEcho {
        fn fit(
            &self,
            _hist: &Histogram1D,
            seed: &GaussianSeed,
            _window: (f64, f64),
        ) -> Result<GaussianFit> {
            Ok(GaussianFit {
                constant: seed.constant,
                mean: seed.mean,
                sigma: seed.sigma,
                chi2: 0.0,
                ndf: 0,
                converged: true,
            })
        }

        fn name(&self) -> &str {
            "seed-echo"
        }
    }

    #[test]
    fn test_trait_object_dispatch() {
        let fitter: &dyn GaussianFitter = &SeedEcho;
        let h = Histogram1D::uniform(4, 0.0, 1.0).unwrap();
        let seed = GaussianSeed { constant: 1.0, mean: 0.5, sigma: 0.1 };
        let fit = fitter.fit(&h, &seed, (0.0, 1.0)).unwrap();
        assert_eq!(fitter.name(), "seed-echo");
        assert_eq!(fit.mean, 0.5);
        assert!(fit.chi2_per_ndf().is_none());
    }
}
