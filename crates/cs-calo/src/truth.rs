//! Truth energy encoded in simulation file names.

use std::path::Path;
use std::sync::LazyLock;

use cs_core::{Error, Result};
use regex::Regex;

/// Name patterns in priority order, with the factor converting the captured
/// integer to GeV.
static PATTERNS: LazyLock<[(Regex, f64); 3]> = LazyLock::new(|| {
    [
        (Regex::new(r"_pMin_([0-9]+)").expect("valid regex"), 1e-3),
        (Regex::new(r"_energy_([0-9]+)").expect("valid regex"), 1e-3),
        (Regex::new(r"_([0-9]+)GeV").expect("valid regex"), 1.0),
    ]
});

/// Truth energy in GeV deduced from a file name.
///
/// Tries `_pMin_<MeV>`, then `_energy_<MeV>`, then `_<GeV>GeV`; the first
/// pattern that matches wins, even if a later one would match too. Directory
/// components of a path are ignored. A zero energy is rejected.
pub fn truth_energy_from_name(name: &str) -> Result<f64> {
    let file_name = Path::new(name).file_name().and_then(|s| s.to_str()).unwrap_or(name);

    for (re, scale) in PATTERNS.iter() {
        let Some(caps) = re.captures(file_name) else {
            continue;
        };
        let value: f64 = caps[1].parse().map_err(|_| Error::TruthEnergy(name.to_string()))?;
        let energy = value * scale;
        if !(energy > 0.0 && energy.is_finite()) {
            return Err(Error::TruthEnergy(name.to_string()));
        }
        return Ok(energy);
    }
    Err(Error::TruthEnergy(name.to_string()))
}
