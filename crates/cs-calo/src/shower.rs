//! Per-layer shower-shape variables decoded from the packed parameter record.
//!
//! Each reconstructed cluster stores 189 values: 17 variables for each of the
//! 11 calorimeter layers, followed by 2 trailing values. Value `v` of layer
//! `l` (1-based) sits at `offset(v) + (l - 1) * 17`.

use std::fmt;
use std::str::FromStr;

use cs_core::{Error, Result};
use cs_root::JaggedCol;
use serde::{Deserialize, Serialize};

/// Values per cluster record.
pub const STRIDE: usize = 189;
/// Calorimeter layers in a record.
pub const N_LAYERS: usize = 11;
/// Distance between the same variable in consecutive layers.
pub const LAYER_STEP: usize = 17;

/// The shower-shape variables extracted from each layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeVariable {
    /// Ratio of the two highest energy maxima along eta.
    Eratio,
    /// Energy difference between the second maximum and the minimum in between.
    DeltaE,
    /// `Eratio` along phi.
    PhiEratio,
    /// `DeltaE` along phi.
    PhiDeltaE,
    /// Side energy fraction in +-3 cells.
    Fsidepm3,
    /// Side energy fraction in +-4 cells.
    Fsidepm4,
}

impl ShapeVariable {
    /// All variables, in record order.
    pub const ALL: [ShapeVariable; 6] = [
        ShapeVariable::Eratio,
        ShapeVariable::DeltaE,
        ShapeVariable::PhiEratio,
        ShapeVariable::PhiDeltaE,
        ShapeVariable::Fsidepm3,
        ShapeVariable::Fsidepm4,
    ];

    /// Offset of the variable within layer 1.
    pub fn offset(self) -> usize {
        match self {
            ShapeVariable::Eratio => 6,
            ShapeVariable::DeltaE => 7,
            ShapeVariable::PhiEratio => 8,
            ShapeVariable::PhiDeltaE => 9,
            ShapeVariable::Fsidepm3 => 15,
            ShapeVariable::Fsidepm4 => 16,
        }
    }

    /// Name used in lookup keys (`"phi_Eratio"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeVariable::Eratio => "Eratio",
            ShapeVariable::DeltaE => "DeltaE",
            ShapeVariable::PhiEratio => "phi_Eratio",
            ShapeVariable::PhiDeltaE => "phi_DeltaE",
            ShapeVariable::Fsidepm3 => "fsidepm3",
            ShapeVariable::Fsidepm4 => "fsidepm4",
        }
    }

    /// Position of `layer` (1-based) in a cluster record.
    pub fn index(self, layer: usize) -> usize {
        self.offset() + (layer - 1) * LAYER_STEP
    }
}

impl fmt::Display for ShapeVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeVariable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown shower-shape variable '{s}'")))
    }
}

/// Shower-shape values of single-cluster events, one column per (variable, layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowerShapeTable {
    n_events: usize,
    n_rejected: usize,
    columns: Vec<Vec<f64>>,
}

impl ShowerShapeTable {
    /// Decode a per-event parameter column.
    ///
    /// Only events holding exactly one cluster record (`STRIDE` values) are
    /// kept; all others are skipped whole.
    pub fn from_jagged(params: &JaggedCol) -> Self {
        let mut columns = vec![Vec::new(); ShapeVariable::ALL.len() * N_LAYERS];
        let mut n_events = 0;
        for row in params.rows().filter(|r| r.len() == STRIDE) {
            for var in ShapeVariable::ALL {
                for layer in 1..=N_LAYERS {
                    columns[slot(var, layer)].push(row[var.index(layer)]);
                }
            }
            n_events += 1;
        }
        let n_rejected = params.n_entries() - n_events;
        log::debug!("shower shapes: kept {n_events} single-cluster events, skipped {n_rejected}");
        Self { n_events, n_rejected, columns }
    }

    /// Number of events kept.
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Number of events skipped because they did not hold exactly one cluster.
    pub fn n_rejected(&self) -> usize {
        self.n_rejected
    }

    /// Values of `var` in `layer` (1..=11), one per kept event.
    pub fn column(&self, var: ShapeVariable, layer: usize) -> Result<&[f64]> {
        if !(1..=N_LAYERS).contains(&layer) {
            return Err(Error::Validation(format!("layer {layer} outside 1..={N_LAYERS}")));
        }
        Ok(&self.columns[slot(var, layer)])
    }

    /// Lookup by key `"<variable>_<layer>"`, e.g. `"phi_DeltaE_4"`.
    pub fn by_key(&self, key: &str) -> Result<&[f64]> {
        let (name, layer) = key
            .rsplit_once('_')
            .ok_or_else(|| Error::Validation(format!("malformed shower-shape key '{key}'")))?;
        let layer: usize = layer
            .parse()
            .map_err(|_| Error::Validation(format!("malformed layer in key '{key}'")))?;
        self.column(name.parse()?, layer)
    }
}

fn slot(var: ShapeVariable, layer: usize) -> usize {
    var as usize * N_LAYERS + (layer - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record whose value at position `i` is `base + i`.
    fn record(base: f64) -> Vec<f64> {
        (0..STRIDE).map(|i| base + i as f64).collect()
    }

    #[test]
    fn offsets_and_indices() {
        assert_eq!(ShapeVariable::Eratio.index(1), 6);
        assert_eq!(ShapeVariable::Fsidepm4.index(11), 16 + 10 * 17);
        assert!(ShapeVariable::ALL.iter().all(|v| v.index(N_LAYERS) < STRIDE));
    }

    #[test]
    fn only_single_cluster_events_kept() {
        let col = JaggedCol::from_rows([record(0.0), record(1000.0)[..188].to_vec(), vec![], record(2000.0)]);
        let table = ShowerShapeTable::from_jagged(&col);
        assert_eq!(table.n_events(), 2);
        assert_eq!(table.n_rejected(), 2);
        assert_eq!(table.column(ShapeVariable::Eratio, 1).unwrap(), &[6.0, 2006.0]);
        assert_eq!(table.column(ShapeVariable::PhiDeltaE, 3).unwrap(), &[9.0 + 34.0, 2043.0]);
    }

    #[test]
    fn two_cluster_event_is_skipped() {
        let mut double = record(0.0);
        double.extend(record(500.0));
        let table = ShowerShapeTable::from_jagged(&JaggedCol::from_rows([double]));
        assert_eq!(table.n_events(), 0);
        assert!(table.column(ShapeVariable::DeltaE, 2).unwrap().is_empty());
    }

    #[test]
    fn matches_strided_slice_of_flattened_records() {
        let rows: Vec<Vec<f64>> = (0..5).map(|e| record(e as f64 * 1e4)).collect();
        let flat: Vec<f64> = rows.concat();
        let table = ShowerShapeTable::from_jagged(&JaggedCol::from_rows(&rows));
        for var in ShapeVariable::ALL {
            for layer in 1..=N_LAYERS {
                let expected: Vec<f64> = flat.iter().skip(var.index(layer)).step_by(STRIDE).copied().collect();
                assert_eq!(table.column(var, layer).unwrap(), expected.as_slice());
            }
        }
    }

    #[test]
    fn key_lookup() {
        let table = ShowerShapeTable::from_jagged(&JaggedCol::from_rows([record(0.0)]));
        assert_eq!(table.by_key("phi_DeltaE_4").unwrap(), &[9.0 + 3.0 * 17.0]);
        assert_eq!(table.by_key("fsidepm3_11").unwrap(), &[15.0 + 170.0]);
        assert!(table.by_key("Eratio_12").is_err());
        assert!(table.by_key("Eratio_0").is_err());
        assert!(table.by_key("Width_1").is_err());
        assert!(table.by_key("Eratio").is_err());
    }

    #[test]
    fn names_round_trip() {
        for var in ShapeVariable::ALL {
            assert_eq!(var.to_string().parse::<ShapeVariable>().unwrap(), var);
        }
    }
}
