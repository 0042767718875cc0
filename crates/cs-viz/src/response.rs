//! Response/resolution artifact: one series per cluster collection.

use cs_calo::ResponseTable;
use serde::{Deserialize, Serialize};

/// Curves for the two-panel response figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurvesArtifact {
    /// Format tag.
    pub schema_version: String,
    /// One entry per collection, in request order.
    pub series: Vec<ResponseSeries>,
}

/// Points of one collection, ordered by truth energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSeries {
    /// Collection (branch) name, used as legend label.
    pub collection: String,
    /// Truth energies (GeV).
    pub truth_gev: Vec<f64>,
    /// Fitted mean response.
    pub response_mean: Vec<f64>,
    /// Corrected resolution sigma/E.
    pub resolution: Vec<f64>,
    /// Events passing the noise-floor selection.
    pub n_pass: Vec<usize>,
}

impl ResponseCurvesArtifact {
    /// Largest truth energy over all series.
    pub fn max_truth(&self) -> Option<f64> {
        self.series.iter().flat_map(|s| s.truth_gev.iter().copied()).reduce(f64::max)
    }
}

/// Convert a response table into plot series.
pub fn response_curves_artifact(table: &ResponseTable) -> ResponseCurvesArtifact {
    let series = table
        .collections
        .iter()
        .map(|(name, points)| ResponseSeries {
            collection: name.clone(),
            truth_gev: points.iter().map(|p| p.truth_gev).collect(),
            response_mean: points.iter().map(|p| p.mean).collect(),
            resolution: points.iter().map(|p| p.sigma).collect(),
            n_pass: points.iter().map(|p| p.n_pass).collect(),
        })
        .collect();
    ResponseCurvesArtifact { schema_version: "calostat_response_v0".to_string(), series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_calo::ResponsePoint;

    fn point(truth_gev: f64, mean: f64) -> ResponsePoint {
        ResponsePoint { truth_gev, mean, sigma: 0.1, raw_sigma: 0.1 * (1.0 + mean), n_pass: 10 }
    }

    #[test]
    fn series_follow_table_order() {
        let table = ResponseTable {
            collections: vec![
                ("Topo.energy".into(), vec![point(1.0, 0.02), point(100.0, -0.01)]),
                ("SW.energy".into(), vec![point(5.0, 0.0)]),
            ],
        };
        let art = response_curves_artifact(&table);
        assert_eq!(art.series.len(), 2);
        assert_eq!(art.series[0].collection, "Topo.energy");
        assert_eq!(art.series[0].truth_gev, vec![1.0, 100.0]);
        assert_eq!(art.series[0].response_mean, vec![0.02, -0.01]);
        assert_eq!(art.max_truth(), Some(100.0));

        let json = serde_json::to_string(&art).unwrap();
        let back: ResponseCurvesArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, art);
    }

    #[test]
    fn empty_table() {
        let art = response_curves_artifact(&ResponseTable::default());
        assert!(art.series.is_empty());
        assert_eq!(art.max_truth(), None);
    }
}
