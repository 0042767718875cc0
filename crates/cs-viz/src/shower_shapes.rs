//! Shower-shape comparison artifact: per layer, six panels overlaying the
//! normalized photon and neutral-pion distributions.

use cs_calo::{N_LAYERS, ShapePmf, ShapeVariable, ShowerShapeTable};
use cs_core::Result;
use serde::{Deserialize, Serialize};

/// Panel order on each page, row-major in a 2x3 grid.
pub const PANEL_ORDER: [ShapeVariable; 6] = [
    ShapeVariable::Eratio,
    ShapeVariable::DeltaE,
    ShapeVariable::Fsidepm3,
    ShapeVariable::PhiEratio,
    ShapeVariable::PhiDeltaE,
    ShapeVariable::Fsidepm4,
];

/// All layer pages of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowerShapesArtifact {
    /// Format tag.
    pub schema_version: String,
    /// Sample label shown in page titles (e.g. "50GeV").
    pub label: String,
    /// Common bin edges of every distribution.
    pub bin_edges: Vec<f64>,
    /// Layers 1..=11 in order.
    pub layers: Vec<LayerPage>,
}

/// One output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPage {
    /// Layer number (1-based).
    pub layer: usize,
    /// Page title, `Layer <n>, <label>`.
    pub title: String,
    /// Panels in [`PANEL_ORDER`].
    pub panels: Vec<ShapePanel>,
}

/// One variable in one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePanel {
    /// Variable key name (`"phi_Eratio"`, ...).
    pub variable: String,
    /// Panel title.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Displayed x range.
    pub x_range: [f64; 2],
    /// Normalized photon distribution.
    pub photon: Vec<f64>,
    /// Normalized neutral-pion distribution.
    pub pion: Vec<f64>,
    /// Photon events entering the distribution.
    pub photon_entries: usize,
    /// Neutral-pion events entering the distribution.
    pub pion_entries: usize,
}

fn panel_text(var: ShapeVariable) -> (&'static str, &'static str, [f64; 2]) {
    match var {
        ShapeVariable::Eratio => ("Energy Ratio", "Energy Ratio", [0.0, 1.01]),
        ShapeVariable::DeltaE => ("\u{0394}E", "\u{0394}E [GeV]", [0.0, 1.03]),
        ShapeVariable::Fsidepm3 => ("F_side \u{00B1}3", "F_side", [0.0, 1.03]),
        ShapeVariable::PhiEratio => ("Energy Ratio in phi", "Energy Ratio", [0.0, 1.03]),
        ShapeVariable::PhiDeltaE => ("\u{0394}E in phi", "\u{0394}E [GeV]", [0.0, 1.03]),
        ShapeVariable::Fsidepm4 => ("F_side \u{00B1}4", "F_side", [0.0, 1.03]),
    }
}

/// Build all eleven layer pages from the photon and pion tables.
pub fn shower_shapes_artifact(
    photon: &ShowerShapeTable,
    pion: &ShowerShapeTable,
    label: &str,
) -> Result<ShowerShapesArtifact> {
    let mut bin_edges = Vec::new();
    let mut layers = Vec::with_capacity(N_LAYERS);
    for layer in 1..=N_LAYERS {
        let mut panels = Vec::with_capacity(PANEL_ORDER.len());
        for var in PANEL_ORDER {
            let photon_values = photon.column(var, layer)?;
            let pion_values = pion.column(var, layer)?;
            let photon_pmf = ShapePmf::from_values(photon_values)?;
            let pion_pmf = ShapePmf::from_values(pion_values)?;
            if bin_edges.is_empty() {
                bin_edges = photon_pmf.bin_edges.clone();
            }
            let (title, x_label, x_range) = panel_text(var);
            panels.push(ShapePanel {
                variable: var.as_str().to_string(),
                title: title.to_string(),
                x_label: x_label.to_string(),
                x_range,
                photon: photon_pmf.pmf,
                pion: pion_pmf.pmf,
                photon_entries: photon_values.len(),
                pion_entries: pion_values.len(),
            });
        }
        layers.push(LayerPage { layer, title: format!("Layer {layer}, {label}"), panels });
    }
    Ok(ShowerShapesArtifact {
        schema_version: "calostat_shower_shapes_v0".to_string(),
        label: label.to_string(),
        bin_edges,
        layers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_calo::STRIDE;
    use cs_root::JaggedCol;

    fn table(n_events: usize, value: f64) -> ShowerShapeTable {
        let rows: Vec<Vec<f64>> = (0..n_events).map(|_| vec![value; STRIDE]).collect();
        ShowerShapeTable::from_jagged(&JaggedCol::from_rows(&rows))
    }

    #[test]
    fn eleven_pages_of_six_panels() {
        let art = shower_shapes_artifact(&table(3, 0.4), &table(5, 0.8), "50GeV").unwrap();
        assert_eq!(art.layers.len(), 11);
        assert_eq!(art.bin_edges.len(), 50);
        let page = &art.layers[6];
        assert_eq!(page.title, "Layer 7, 50GeV");
        let names: Vec<&str> = page.panels.iter().map(|p| p.variable.as_str()).collect();
        assert_eq!(names, ["Eratio", "DeltaE", "fsidepm3", "phi_Eratio", "phi_DeltaE", "fsidepm4"]);
        assert_eq!(page.panels[0].x_range, [0.0, 1.01]);
        assert!(page.panels[1..].iter().all(|p| p.x_range == [0.0, 1.03]));
        assert_eq!(page.panels[2].photon_entries, 3);
        assert_eq!(page.panels[2].pion_entries, 5);
        assert_eq!(page.panels[2].photon.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn empty_sample_gives_zero_distributions() {
        let art = shower_shapes_artifact(&table(0, 0.0), &table(2, 0.5), "10GeV").unwrap();
        let panel = &art.layers[0].panels[0];
        assert_eq!(panel.photon_entries, 0);
        assert!(panel.photon.iter().all(|&p| p == 0.0));
    }
}
