//! # cs-viz
//!
//! Visualization data artifacts for calostat.
//!
//! Artifacts are plain serde structures (arrays rather than nested objects)
//! that the renderer consumes and that can be dumped as JSON for external
//! plotting.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Energy response and resolution curves.
pub mod response;

/// Photon vs neutral-pion shower-shape pages.
pub mod shower_shapes;

pub use response::{ResponseCurvesArtifact, ResponseSeries, response_curves_artifact};
pub use shower_shapes::{
    LayerPage, PANEL_ORDER, ShapePanel, ShowerShapesArtifact, shower_shapes_artifact,
};
