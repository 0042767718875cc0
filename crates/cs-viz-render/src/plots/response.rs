use cs_viz::{ResponseCurvesArtifact, ResponseSeries};

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::draw_panel_title;
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind, LegendPosition};
use crate::layout::margins::PlotArea;
use crate::layout::multi_panel::StackedLayout;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

const X_LABEL: &str = "Truth energy [GeV]";

/// Two stacked panels: mean response on top, corrected resolution below.
pub fn render(artifact: &ResponseCurvesArtifact, config: &VizConfig) -> crate::Result<String> {
    let rc = &config.response;
    let mut canvas = Canvas::new(rc.width, rc.height)?;

    let x_max = match artifact.max_truth() {
        Some(m) if m >= rc.x_range[1] => m * 1.05,
        _ => rc.x_range[1],
    };
    let x_axis = Axis::linear(rc.x_range[0], x_max, 7).with_label(X_LABEL);
    let mean_axis = Axis::linear(rc.mean_range[0], rc.mean_range[1], 5)
        .with_label("\u{27E8}(E_rec \u{2212} E_true)/E_true\u{27E9}");
    let resolution_axis =
        Axis::linear(rc.resolution_range[0], rc.resolution_range[1], 7).with_label("\u{03C3}_E/E");

    let outer = PlotArea::manual(0.0, 0.0, rc.width, rc.height);
    let stacked = StackedLayout::new(outer.left, outer.top, outer.width, outer.height, 0.0, 2);
    let panels = [
        ("Energy response", &mean_axis, Quantity::Mean, &stacked.panels[0]),
        ("Energy resolution", &resolution_axis, Quantity::Resolution, &stacked.panels[1]),
    ];

    let palette = config.palette_colors();
    for (title, y_axis, quantity, cell) in panels {
        let area = PlotArea::inset_for_axes(*cell, &canvas, y_axis, &x_axis, true, config);
        draw_panel_title(&mut canvas, &area, title, config);
        draw_axes(&mut canvas, &area, &x_axis, y_axis, true, config);

        canvas.push_clip(area.left, area.top, area.width, area.height);
        let mut entries = Vec::with_capacity(artifact.series.len());
        for (i, series) in artifact.series.iter().enumerate() {
            let color = palette[i % palette.len()];
            let marker = series_marker(i, color, rc.marker_size);
            for (x, y) in quantity.points(series) {
                if !y.is_finite() {
                    continue;
                }
                let px = x_axis.data_to_pixel(x, area.left, area.right());
                let py = y_axis.data_to_pixel(y, area.bottom(), area.top);
                canvas.marker(px, py, &marker);
            }
            entries.push(LegendEntry {
                label: series.collection.clone(),
                kind: LegendKind::Marker(marker),
            });
        }
        canvas.pop_clip();

        legend::draw_legend(&mut canvas, &area, &entries, config.font.size, LegendPosition::TopLeft);
    }

    Ok(canvas.finish_svg())
}

#[derive(Clone, Copy)]
enum Quantity {
    Mean,
    Resolution,
}

impl Quantity {
    fn points(self, s: &ResponseSeries) -> impl Iterator<Item = (f64, f64)> + '_ {
        let ys = match self {
            Quantity::Mean => &s.response_mean,
            Quantity::Resolution => &s.resolution,
        };
        s.truth_gev.iter().copied().zip(ys.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ResponseCurvesArtifact {
        let series = |name: &str, offset: f64| ResponseSeries {
            collection: name.to_string(),
            truth_gev: vec![10.0, 50.0, 100.0],
            response_mean: vec![-0.02 + offset, -0.01 + offset, offset],
            resolution: vec![0.12, 0.06, 0.04],
            n_pass: vec![900, 950, 990],
        };
        ResponseCurvesArtifact {
            schema_version: "calostat_response_v0".into(),
            series: vec![series("CaloClusters.energy", 0.0), series("TopoClusters.energy", 0.01)],
        }
    }

    #[test]
    fn two_panels_with_legend() {
        let svg = render(&artifact(), &VizConfig::default()).unwrap();
        assert!(svg.contains("Energy response"));
        assert!(svg.contains("Energy resolution"));
        assert!(svg.contains("Truth energy [GeV]"));
        // Legend once per panel.
        assert_eq!(svg.matches("CaloClusters.energy").count(), 2);
        assert_eq!(svg.matches("TopoClusters.energy").count(), 2);
        // 3 points x 2 panels as circles for the first series, plus legend markers.
        assert!(svg.matches("<circle").count() >= 8);
        assert_eq!(svg.matches("<clipPath").count(), 2);
    }

    #[test]
    fn empty_artifact_draws_frames() {
        let art = ResponseCurvesArtifact { schema_version: "calostat_response_v0".into(), series: vec![] };
        let svg = render(&art, &VizConfig::default()).unwrap();
        assert!(svg.contains("Energy resolution"));
        assert!(!svg.contains("<circle"));
    }
}
