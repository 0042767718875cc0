use cs_viz::{LayerPage, ShapePanel, ShowerShapesArtifact};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::header::{draw_page_title, draw_panel_title, page_title_height};
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind, LegendPosition};
use crate::layout::margins::PlotArea;
use crate::layout::multi_panel::GridLayout;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

const Y_LABEL: &str = "Fraction of Entries per Bin";
const PION: &str = "\u{03C0}\u{2070}";
const PHOTON: &str = "\u{03B3}";

/// One page: a 2x3 grid of photon vs pion overlays for one layer.
pub fn render_page(
    artifact: &ShowerShapesArtifact,
    page: &LayerPage,
    config: &VizConfig,
) -> crate::Result<String> {
    let edges = &artifact.bin_edges;
    if edges.len() < 2 {
        return Err(crate::RenderError::Layout("shower-shape artifact has no bin edges".into()));
    }
    let sc = &config.shower;
    let mut canvas = Canvas::new(sc.width, sc.height)?;

    draw_page_title(&mut canvas, &page.title, config);
    let title_h = page_title_height(config);
    let body = PlotArea::manual(0.0, title_h, sc.width, sc.height - title_h);
    let grid = GridLayout::new(body, 2, 3);

    for (panel, cell) in page.panels.iter().zip(&grid.cells) {
        if panel.photon.len() + 1 != edges.len() || panel.pion.len() + 1 != edges.len() {
            return Err(crate::RenderError::Layout(format!(
                "layer {} {}: {} edges for {}/{} bins",
                page.layer,
                panel.variable,
                edges.len(),
                panel.photon.len(),
                panel.pion.len()
            )));
        }
        draw_panel(&mut canvas, *cell, edges, panel, config);
    }

    Ok(canvas.finish_svg())
}

fn draw_panel(canvas: &mut Canvas, cell: PlotArea, edges: &[f64], panel: &ShapePanel, config: &VizConfig) {
    let y_max = panel.photon.iter().chain(&panel.pion).copied().fold(0.0_f64, f64::max);
    let x_axis = Axis::linear(panel.x_range[0], panel.x_range[1], 6).with_label(panel.x_label.as_str());
    let y_axis = Axis::auto_log(config.shower.y_floor, y_max).with_label(Y_LABEL);

    let area = PlotArea::inset_for_axes(cell, canvas, &y_axis, &x_axis, true, config);
    draw_panel_title(canvas, &area, &panel.title, config);
    draw_axes(canvas, &area, &x_axis, &y_axis, true, config);

    let colors = &config.colors;
    canvas.push_clip(area.left, area.top, area.width, area.height);
    step_filled(canvas, &area, &x_axis, &y_axis, edges, &panel.pion, colors.pion_fill, colors.pion_edge);
    step_filled(canvas, &area, &x_axis, &y_axis, edges, &panel.photon, colors.photon_fill, colors.photon_edge);
    canvas.pop_clip();

    draw_entries_box(canvas, &area, panel, config);
    legend::draw_legend(
        canvas,
        &area,
        &[
            LegendEntry {
                label: PION.into(),
                kind: LegendKind::FilledRect { fill: colors.pion_fill, edge: colors.pion_edge },
            },
            LegendEntry {
                label: PHOTON.into(),
                kind: LegendKind::FilledRect { fill: colors.photon_fill, edge: colors.photon_edge },
            },
        ],
        config.font.size,
        LegendPosition::TopRight,
    );
}

/// Filled step outline of a histogram; empty bins drop to the axis floor.
#[allow(clippy::too_many_arguments)]
fn step_filled(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    edges: &[f64],
    values: &[f64],
    fill: Color,
    edge: Color,
) {
    let px = |x: f64| x_axis.data_to_pixel(x, area.left, area.right());
    let py = |y: f64| y_axis.data_to_pixel(y.max(y_axis.min), area.bottom(), area.top);

    let base = area.bottom();
    let mut points = Vec::with_capacity(2 * values.len() + 2);
    points.push((px(edges[0]), base));
    for (i, &v) in values.iter().enumerate() {
        let y = py(v);
        points.push((px(edges[i]), y));
        points.push((px(edges[i + 1]), y));
    }
    points.push((px(edges[values.len()]), base));

    let style = Style::edged(fill, edge, 1.7);
    canvas.polygon(&points, &style);
}

/// Entry counts of both samples in a translucent box.
fn draw_entries_box(canvas: &mut Canvas, area: &PlotArea, panel: &ShapePanel, config: &VizConfig) {
    let style = TextStyle { size: config.font.size, baseline: TextBaseline::Hanging, ..Default::default() };
    let lines = [
        "Entries".to_string(),
        format!("{PION}: {}", panel.pion_entries),
        format!("{PHOTON}: {}", panel.photon_entries),
    ];
    let line_h = style.size * 1.25;
    let pad = 4.0;
    let w = lines.iter().map(|l| canvas.measure_text(l, &style).width).fold(0.0_f64, f64::max) + 2.0 * pad;
    let h = lines.len() as f64 * line_h + 2.0 * pad;

    let x = area.left + 0.42 * area.width;
    let y = area.top + 0.16 * area.height - h;
    let y = y.max(area.top + 2.0);
    let bg = Style::edged(Color::rgb(255, 255, 255).with_alpha(0.6), Color::rgb(128, 128, 128), 0.8);
    canvas.rect(x, y, w, h, &bg);
    for (i, line) in lines.iter().enumerate() {
        canvas.text(x + pad, y + pad + i as f64 * line_h, line, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_calo::{N_LAYERS, STRIDE, ShowerShapeTable};
    use cs_root::JaggedCol;
    use cs_viz::shower_shapes_artifact;

    fn table(values: &[f64]) -> ShowerShapeTable {
        let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v; STRIDE]).collect();
        ShowerShapeTable::from_jagged(&JaggedCol::from_rows(&rows))
    }

    fn artifact() -> ShowerShapesArtifact {
        shower_shapes_artifact(&table(&[0.1, 0.5, 0.5, 0.9]), &table(&[0.3, 0.31, 2.0]), "50GeV").unwrap()
    }

    #[test]
    fn page_has_six_panels() {
        let art = artifact();
        let svg = render_page(&art, &art.layers[2], &VizConfig::default()).unwrap();
        assert!(svg.contains("Layer 3, 50GeV"));
        assert_eq!(svg.matches(Y_LABEL).count(), 6);
        assert_eq!(svg.matches("<clipPath").count(), 6);
        // Two filled histograms per panel.
        assert_eq!(svg.matches("<polygon").count(), 12);
        assert!(svg.contains(&format!("{PION}: 3")));
        assert!(svg.contains(&format!("{PHOTON}: 4")));
    }

    #[test]
    fn all_layers_render() {
        let art = artifact();
        let pages = crate::render_shower_pages_svg(&art, &VizConfig::default()).unwrap();
        assert_eq!(pages.len(), N_LAYERS);
        assert!(pages[10].contains("Layer 11, 50GeV"));
    }

    #[test]
    fn mismatched_bins_rejected() {
        let mut art = artifact();
        art.layers[0].panels[1].pion.pop();
        assert!(matches!(
            render_page(&art, &art.layers[0], &VizConfig::default()),
            Err(crate::RenderError::Layout(_))
        ));
    }
}
