use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::{MarkerStyle, Style, TextBaseline, TextStyle};

/// One legend row: a swatch and its label.
pub struct LegendEntry {
    pub label: String,
    pub kind: LegendKind,
}

pub enum LegendKind {
    /// Filled histogram swatch with its edge colour.
    FilledRect { fill: Color, edge: Color },
    Marker(MarkerStyle),
}

/// Corner of the plot area the legend box is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    TopLeft,
    TopRight,
}

const SWATCH_W: f64 = 14.0;
const GAP: f64 = 6.0;
const PAD: f64 = 6.0;
const INSET: f64 = 5.0;

/// Draw `entries` in a boxed column inside `area`.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    position: LegendPosition,
) {
    if entries.is_empty() {
        return;
    }

    let label = TextStyle { size: 0.85 * font_size, baseline: TextBaseline::Central, ..Default::default() };
    let row_h = font_size + 4.0;
    let label_w =
        entries.iter().map(|e| canvas.measure_text(&e.label, &label).width).fold(0.0_f64, f64::max);
    let box_w = 2.0 * PAD + SWATCH_W + GAP + label_w;
    let box_h = 2.0 * PAD + row_h * entries.len() as f64;

    let x0 = match position {
        LegendPosition::TopLeft => area.left + INSET,
        LegendPosition::TopRight => area.right() - box_w - INSET,
    };
    let y0 = area.top + INSET;
    let frame = Style::edged(Color::rgb(255, 255, 255).with_alpha(0.9), Color::rgb(200, 200, 200), 0.5);
    canvas.rect(x0, y0, box_w, box_h, &frame);

    let swatch_h = font_size - 2.0;
    let sx = x0 + PAD;
    for (row, entry) in entries.iter().enumerate() {
        let cy = y0 + PAD + row_h * (row as f64 + 0.5);
        match &entry.kind {
            LegendKind::FilledRect { fill, edge } => {
                canvas.rect(sx, cy - 0.5 * swatch_h, SWATCH_W, swatch_h, &Style::edged(*fill, *edge, 1.0));
            }
            LegendKind::Marker(marker) => canvas.marker(sx + 0.5 * SWATCH_W, cy, marker),
        }
        canvas.text(sx + SWATCH_W + GAP, cy, &entry.label, &label);
    }
}
