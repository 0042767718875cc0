use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Height reserved for a page title.
pub fn page_title_height(config: &VizConfig) -> f64 {
    config.font.title_size * 1.4 + 16.0
}

/// Bold centred title across the top of the page (e.g. `Layer 3, 50GeV`).
pub fn draw_page_title(canvas: &mut Canvas, title: &str, config: &VizConfig) {
    if title.is_empty() {
        return;
    }
    let style = TextStyle {
        size: config.font.title_size * 1.4,
        color: Color::rgb(0, 0, 0),
        weight: FontWeight::Bold,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
    };
    canvas.text(canvas.width / 2.0, 8.0, title, &style);
}

/// Panel title just above the plot frame.
pub fn draw_panel_title(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &VizConfig) {
    let style = TextStyle {
        size: config.font.title_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Alphabetic,
        ..Default::default()
    };
    canvas.text(area.left + area.width / 2.0, area.top - 6.0, title, &style);
}
