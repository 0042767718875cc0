use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Shrink a cell to leave room for tick labels, axis labels and a title.
    pub fn inset_for_axes(
        cell: PlotArea,
        canvas: &Canvas,
        y_axis: &Axis,
        x_axis: &Axis,
        title: bool,
        config: &VizConfig,
    ) -> Self {
        let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };

        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        let mut left = 10.0 + max_tick_w + 8.0;
        if !y_axis.label.is_empty() {
            left += config.font.label_size + 6.0;
        }

        let mut bottom = 8.0 + config.font.tick_size + 6.0;
        if !x_axis.label.is_empty() {
            bottom += config.font.label_size + 6.0;
        }

        let top = if title { config.font.title_size + 12.0 } else { 8.0 };
        let right = 12.0;

        Self {
            left: cell.left + left,
            top: cell.top + top,
            width: (cell.width - left - right).max(20.0),
            height: (cell.height - top - bottom).max(20.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_stays_inside_cell() {
        let canvas = Canvas::new(400.0, 300.0).unwrap();
        let config = VizConfig::default();
        let cell = PlotArea::manual(100.0, 50.0, 300.0, 250.0);
        let x = Axis::linear(0.0, 1.03, 6).with_label("x");
        let y = Axis::log(1e-4, 1.0).with_label("y");
        let inner = PlotArea::inset_for_axes(cell, &canvas, &y, &x, true, &config);
        assert!(inner.left > cell.left && inner.top > cell.top);
        assert!(inner.right() < cell.right() && inner.bottom() < cell.bottom());
    }
}
