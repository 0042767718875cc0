use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Which frame edge a set of ticks belongs to.
#[derive(Clone, Copy)]
enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

/// Tick marks along one frame edge. Positive `len` points into the plot.
fn edge_ticks(canvas: &mut Canvas, area: &PlotArea, edge: Edge, at: &[f64], len: f64, style: &LineStyle) {
    for &p in at {
        match edge {
            Edge::Bottom => canvas.line(p, area.bottom(), p, area.bottom() - len, style),
            Edge::Top => canvas.line(p, area.top, p, area.top + len, style),
            Edge::Left => canvas.line(area.left, p, area.left + len, p, style),
            Edge::Right => canvas.line(area.right(), p, area.right() - len, p, style),
        }
    }
}

/// Pixel positions of `values` that fall on the axis span, paired with their index.
fn visible(values: &[f64], to_px: impl Fn(f64) -> f64, lo: f64, hi: f64) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, to_px(v)))
        .filter(|(_, px)| *px >= lo - 0.5 && *px <= hi + 0.5)
        .collect()
}

/// Box frame with ticks on all requested edges, optional dashed grid, tick labels and axis titles.
///
/// `show_x_labels` suppresses x tick labels and the x title for panels stacked above another.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    show_x_labels: bool,
    config: &VizConfig,
) {
    let black = Color::rgb(0, 0, 0);
    let major = LineStyle::solid(black, 0.6);
    let minor = LineStyle::solid(black, 0.4);
    let inward = config.axes.tick_direction == "in";
    let sign = if inward { 1.0 } else { -1.0 };
    let (tl, mtl) = (config.axes.tick_length * sign, config.axes.minor_tick_length * sign);
    // Outward ticks push labels further out.
    let outset = if inward { 0.0 } else { config.axes.tick_length };

    let to_x = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let to_y = |v: f64| y_axis.data_to_pixel(v, area.bottom(), area.top);
    let x_major = visible(&x_axis.tick_positions, to_x, area.left, area.right());
    let y_major = visible(&y_axis.tick_positions, to_y, area.top, area.bottom());
    let x_minor: Vec<f64> =
        visible(&x_axis.minor_ticks, to_x, area.left, area.right()).into_iter().map(|(_, p)| p).collect();
    let y_minor: Vec<f64> =
        visible(&y_axis.minor_ticks, to_y, area.top, area.bottom()).into_iter().map(|(_, p)| p).collect();
    let x_px: Vec<f64> = x_major.iter().map(|(_, p)| *p).collect();
    let y_px: Vec<f64> = y_major.iter().map(|(_, p)| *p).collect();

    if config.grid.show {
        let grid = LineStyle {
            color: config.grid.color.with_alpha(config.grid.alpha),
            width: 0.5,
            dash: Some("3 3".into()),
        };
        for &px in &x_px {
            canvas.line(px, area.top, px, area.bottom(), &grid);
        }
        for &py in &y_px {
            canvas.line(area.left, py, area.right(), py, &grid);
        }
    }

    edge_ticks(canvas, area, Edge::Bottom, &x_px, tl, &major);
    edge_ticks(canvas, area, Edge::Bottom, &x_minor, mtl, &minor);
    edge_ticks(canvas, area, Edge::Left, &y_px, tl, &major);
    edge_ticks(canvas, area, Edge::Left, &y_minor, mtl, &minor);
    if config.axes.show_top_ticks {
        edge_ticks(canvas, area, Edge::Top, &x_px, tl, &major);
        edge_ticks(canvas, area, Edge::Top, &x_minor, mtl, &minor);
    }
    if config.axes.show_right_ticks {
        edge_ticks(canvas, area, Edge::Right, &y_px, tl, &major);
        edge_ticks(canvas, area, Edge::Right, &y_minor, mtl, &minor);
    }

    let frame = Style::outline(black, 0.8);
    canvas.rect(area.left, area.top, area.width, area.height, &frame);

    let x_tick_text = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    let y_tick_text = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let title_text = TextStyle { size: config.font.label_size, anchor: TextAnchor::Middle, ..Default::default() };

    let x_label_y = area.bottom() + 3.0 + outset;
    if show_x_labels {
        for (i, px) in &x_major {
            if let Some(label) = x_axis.tick_labels.get(*i) {
                canvas.text(*px, x_label_y, label, &x_tick_text);
            }
        }
        if !x_axis.label.is_empty() {
            let y = x_label_y + config.font.tick_size + config.font.label_size + 4.0;
            canvas.text(area.left + area.width / 2.0, y, &x_axis.label, &title_text);
        }
    }

    let y_label_x = area.left - 4.0 - outset;
    let mut widest: f64 = 0.0;
    for (i, py) in &y_major {
        if let Some(label) = y_axis.tick_labels.get(*i) {
            widest = widest.max(canvas.measure_text(label, &y_tick_text).width);
            canvas.text(y_label_x, *py, label, &y_tick_text);
        }
    }
    if !y_axis.label.is_empty() {
        let x = y_label_x - widest - 8.0;
        canvas.text_rotated(x, area.top + area.height / 2.0, &y_axis.label, &title_text, -90.0);
    }
}
