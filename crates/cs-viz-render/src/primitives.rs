//! Drawing styles shared by the canvas and the figure renderers.

use crate::color::Color;

/// Fill and outline of a closed shape.
#[derive(Debug, Clone)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Style {
    /// Outline only.
    pub fn outline(color: Color, width: f64) -> Self {
        Self { fill: None, stroke: Some(color), stroke_width: width }
    }

    /// Filled shape drawn with an edge of `width`.
    pub fn edged(fill: Color, edge: Color, width: f64) -> Self {
        Self { fill: Some(fill), stroke: Some(edge), stroke_width: width }
    }
}

/// Stroke for lines and polylines; `dash` is an SVG dash array.
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<String>,
}

impl LineStyle {
    /// Continuous line.
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: None }
    }
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub weight: FontWeight,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color::rgb(0, 0, 0),
            weight: FontWeight::Regular,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Horizontal alignment, written as `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Vertical alignment, written as `dominant-baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Central,
    Hanging,
}

impl TextAnchor {
    pub fn svg_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl TextBaseline {
    pub fn svg_value(self) -> &'static str {
        match self {
            Self::Alphabetic => "auto",
            Self::Central => "central",
            Self::Hanging => "hanging",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    TriangleUp,
    TriangleDown,
}

/// Data-point marker; open markers get a white interior.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub size: f64,
    pub color: Color,
    pub fill: bool,
}

/// Marker of the `index`-th series: full circle, full square, full triangles,
/// then open circle and open square.
pub fn series_marker(index: usize, color: Color, size: f64) -> MarkerStyle {
    const CYCLE: [(MarkerShape, bool); 6] = [
        (MarkerShape::Circle, true),
        (MarkerShape::Square, true),
        (MarkerShape::TriangleUp, true),
        (MarkerShape::TriangleDown, true),
        (MarkerShape::Circle, false),
        (MarkerShape::Square, false),
    ];
    let (shape, fill) = CYCLE[index % CYCLE.len()];
    MarkerStyle { shape, size, color, fill }
}
