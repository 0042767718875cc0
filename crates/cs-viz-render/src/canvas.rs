use std::fmt::{self, Write as FmtWrite};

use crate::color::Color;
use crate::primitives::*;
use crate::text::{TextMetrics, measure_text};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect { x: f64, y: f64, w: f64, h: f64, style: Style },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle },
    Polyline { points: Vec<(f64, f64)>, style: LineStyle },
    Polygon { points: Vec<(f64, f64)>, style: Style },
    Text { x: f64, y: f64, content: String, style: TextStyle, rotate: Option<f64> },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
}

/// Immediate-mode SVG canvas. Coordinates in points (1pt = 1/72").
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    elements: Vec<(SvgElement, Option<String>)>,
    defs: Vec<String>,
    clip_stack: Vec<String>,
    next_clip_id: usize,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> crate::Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(crate::RenderError::Layout(format!("invalid canvas size {width}x{height}")));
        }
        Ok(Self {
            width,
            height,
            elements: Vec::new(),
            defs: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
        })
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.push(SvgElement::Polygon { points: points.to_vec(), style: style.clone() });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Data marker centred on `(x, y)`.
    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let style = if marker.fill {
            Style::edged(marker.color, marker.color, 0.5)
        } else {
            Style::edged(Color::rgb(255, 255, 255), marker.color, 1.0)
        };
        let s = marker.size;
        match marker.shape {
            MarkerShape::Circle => self.circle(x, y, s, &style),
            MarkerShape::Square => self.rect(x - s, y - s, 2.0 * s, 2.0 * s, &style),
            MarkerShape::TriangleUp => {
                self.polygon(&[(x, y - 1.2 * s), (x + 1.1 * s, y + 0.8 * s), (x - 1.1 * s, y + 0.8 * s)], &style)
            }
            MarkerShape::TriangleDown => {
                self.polygon(&[(x, y + 1.2 * s), (x + 1.1 * s, y - 0.8 * s), (x - 1.1 * s, y - 0.8 * s)], &style)
            }
        }
    }

    // --- Clip paths ---

    /// Clip subsequent elements to a rectangle until [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.push(id.clone());
        id
    }

    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        measure_text(content, style)
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        let clip = self.clip_stack.last().cloned();
        self.elements.push((elem, clip));
    }

    pub fn finish_svg(&self) -> String {
        let mut out = String::with_capacity(32 * 1024);
        // Formatting into a String cannot fail.
        let _ = self.write_svg(&mut out);
        out
    }

    fn write_svg(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height)?;

        for (elem, clip) in &self.elements {
            if let Some(id) = clip {
                write!(out, r#"<g clip-path="url(#{id})">"#)?;
                render_element(out, elem)?;
                out.push_str("</g>\n");
            } else {
                render_element(out, elem)?;
            }
        }

        out.push_str("</svg>\n");
        Ok(())
    }
}

fn write_points(out: &mut String, points: &[(f64, f64)]) -> fmt::Result {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{x:.2},{y:.2}")?;
    }
    Ok(())
}

fn render_element(out: &mut String, elem: &SvgElement) -> fmt::Result {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#)?;
            write_style_attrs(out, style)?;
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#)?;
            write_line_attrs(out, style)?;
        }
        SvgElement::Polyline { points, style } => {
            out.push_str(r#"<polyline points=""#);
            write_points(out, points)?;
            out.push_str(r#"" fill="none""#);
            write_line_attrs(out, style)?;
        }
        SvgElement::Polygon { points, style } => {
            out.push_str(r#"<polygon points=""#);
            write_points(out, points)?;
            out.push('"');
            write_style_attrs(out, style)?;
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            write!(out, r#"<text x="{x:.2}" y="{y:.2}""#)?;
            write!(out, r#" font-family="DejaVu Sans, Helvetica, Arial, sans-serif" font-size="{:.1}""#, style.size)?;
            write!(out, r#" fill="{}""#, style.color.to_svg_fill())?;
            write!(out, r#" text-anchor="{}""#, style.anchor.svg_value())?;
            write!(out, r#" dominant-baseline="{}""#, style.baseline.svg_value())?;
            if style.weight == FontWeight::Bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if let Some(angle) = rotate {
                write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
            }
            out.push('>');
            for ch in content.chars() {
                match ch {
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    '&' => out.push_str("&amp;"),
                    '"' => out.push_str("&quot;"),
                    _ => out.push(ch),
                }
            }
            out.push_str("</text>\n");
            return Ok(());
        }
        SvgElement::Circle { cx, cy, r, style } => {
            write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#)?;
            write_style_attrs(out, style)?;
        }
    }
    out.push_str(" />\n");
    Ok(())
}

fn write_style_attrs(out: &mut String, style: &Style) -> fmt::Result {
    match &style.fill {
        Some(fill) => write!(out, r#" fill="{}""#, fill.to_svg_fill())?,
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        write!(out, r#" stroke="{}" stroke-width="{:.2}""#, stroke.to_svg_fill(), style.stroke_width)?;
    }
    Ok(())
}

fn write_line_attrs(out: &mut String, style: &LineStyle) -> fmt::Result {
    write!(out, r#" stroke="{}" stroke-width="{:.2}""#, style.color.to_svg_fill(), style.width)?;
    if let Some(dash) = &style.dash {
        write!(out, r#" stroke-dasharray="{dash}""#)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas() {
        let svg = Canvas::new(100.0, 50.0).unwrap().finish_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn invalid_size_rejected() {
        assert!(Canvas::new(0.0, 50.0).is_err());
    }

    #[test]
    fn text_is_escaped() {
        let mut c = Canvas::new(200.0, 100.0).unwrap();
        c.text(10.0, 20.0, "a < b & c", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn clipped_elements_are_wrapped() {
        let mut c = Canvas::new(200.0, 100.0).unwrap();
        let id = c.push_clip(10.0, 10.0, 50.0, 50.0);
        let red = Color::hex("#ff0000");
        c.rect(0.0, 0.0, 100.0, 100.0, &Style::edged(red, red, 1.0));
        c.pop_clip();
        c.rect(0.0, 0.0, 5.0, 5.0, &Style::edged(Color::hex("#00ff00"), red, 1.0));
        let svg = c.finish_svg();
        assert!(svg.contains(&format!(r#"<clipPath id="{id}">"#)));
        assert_eq!(svg.matches("clip-path=").count(), 1);
        assert!(svg.contains(r##"fill="#00ff00""##));
    }

    #[test]
    fn marker_shapes() {
        let mut c = Canvas::new(100.0, 100.0).unwrap();
        let black = Color::rgb(0, 0, 0);
        c.marker(10.0, 10.0, &series_marker(0, black, 3.0));
        c.marker(20.0, 10.0, &series_marker(1, black, 3.0));
        c.marker(30.0, 10.0, &MarkerStyle { shape: MarkerShape::TriangleUp, size: 3.0, color: black, fill: false });
        let svg = c.finish_svg();
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains(r##"fill="#ffffff""##));
    }
}
