use crate::primitives::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Advance width of a character in ems, for a generic sans-serif face.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | ' ' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.86,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.56,
        _ => 0.54,
    }
}

/// Estimate the extent of `text` in points.
///
/// Text is drawn by the SVG consumer with whatever sans-serif face it has, so
/// layout only needs a width that errs slightly on the wide side.
pub fn measure_text(text: &str, style: &TextStyle) -> TextMetrics {
    let bold = if style.weight == FontWeight::Bold { 1.06 } else { 1.0 };
    let ems: f64 = text.chars().map(advance_em).sum();
    TextMetrics { width: ems * style.size * bold, height: 1.2 * style.size, ascent: 0.93 * style.size }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_hello() {
        let m = measure_text("Hello", &TextStyle { size: 12.0, ..Default::default() });
        assert!(m.width > 20.0);
        assert!(m.height > 8.0);
        assert!(m.ascent > 0.0);
    }

    #[test]
    fn bold_and_wide_glyphs() {
        let regular = TextStyle::default();
        let bold = TextStyle { weight: FontWeight::Bold, ..Default::default() };
        assert!(measure_text("Test", &bold).width > measure_text("Test", &regular).width);
        assert!(measure_text("WWW", &regular).width > measure_text("iii", &regular).width);
        assert_eq!(measure_text("", &regular).width, 0.0);
    }
}
