use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 8-bit RGB colour with a floating-point alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    fn is_opaque(&self) -> bool {
        (self.a - 1.0).abs() < 1e-6
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional). Malformed components read as 0.
    pub fn hex(s: &str) -> Self {
        let digits = s.trim_start_matches('#');
        let byte = |i: usize| digits.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
        let a = match (digits.len(), byte(6)) {
            (8, Some(a)) => f64::from(a) / 255.0,
            _ => 1.0,
        };
        Self { r: byte(0).unwrap_or(0), g: byte(2).unwrap_or(0), b: byte(4).unwrap_or(0), a }
    }

    /// `#rrggbb`, plus an alpha byte for translucent colours.
    pub fn to_hex(&self) -> String {
        let rgb = format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b);
        if self.is_opaque() {
            rgb
        } else {
            format!("{rgb}{:02x}", (self.a.clamp(0.0, 1.0) * 255.0).round() as u8)
        }
    }

    /// SVG paint value: hex when opaque, `rgba(...)` otherwise.
    pub fn to_svg_fill(&self) -> String {
        if self.is_opaque() {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Color::hex(&s))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// ROOT's classic marker colours 1, 2, 4, 6, 8, 9.
pub const ROOT_CLASSIC: &[&str] = &["#000000", "#ff0000", "#0000ff", "#ff00ff", "#59d454", "#5954d8"];

/// Okabe-Ito (Wong) colour-blind safe set.
pub const ATLAS_WONG: &[&str] =
    &["#0072b2", "#d55e00", "#56b4e9", "#e69f00", "#f0e442", "#009e73", "#cc79a7"];

/// Series colours of a named palette; unknown names give [`ROOT_CLASSIC`].
pub fn palette_colors(name: &str) -> Vec<Color> {
    let hexes = if name == "atlas_wong" { ATLAS_WONG } else { ROOT_CLASSIC };
    hexes.iter().copied().map(Color::hex).collect()
}
