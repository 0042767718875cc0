//! Named presets that user YAML is layered over.

use crate::color::Color;
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// ROOT-like markers and colours with a light grid.
    Calostat,
    /// Colour-blind safe palette and sample colours, no grid.
    Atlas,
    /// Small fonts, outward ticks on the bottom and left only.
    Minimal,
}

impl BuiltinTheme {
    /// Case-insensitive lookup; unknown names give [`BuiltinTheme::Calostat`].
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "atlas" => Self::Atlas,
            "minimal" => Self::Minimal,
            _ => Self::Calostat,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Calostat => "calostat",
            Self::Atlas => "atlas",
            Self::Minimal => "minimal",
        }
    }

    pub fn base_config(self) -> VizConfig {
        let mut c = VizConfig {
            theme: self.name().into(),
            font: FontConfig::default(),
            axes: AxesConfig::default(),
            grid: GridConfig::default(),
            colors: ColorsConfig::default(),
            palette: "root".into(),
            output: OutputConfig::default(),
            response: ResponseConfig::default(),
            shower: ShowerConfig::default(),
        };
        match self {
            Self::Calostat => {}
            Self::Atlas => {
                c.font = FontConfig { size: 11.0, label_size: 12.0, tick_size: 9.5, title_size: 13.0 };
                c.axes.tick_length = 6.0;
                c.grid.show = false;
                c.colors = ColorsConfig {
                    photon_fill: Color::hex("#e69f00").with_alpha(0.45),
                    photon_edge: Color::hex("#d55e00"),
                    pion_fill: Color::hex("#56b4e9").with_alpha(0.4),
                    pion_edge: Color::hex("#0072b2"),
                };
                c.palette = "atlas_wong".into();
            }
            Self::Minimal => {
                c.font = FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0, title_size: 11.0 };
                c.axes = AxesConfig {
                    tick_direction: "out".into(),
                    show_top_ticks: false,
                    show_right_ticks: false,
                    tick_length: 4.0,
                    minor_tick_length: 2.0,
                };
                c.grid.show = false;
            }
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for theme in [BuiltinTheme::Calostat, BuiltinTheme::Atlas, BuiltinTheme::Minimal] {
            assert_eq!(BuiltinTheme::parse(theme.name()), theme);
            assert_eq!(theme.base_config().theme, theme.name());
        }
        assert_eq!(BuiltinTheme::parse("ATLAS"), BuiltinTheme::Atlas);
        assert_eq!(BuiltinTheme::parse("nope"), BuiltinTheme::Calostat);
    }

    #[test]
    fn atlas_drops_grid() {
        let c = BuiltinTheme::Atlas.base_config();
        assert!(!c.grid.show);
        assert_eq!(c.palette, "atlas_wong");
        assert!(BuiltinTheme::Calostat.base_config().grid.show);
    }
}
