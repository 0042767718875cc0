use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub colors: ColorsConfig,
    pub palette: String,
    pub output: OutputConfig,
    pub response: ResponseConfig,
    pub shower: ShowerConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Calostat.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub title_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { size: 10.0, label_size: 11.0, tick_size: 8.5, title_size: 12.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 5.0,
            minor_tick_length: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::hex("#b0b0b0"), alpha: 0.6 }
    }
}

/// Sample colours of the shower-shape overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub photon_fill: Color,
    pub photon_edge: Color,
    pub pion_fill: Color,
    pub pion_edge: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            photon_fill: Color::hex("#ffff00").with_alpha(0.42),
            photon_edge: Color::hex("#ffd700"),
            pion_fill: Color::hex("#0000ff").with_alpha(0.35),
            pion_edge: Color::hex("#0000cd"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 150 }
    }
}

/// Two-panel response/resolution figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub width: f64,
    pub height: f64,
    pub x_range: [f64; 2],
    pub mean_range: [f64; 2],
    pub resolution_range: [f64; 2],
    pub marker_size: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            width: 432.0,  // 6" * 72
            height: 576.0, // 8" * 72
            x_range: [0.0, 110.0],
            mean_range: [-0.1, 0.1],
            resolution_range: [0.0, 0.6],
            marker_size: 3.0,
        }
    }
}

/// One shower-shape page (2x3 panels).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowerConfig {
    pub width: f64,
    pub height: f64,
    /// Lower y limit of the log-scaled PMF axis.
    pub y_floor: f64,
}

impl Default for ShowerConfig {
    fn default() -> Self {
        Self {
            width: 1296.0, // 18" * 72
            height: 864.0, // 12" * 72
            y_floor: 1e-4,
        }
    }
}

/// Resolve a VizConfig from an optional YAML string.
///
/// A `theme:` key selects the base preset; every other key overrides it.
pub fn resolve_config(user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(VizConfig::default());
    };
    let config_err = |e: serde_yaml_ng::Error| crate::RenderError::Config(e.to_string());
    let overlay: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml).map_err(config_err)?;
    if overlay.is_null() {
        return Ok(VizConfig::default());
    }
    let theme = overlay
        .get("theme")
        .and_then(|t| t.as_str())
        .map_or(BuiltinTheme::Calostat, BuiltinTheme::parse);
    let mut merged = serde_yaml_ng::to_value(theme.base_config()).map_err(config_err)?;
    merge_yaml(&mut merged, overlay);
    serde_yaml_ng::from_value(merged).map_err(config_err)
}

fn merge_yaml(base: &mut serde_yaml_ng::Value, overlay: serde_yaml_ng::Value) {
    use serde_yaml_ng::Value;
    match (base, overlay) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_yaml(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}
