pub mod canvas;
pub mod color;
pub mod config;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;

use config::VizConfig;
use cs_viz::{ResponseCurvesArtifact, ShowerShapesArtifact};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Output format, chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Svg,
    Png,
    Pdf,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("svg").to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn svg_to_bytes(svg: String, format: Format, config: &VizConfig) -> Result<Vec<u8>> {
    match format {
        Format::Svg => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        Format::Png => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        Format::Pdf => output::pdf::svg_to_pdf(&svg),
        #[allow(unreachable_patterns)]
        other => {
            let _ = config;
            Err(RenderError::UnsupportedFormat(format!("{other:?} (feature disabled)")))
        }
    }
}

/// Render the response/resolution figure to SVG.
pub fn render_response_svg(art: &ResponseCurvesArtifact, config: &VizConfig) -> Result<String> {
    plots::response::render(art, config)
}

/// Render the response/resolution figure to a file; format follows the extension.
pub fn render_response_to_file(
    art: &ResponseCurvesArtifact,
    path: &Path,
    config: &VizConfig,
) -> Result<()> {
    let format = Format::from_path(path)?;
    let svg = render_response_svg(art, config)?;
    if format == Format::Svg {
        return output::svg::save_svg(&svg, path);
    }
    std::fs::write(path, svg_to_bytes(svg, format, config)?)?;
    Ok(())
}

/// Render every layer page of a shower-shape comparison to SVG.
pub fn render_shower_pages_svg(
    art: &ShowerShapesArtifact,
    config: &VizConfig,
) -> Result<Vec<String>> {
    art.layers.iter().map(|page| plots::shower_shapes::render_page(art, page, config)).collect()
}

/// Write all shower-shape pages into one multi-page PDF.
#[cfg(feature = "pdf")]
pub fn render_shower_pdf(art: &ShowerShapesArtifact, path: &Path, config: &VizConfig) -> Result<()> {
    let pages = render_shower_pages_svg(art, config)?;
    let bytes = output::pdf::svgs_to_pdf(&pages)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
