#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "png")]
pub mod png;
pub mod svg;

/// Parse SVG text with system fonts available for `<text>` elements.
#[cfg(any(feature = "png", feature = "pdf"))]
fn parse_tree(svg: &str) -> std::result::Result<usvg::Tree, usvg::Error> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    usvg::Tree::from_str(svg, &opt)
}
