use std::collections::HashMap;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};

use crate::RenderError;

/// Convert SVG string to single-page PDF bytes.
pub fn svg_to_pdf(svg: &str) -> crate::Result<Vec<u8>> {
    let tree = super::parse_tree(svg).map_err(|e| RenderError::Pdf(e.to_string()))?;
    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

/// Combine several SVG pages into one PDF, one page per SVG, in order.
///
/// Each page embeds its SVG as a form XObject scaled to the SVG size in points.
pub fn svgs_to_pdf(pages: &[String]) -> crate::Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(RenderError::Pdf("no pages to write".into()));
    }

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let mut pdf = Pdf::new();
    let mut page_ids = Vec::with_capacity(pages.len());
    let svg_name = Name(b"S1");

    for svg in pages {
        let tree = super::parse_tree(svg).map_err(|e| RenderError::Pdf(e.to_string()))?;
        let (w, h) = (tree.size().width(), tree.size().height());
        let (chunk, svg_id) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        let mut map = HashMap::new();
        let chunk = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
        let svg_id = map
            .get(&svg_id)
            .copied()
            .ok_or_else(|| RenderError::Pdf("converted SVG reference missing".into()))?;

        let page_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, w, h));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(svg_name, svg_id);
        page.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([w, 0.0, 0.0, h, 0.0, 0.0]);
        content.x_object(svg_name);
        content.restore_state();
        pdf.stream(content_id, &content.finish());

        pdf.extend(&chunk);
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    let n = page_ids.len() as i32;
    pdf.pages(page_tree_id).kids(page_ids).count(n);
    log::debug!("assembled {n}-page PDF");
    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100"><rect x="10" y="10" width="50" height="20" fill="blue"/><text x="20" y="60">{text}</text></svg>"#
        )
    }

    #[test]
    fn single_page() {
        let pdf = svg_to_pdf(&page("one")).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn page_count_in_page_tree() {
        let pages: Vec<String> = (1..=3).map(|i| page(&format!("page {i}"))).collect();
        let pdf = svgs_to_pdf(&pages).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(svgs_to_pdf(&[]), Err(RenderError::Pdf(_))));
    }
}
