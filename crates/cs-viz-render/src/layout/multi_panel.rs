use crate::layout::margins::PlotArea;

/// Panels stacked vertically with a shared width.
#[derive(Debug, Clone)]
pub struct StackedLayout {
    pub panels: Vec<PlotArea>,
}

impl StackedLayout {
    pub fn new(left: f64, top: f64, width: f64, total_height: f64, gap: f64, n: usize) -> Self {
        let n = n.max(1);
        let h = (total_height - gap * (n - 1) as f64) / n as f64;
        let panels = (0..n)
            .map(|i| PlotArea::manual(left, top + i as f64 * (h + gap), width, h))
            .collect();
        Self { panels }
    }
}

/// Uniform `rows x cols` grid of cells, row-major.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<PlotArea>,
}

impl GridLayout {
    pub fn new(area: PlotArea, rows: usize, cols: usize) -> Self {
        let (rows, cols) = (rows.max(1), cols.max(1));
        let w = area.width / cols as f64;
        let h = area.height / rows as f64;
        let cells = (0..rows * cols)
            .map(|i| {
                let (r, c) = (i / cols, i % cols);
                PlotArea::manual(area.left + c as f64 * w, area.top + r as f64 * h, w, h)
            })
            .collect();
        Self { rows, cols, cells }
    }
}
