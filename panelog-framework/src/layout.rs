use ratatui::layout::{Constraint, Layout, Rect};

/// Splits `area` into stacked rows whose heights follow `ratios`.
///
/// Rounding leftovers are distributed by the layout solver, so heights are
/// proportional within one row. Called on every draw, which makes a terminal
/// resize re-flow the panels.
pub fn split_by_ratio(area: Rect, ratios: &[u16]) -> Vec<Rect> {
    if ratios.is_empty() {
        return Vec::new();
    }

    Layout::vertical(ratios.iter().map(|&ratio| Constraint::Fill(ratio.max(1))))
        .split(area)
        .to_vec()
}
