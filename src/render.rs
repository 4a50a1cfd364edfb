use crate::types::CuttingPlanItem;

const MAX_WIDTH: usize = 72;

/// Render one cutting pattern as a proportional ASCII bar:
/// cut segments carry their length label, the residual tail is dotted.
pub fn render_pattern(item: &CuttingPlanItem, kerf_mm: u32) -> String {
    let stock = item.stock_length_mm as f64;
    if stock == 0.0 {
        return String::new();
    }
    let scale = MAX_WIDTH as f64 / stock;

    let mut line = String::from("|");
    for &cut in &item.cuts {
        let width = ((cut as f64 * scale).round() as usize).max(1);
        line.push_str(&segment(&cut.to_string(), width, '='));
        line.push('|');
    }

    let consumed: u64 = item
        .cuts
        .iter()
        .map(|&c| c as u64 + kerf_mm as u64)
        .sum();
    let residual = (item.stock_length_mm as u64).saturating_sub(consumed);
    if residual > 0 {
        let width = ((residual as f64 * scale).round() as usize).max(1);
        line.push_str(&segment(&residual.to_string(), width, '.'));
        line.push('|');
    }
    line.push('\n');
    line
}

/// A fixed-width cell with the label centered, padded with `fill`;
/// labels wider than the cell are dropped.
fn segment(label: &str, width: usize, fill: char) -> String {
    if label.len() + 2 > width {
        return fill.to_string().repeat(width);
    }
    let pad = width - label.len();
    let left = pad / 2;
    let mut cell = fill.to_string().repeat(left);
    cell.push_str(label);
    cell.push_str(&fill.to_string().repeat(pad - left));
    cell
}
