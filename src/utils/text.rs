//! Text measurement for painter-drawn table cells.

use eframe::egui;

/// Horizontal padding kept free inside a cell, both sides together.
const CELL_PADDING: f32 = 8.0;
const ELLIPSIS: &str = "..";

fn measure(painter: &egui::Painter, text: String, font_id: &egui::FontId) -> f32 {
    painter
        .layout_no_wrap(text, font_id.clone(), egui::Color32::WHITE)
        .size()
        .x
}

/// Cuts `text` so it fits in a cell `available_width` wide, marking the cut
/// with "..". Returns an empty string when not even the marker fits.
pub fn truncate_text_to_fit(
    text: &str,
    available_width: f32,
    font_id: &egui::FontId,
    painter: &egui::Painter,
) -> String {
    let max_width = available_width - CELL_PADDING;
    if max_width <= 0.0 {
        return String::new();
    }
    if measure(painter, text.to_string(), font_id) <= max_width {
        return text.to_string();
    }

    let budget = max_width - measure(painter, ELLIPSIS.to_string(), font_id);
    if budget <= 0.0 {
        return String::new();
    }

    // Longest prefix (in chars) that fits the budget.
    let (mut low, mut high) = (0usize, text.chars().count());
    while low < high {
        let mid = (low + high + 1) / 2;
        let prefix: String = text.chars().take(mid).collect();
        if measure(painter, prefix, font_id) <= budget {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let mut result: String = text.chars().take(low).collect();
    result.push_str(ELLIPSIS);
    result
}
