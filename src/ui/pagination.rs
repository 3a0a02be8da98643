//! Pagination control shared by the trajectory and question tables.

use eframe::egui;
use rtraj::pagination::{self, PageItem};

use crate::utils::format_count;

/// Neighbour pages shown on each side of the current page.
const WINDOW_RADIUS: u32 = 2;

/// Renders "first / prev / 1 … 4 5 [6] 7 8 … 20 / next / last" with a
/// record range. Returns the page the user picked.
pub fn render_pagination(ui: &mut egui::Ui, current: u32, page_size: u32, total: u64) -> Option<u32> {
    let count = pagination::page_count(total, page_size);
    let mut picked = None;

    ui.horizontal(|ui| {
        if ui.add_enabled(current > 1, egui::Button::new("⏮")).clicked() {
            picked = Some(1);
        }
        if ui.add_enabled(current > 1, egui::Button::new("◀")).clicked() {
            picked = Some(current - 1);
        }

        for item in pagination::page_window(current, count, WINDOW_RADIUS) {
            match item {
                PageItem::Page(n) => {
                    if ui.selectable_label(n == current, n.to_string()).clicked() && n != current {
                        picked = Some(n);
                    }
                }
                PageItem::Gap => {
                    ui.label("…");
                }
            }
        }

        if ui.add_enabled(current < count, egui::Button::new("▶")).clicked() {
            picked = Some(current + 1);
        }
        if ui.add_enabled(current < count, egui::Button::new("⏭")).clicked() {
            picked = Some(count);
        }

        ui.separator();
        match pagination::record_range(current, page_size, total) {
            Some((start, end)) => ui.label(format!(
                "{}–{} of {}",
                format_count(start),
                format_count(end),
                format_count(total)
            )),
            None => ui.label("No records"),
        };
    });

    picked
}
