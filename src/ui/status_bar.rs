//! Status bar: process memory, backend address and health, pending requests.

use eframe::egui;
use egui::RichText;
use crate::app::AppState;
use crate::utils::{format_memory_mb, get_current_memory_mb};

pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState, in_flight: usize) {
    let colors = state.theme.colors();
    ui.horizontal(|ui| {
        ui.label(RichText::new(format_memory_mb(get_current_memory_mb())).strong());
        ui.label(RichText::new("|").strong());

        ui.label(RichText::new(format!("API: {}", state.config.api_base)).strong());

        let health = state.dashboard.health_label();
        let health_color = match health {
            "ok" | "healthy" => colors.success,
            "checking" => colors.text_dim,
            _ => colors.failure,
        };
        ui.label(RichText::new("| Server:").strong());
        ui.label(RichText::new(health).strong().color(health_color));

        if in_flight > 0 {
            ui.label(RichText::new("|").strong());
            ui.spinner();
            ui.label(format!("{in_flight} request(s) pending"));
        }

        if state.import.tracker.is_polling() {
            ui.label(RichText::new("|").strong());
            ui.label(
                RichText::new(format!("Import {:.0}%", state.import.tracker.progress() * 100.0))
                    .color(colors.accent),
            );
        }
    });
}
