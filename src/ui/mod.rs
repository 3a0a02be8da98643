//! UI panel rendering subsystem.
//!
//! Panels read state and return a [`panel_manager::PanelInteraction`]
//! describing what the user asked for; they never issue requests
//! themselves.

pub mod header;
pub mod status_bar;
pub mod table_header;
pub mod pagination;
pub mod filter_panel;
pub mod trajectory_panel;
pub mod details_panel;
pub mod questions_panel;
pub mod dashboard_panel;
pub mod training_panel;
pub mod analysis_panel;
pub mod import_panel;
pub mod panel_manager;

use eframe::egui;
use rtraj::Remote;

/// Shows loading or error placeholders for a remote view. Returns the data
/// once it is there.
pub fn remote_status<'a, T>(ui: &mut egui::Ui, remote: &'a Remote<T>, what: &str) -> Option<&'a T> {
    match (remote.data(), remote.error()) {
        (Some(data), _) => Some(data),
        (None, Some(err)) if !remote.is_loading() => {
            ui.colored_label(ui.visuals().error_fg_color, format!("Failed to load {what}: {err}"));
            None
        }
        _ => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Loading {what}…"));
            });
            None
        }
    }
}
