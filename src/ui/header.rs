//! Header panel: tab bar, refresh and theme selector.

use eframe::egui;
use crate::app::AppState;
use crate::state::Tab;

pub enum HeaderInteraction {
    SwitchTab(Tab),
    Refresh(Tab),
}

pub fn render_header(ui: &mut egui::Ui, state: &mut AppState) -> Option<HeaderInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        ui.heading("Trajectories");
        ui.separator();

        for tab in Tab::ALL {
            let selected = state.nav.tab() == tab && state.nav.detail().is_none();
            if ui.selectable_label(selected, tab.label()).clicked() {
                interaction = Some(HeaderInteraction::SwitchTab(tab));
            }
        }

        ui.separator();

        if ui.button("⟳ Refresh").on_hover_text("Reload the current view").clicked() {
            interaction = Some(HeaderInteraction::Refresh(state.nav.tab()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let mut selected = state.theme.current_theme_name().to_string();
            egui::ComboBox::from_id_salt("theme_selector")
                .selected_text(&selected)
                .show_ui(ui, |ui| {
                    for name in state.theme.theme_manager().list_themes() {
                        ui.selectable_value(&mut selected, name.to_string(), name);
                    }
                });
            if selected != state.theme.current_theme_name() {
                state.theme.set_theme(selected);
                ui.ctx().request_repaint();
            }
            ui.label("Theme:");
        });
    });

    let mut dismissed = false;
    if let Some(err) = &state.error_message {
        ui.horizontal(|ui| {
            ui.colored_label(state.theme.colors().failure, err);
            dismissed = ui.small_button("✕").clicked();
        });
    }
    if dismissed {
        state.error_message = None;
    }

    interaction
}
