//! Trajectory list view.
//!
//! Search box, filter panel toggle, jump-filter banner, the sortable table
//! and pagination. Rows are painted cell by cell so they share the header's
//! column widths.

use std::time::Instant;

use eframe::egui;
use egui::{RichText, Sense};
use rtraj::{ExportFormat, ThemeColors, Trajectory};

use crate::app::{AppState, ListAction};
use crate::presentation::color_mapping;
use crate::state::TRAJECTORY_COLUMNS;
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::{filter_panel, pagination, table_header};
use crate::utils::{format_duration_secs, format_reward, truncate_text_to_fit};

const ROW_HEIGHT: f32 = 22.0;

pub fn render_trajectory_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors().clone();

    render_toolbar(ui, state, &mut interaction);

    if let Some(jump) = state.trajectories.list.jump() {
        let description = jump.describe();
        egui::Frame::default()
            .fill(colors.selection.gamma_multiply(0.3))
            .inner_margin(6.0)
            .corner_radius(4.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("Showing {description}")).strong());
                    if ui.button("Clear").clicked() {
                        interaction = Some(PanelInteraction::List(ListAction::ClearJump));
                    }
                });
            });
    }

    if state.trajectories.filter_panel_open() {
        egui::CollapsingHeader::new("Column filters")
            .default_open(true)
            .show(ui, |ui| {
                if let Some(action) = filter_panel::render_filter_panel(ui, &mut state.trajectories) {
                    interaction = Some(PanelInteraction::List(action));
                }
            });
    }

    ui.separator();

    let list = &state.trajectories.list;
    let (page, page_size, total) = (list.page(), list.page_size(), list.result().total);
    let footer_height = 32.0;

    egui::ScrollArea::horizontal()
        .id_salt("trajectory_table_h")
        .max_height((ui.available_height() - footer_height).max(ROW_HEIGHT * 3.0))
        .show(ui, |ui| {
            let sort = state.trajectories.list.sort();
            if let Some(field) = table_header::render_table_header(ui, &mut state.layout, sort) {
                interaction = Some(PanelInteraction::List(ListAction::SetSort(field)));
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("trajectory_table_v")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if let Some(row_interaction) = render_rows(ui, state, &colors) {
                        interaction = Some(row_interaction);
                    }
                });
        });

    ui.separator();
    if let Some(n) = pagination::render_pagination(ui, page, page_size, total) {
        interaction = Some(PanelInteraction::List(ListAction::ChangePage(n)));
    }

    interaction
}

fn render_toolbar(ui: &mut egui::Ui, state: &mut AppState, interaction: &mut Option<PanelInteraction>) {
    ui.horizontal(|ui| {
        ui.label("Search:");
        let mut term = state.trajectories.list.search_input().to_string();
        let response = ui.add(
            egui::TextEdit::singleline(&mut term)
                .hint_text("question, agent, ID…")
                .desired_width(280.0),
        );
        if response.changed() {
            state.trajectories.list.set_search(term, Instant::now());
        }

        let enabled = state.trajectories.list.filter_panel_enabled();
        let label = if state.trajectories.filter_panel_open() { "Hide filters" } else { "Filters" };
        let active = state.trajectories.list.filters().active_count();
        let label = if active > 0 { format!("{label} ({active})") } else { label.to_string() };
        let toggle = ui
            .add_enabled(enabled, egui::Button::new(label))
            .on_disabled_hover_text("Clear the jump filter to use column filters");
        if toggle.clicked() {
            state.trajectories.toggle_filter_panel();
        }

        if ui.button("Reset").on_hover_text("Clear search, filters and sort").clicked() {
            *interaction = Some(PanelInteraction::List(ListAction::Reset));
        }

        let exporting = state.trajectories.export_pending();
        ui.add_enabled_ui(!exporting, |ui| {
            ui.menu_button("Export", |ui| {
                for format in ExportFormat::ALL {
                    if ui.button(format!("All trajectories as {}", format.label())).clicked() {
                        ui.close();
                        let dialog = rfd::FileDialog::new()
                            .set_file_name(format.default_file_name())
                            .add_filter(format.label(), &[format.as_str()]);
                        if let Some(path) = dialog.save_file() {
                            *interaction = Some(PanelInteraction::Export(format, path));
                        }
                    }
                }
            });
        });

        if state.trajectories.list.is_loading() || exporting {
            ui.spinner();
        }
        if let Some(message) = state.trajectories.last_export() {
            ui.label(RichText::new(message).small());
        }
    });
}

fn render_rows(ui: &mut egui::Ui, state: &AppState, colors: &ThemeColors) -> Option<PanelInteraction> {
    let list = &state.trajectories.list;
    let result = list.result();

    if result.trajectories.is_empty() {
        if !result.loaded {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading trajectories…");
            });
            return None;
        }
        let mut interaction = None;
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No trajectories match").color(colors.text_dim));
            if list.has_constraints() && ui.button("Clear filters").clicked() {
                interaction = Some(PanelInteraction::List(ListAction::ClearAll));
            }
        });
        return interaction;
    }

    let widths = state.layout.column_widths();
    let font_id = egui::FontId::proportional(13.0);
    let mut interaction = None;

    for trajectory in &result.trajectories {
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(state.layout.table_width(), ROW_HEIGHT),
            Sense::click(),
        );
        if response.hovered() {
            ui.painter().rect_filled(rect, 0.0, colors.hover);
        }

        let mut x = rect.min.x;
        for (i, (text, color)) in row_cells(trajectory, colors).iter().enumerate() {
            let cell = egui::Rect::from_min_size(egui::pos2(x, rect.min.y), egui::vec2(widths[i], ROW_HEIGHT));
            let fitted = truncate_text_to_fit(text, widths[i], &font_id, ui.painter());
            ui.painter().text(
                cell.left_center() + egui::vec2(4.0, 0.0),
                egui::Align2::LEFT_CENTER,
                fitted,
                font_id.clone(),
                *color,
            );
            x += widths[i];
        }

        let response = response.on_hover_text(trajectory.question());
        if response.clicked() {
            interaction = Some(PanelInteraction::OpenTrajectory(trajectory.trajectory_id.clone()));
        }
    }

    interaction
}

fn row_cells(t: &Trajectory, colors: &ThemeColors) -> [(String, egui::Color32); TRAJECTORY_COLUMNS] {
    let id = if t.is_bookmarked {
        format!("★ {}", t.trajectory_id)
    } else {
        t.trajectory_id.clone()
    };
    let outcome = format!("{} {}", if t.is_success { "✔" } else { "✘" }, t.termination_reason);
    [
        (id, colors.text),
        (t.question().to_string(), colors.text),
        (t.training_id.clone(), colors.text_dim),
        (t.epoch_id.to_string(), colors.text),
        (t.iteration_id.to_string(), colors.text),
        (t.sample_id.to_string(), colors.text),
        (t.agent_name.clone(), colors.text_dim),
        (format_reward(t.reward), color_mapping::reward_color(t.reward, colors)),
        (t.step_count.to_string(), colors.text),
        (format_duration_secs(t.exec_time), colors.text),
        (outcome, color_mapping::success_color(t.is_success, colors)),
    ]
}
