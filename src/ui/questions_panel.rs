//! Questions table with per-question success rate and difficulty.

use eframe::egui;
use egui::RichText;

use crate::app::AppState;
use crate::presentation::color_mapping;
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::{pagination, remote_status};
use crate::utils::{format_percent, preview};

pub fn render_questions_panel(ui: &mut egui::Ui, state: &AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors();
    let questions = &state.questions;

    ui.heading("Questions");
    ui.separator();

    let Some(page) = remote_status(ui, &questions.questions, "questions") else {
        return None;
    };

    egui::ScrollArea::vertical()
        .id_salt("questions_scroll")
        .max_height((ui.available_height() - 36.0).max(100.0))
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("questions_grid")
                .num_columns(6)
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for title in ["ID", "Question", "Solved", "Rate", "Difficulty", ""] {
                        ui.label(RichText::new(title).strong());
                    }
                    ui.end_row();

                    for question in &page.data {
                        ui.monospace(&question.id);
                        ui.label(preview(&question.question, 80)).on_hover_text(&question.question);
                        ui.label(format!("{}/{}", question.success_count, question.total_count));
                        ui.label(format_percent(question.rate));
                        ui.colored_label(
                            color_mapping::difficulty_color(question.difficulty, colors),
                            question.difficulty.label(),
                        );
                        if ui.small_button("Trajectories →").clicked() {
                            interaction = Some(PanelInteraction::ShowQuestion(question.id.clone()));
                        }
                        ui.end_row();
                    }
                });
            if page.data.is_empty() {
                ui.label(RichText::new("No questions yet. Import some trajectories first.").color(colors.text_dim));
            }
        });

    ui.separator();
    if let Some(n) = pagination::render_pagination(ui, questions.page(), questions.page_size(), page.total) {
        interaction = Some(PanelInteraction::QuestionsPage(n));
    }

    interaction
}
