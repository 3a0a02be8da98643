//! Trajectory detail view.
//!
//! Summary fields, editable tags and notes, the step-by-step history and the
//! recorded chat. Shown in place of the current tab until the user goes back.

use eframe::egui;
use egui::{RichText, ScrollArea};
use rtraj::model::{ChatMessage, Step};
use rtraj::{ThemeColors, TrajectoryDetail};

use crate::app::AppState;
use crate::presentation::color_mapping;
use crate::state::{DetailEdit, DetailState};
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::remote_status;
use crate::utils::{format_duration_secs, format_reward, preview};

pub fn render_details_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors().clone();
    let colors = &colors;
    let detail_state = &state.detail;
    let trajectory_id = detail_state.trajectory_id().unwrap_or_default();

    ui.horizontal(|ui| {
        if ui.button("← Back").clicked() {
            interaction = Some(PanelInteraction::CloseDetail);
        }
        ui.separator();
        ui.label(RichText::new(format!("Trajectory {trajectory_id}")).strong());

        if let Some(detail) = detail_state.detail.data() {
            let star = if detail.summary.is_bookmarked { "★ Bookmarked" } else { "☆ Bookmark" };
            let button = ui.add_enabled(!detail_state.bookmark_pending(), egui::Button::new(star));
            if button.clicked() {
                interaction = Some(PanelInteraction::ToggleBookmark(trajectory_id.to_string()));
            }
        }
        if ui.button("⟳").on_hover_text("Reload").clicked() {
            interaction = Some(PanelInteraction::ReloadDetail);
        }
    });
    if let Some(err) = detail_state.bookmark_error() {
        ui.colored_label(colors.failure, format!("Bookmark failed: {err}"));
    }
    ui.separator();

    let Some(detail) = remote_status(ui, &detail_state.detail, "trajectory") else {
        return interaction;
    };

    if let Some(summary_interaction) = render_summary(ui, detail, colors) {
        interaction = Some(summary_interaction);
    }
    ui.separator();

    if let Some(edit) = render_annotations(ui, &mut state.detail, colors) {
        interaction = Some(PanelInteraction::EditDetail(edit));
    }
    ui.separator();

    let Some(detail) = state.detail.detail.data() else {
        return interaction;
    };

    let steps_height = ui.available_height() * state.layout.detail_split_ratio();
    ui.label(RichText::new(format!("Steps ({})", detail.steps.len())).strong());
    ScrollArea::vertical()
        .id_salt("detail_steps")
        .max_height(steps_height)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            if detail.steps.is_empty() {
                ui.label(RichText::new("(no steps recorded)").color(colors.text_dim));
            }
            for step in &detail.steps {
                render_step(ui, step, colors);
            }
        });

    ui.separator();
    ui.label(RichText::new(format!("Chat history ({})", detail.chat_completions.len())).strong());
    ScrollArea::vertical()
        .id_salt("detail_chat")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if detail.chat_completions.is_empty() {
                ui.label(RichText::new("(no chat recorded)").color(colors.text_dim));
            }
            for message in &detail.chat_completions {
                render_message(ui, message, colors);
            }
        });

    interaction
}

fn render_summary(ui: &mut egui::Ui, detail: &TrajectoryDetail, colors: &ThemeColors) -> Option<PanelInteraction> {
    let t = &detail.summary;
    let mut interaction = None;

    ui.label(RichText::new(t.question()).size(15.0));
    if !t.task.ground_truth.is_empty() {
        ui.label(RichText::new(format!("Ground truth: {}", t.task.ground_truth)).color(colors.text_dim));
    }

    egui::Grid::new("detail_summary")
        .num_columns(4)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            ui.label("Question ID");
            ui.horizontal(|ui| {
                ui.monospace(&t.data_id);
                if !t.data_id.is_empty() && ui.small_button("All attempts").clicked() {
                    interaction = Some(PanelInteraction::ShowQuestion(t.data_id.clone()));
                }
            });
            ui.label("Agent");
            ui.label(&t.agent_name);
            ui.end_row();

            ui.label("Training");
            ui.label(format!("{} · epoch {} · iter {} · sample {}", t.training_id, t.epoch_id, t.iteration_id, t.sample_id));
            ui.label("Outcome");
            ui.colored_label(
                color_mapping::success_color(t.is_success, colors),
                if t.is_success { "success" } else { "failure" },
            );
            ui.end_row();

            ui.label("Reward");
            ui.label(format!(
                "{} (tool-call {}, result {})",
                format_reward(t.reward),
                format_reward(t.toolcall_reward),
                format_reward(t.res_reward)
            ));
            ui.label("Termination");
            ui.colored_label(color_mapping::termination_color(&t.termination_reason, colors), &t.termination_reason);
            ui.end_row();

            ui.label("Steps");
            ui.label(t.step_count.to_string());
            ui.label("Exec time");
            ui.label(format_duration_secs(t.exec_time));
            ui.end_row();

            if !t.category.is_empty() || !t.root_cause.is_empty() {
                ui.label("Category");
                ui.label(&t.category);
                ui.label("Root cause");
                ui.label(&t.root_cause);
                ui.end_row();
            }
        });

    interaction
}

/// Tag chips with remove buttons, the add-tag box and the notes editor.
fn render_annotations(ui: &mut egui::Ui, detail_state: &mut DetailState, colors: &ThemeColors) -> Option<DetailEdit> {
    let mut edit = None;
    let tags = detail_state.detail.data().map(|d| d.tags.clone()).unwrap_or_default();
    let idle = !detail_state.edit_pending();

    ui.horizontal_wrapped(|ui| {
        ui.label("Tags:");
        if tags.is_empty() {
            ui.label(RichText::new("(none)").color(colors.text_dim));
        }
        for tag in &tags {
            ui.label(RichText::new(tag).background_color(colors.selection.gamma_multiply(0.4)));
            if ui.add_enabled(idle, egui::Button::new("×").small()).on_hover_text("Remove tag").clicked() {
                edit = Some(DetailEdit::RemoveTag(tag.clone()));
            }
        }
        ui.separator();
        let input = ui.add(egui::TextEdit::singleline(&mut detail_state.tag_input).desired_width(120.0).hint_text("new tag"));
        let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let can_add = idle && !detail_state.tag_input.trim().is_empty();
        if (ui.add_enabled(can_add, egui::Button::new("Add tag")).clicked() || submitted) && can_add {
            edit = Some(DetailEdit::AddTag(detail_state.tag_input.trim().to_string()));
        }
    });

    ui.label(RichText::new("Notes").small().color(colors.text_dim));
    ui.add(
        egui::TextEdit::multiline(&mut detail_state.notes_draft)
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .hint_text("Add notes about this trajectory"),
    );
    ui.horizontal(|ui| {
        let can_save = idle && detail_state.notes_dirty();
        if ui.add_enabled(can_save, egui::Button::new("Save notes")).clicked() {
            edit = Some(DetailEdit::Notes(detail_state.notes_draft.clone()));
        }
        if detail_state.edit_pending() {
            ui.spinner();
        }
    });
    if let Some(err) = detail_state.edit_error() {
        ui.colored_label(colors.failure, err);
    }

    edit
}

fn render_step(ui: &mut egui::Ui, step: &Step, colors: &ThemeColors) {
    let action = step.action.as_deref().unwrap_or("(no action)");
    let title = format!("Step {} · {} · reward {}", step.step_id, preview(action, 60), format_reward(step.reward));
    egui::CollapsingHeader::new(RichText::new(title).color(color_mapping::reward_color(step.reward, colors)))
        .id_salt(("step", step.step_id))
        .show(ui, |ui| {
            labelled_block(ui, "Thought", &step.thought, colors);
            labelled_block(ui, "Action", action, colors);
            if let Some(observation) = &step.observation {
                labelled_block(ui, "Observation", observation, colors);
            }
            labelled_block(ui, "Model response", &step.model_response, colors);
            if step.done {
                ui.label(RichText::new("episode finished").color(colors.text_dim));
            }
        });
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage, colors: &ThemeColors) {
    let role_color = match message.role.as_str() {
        "system" => colors.text_dim,
        "user" => colors.accent,
        "assistant" => colors.success,
        "tool" => colors.warning,
        _ => colors.text,
    };
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.label(RichText::new(&message.role).strong().color(role_color));
        ui.label(message.content_text());
    });
}

fn labelled_block(ui: &mut egui::Ui, label: &str, text: &str, colors: &ThemeColors) {
    if text.is_empty() {
        return;
    }
    ui.label(RichText::new(label).small().color(colors.text_dim));
    ui.label(RichText::new(text).monospace());
    ui.add_space(4.0);
}
