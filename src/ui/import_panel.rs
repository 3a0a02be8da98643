//! Import view: upload or server-path import, job progress and logs,
//! import history and the clear-data action.

use eframe::egui;
use egui::RichText;
use rtraj::{ImportFileType, ImportPhase, ThemeColors};

use crate::app::AppState;
use crate::presentation::color_mapping;
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::remote_status;
use crate::utils::{format_age, format_count, unix_now};

pub fn render_import_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors().clone();

    ui.heading("Import trajectories");
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("import_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if let Some(action) = render_sources(ui, state) {
                interaction = Some(action);
            }
            ui.separator();
            if let Some(action) = render_job(ui, state, &colors) {
                interaction = Some(action);
            }
            ui.separator();
            render_history(ui, state, &colors);
            ui.separator();
            if let Some(action) = render_clear_data(ui, state, &colors) {
                interaction = Some(action);
            }
        });

    interaction
}

fn render_sources(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let can_submit = state.import.tracker.can_submit();

    ui.label(RichText::new("Upload a file").strong());
    ui.horizontal(|ui| {
        let pick = ui.add_enabled(can_submit, egui::Button::new("📁 Choose file…"));
        if pick.clicked() {
            let mut dialog = rfd::FileDialog::new().add_filter("Trajectory files", &["json", "jsonl"]);
            if let Ok(cwd) = std::env::current_dir() {
                dialog = dialog.set_directory(cwd);
            }
            if let Some(path) = dialog.pick_file() {
                interaction = Some(PanelInteraction::ImportUpload(path));
            }
        }
        ui.label(RichText::new(".json or .jsonl, sent to the server").small());
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Import from a server path").strong());
    ui.horizontal(|ui| {
        let mut path = state.import.path_input.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut path)
                .hint_text("/data/trajectories.jsonl")
                .desired_width(360.0),
        );
        if response.changed() {
            state.import.set_path(path);
        }

        egui::ComboBox::from_id_salt("import_file_type")
            .selected_text(state.import.file_type.as_str())
            .show_ui(ui, |ui| {
                for file_type in ImportFileType::ALL {
                    ui.selectable_value(&mut state.import.file_type, file_type, file_type.as_str());
                }
            });

        let ready = can_submit && !state.import.path_input.trim().is_empty();
        if ui.add_enabled(ready, egui::Button::new("Import")).clicked() {
            interaction = Some(PanelInteraction::ImportFromPath);
        }
    });

    if let Some(dirs) = state.import.allowed_dirs.data() {
        if dirs.is_empty() {
            ui.label(RichText::new("The server allows no import directories.").small());
        } else {
            let mut picked = None;
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new("Allowed directories:").small());
                for dir in dirs {
                    if ui.small_button(dir).on_hover_text("Use this directory").clicked() {
                        picked = Some(dir.clone());
                    }
                }
            });
            if let Some(dir) = picked {
                let prefix = if dir.ends_with('/') { dir } else { format!("{dir}/") };
                state.import.set_path(prefix);
            }
        }
    }

    interaction
}

fn render_job(ui: &mut egui::Ui, state: &AppState, colors: &ThemeColors) -> Option<PanelInteraction> {
    let tracker = &state.import.tracker;
    let mut interaction = None;

    ui.label(RichText::new("Current import").strong());
    match tracker.phase() {
        ImportPhase::Idle => {
            ui.label(RichText::new("No import running.").color(colors.text_dim));
            return None;
        }
        ImportPhase::Submitting => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Submitting…");
            });
            return None;
        }
        ImportPhase::Processing { task_id } => {
            ui.label(format!("Job {task_id} is processing"));
        }
        ImportPhase::Completed { task_id } => {
            ui.colored_label(colors.success, format!("Job {task_id} completed"));
        }
        ImportPhase::Failed { task_id, message } => {
            let job = task_id.as_deref().map(|id| format!("Job {id} ")).unwrap_or_default();
            ui.colored_label(colors.failure, format!("{job}failed: {message}"));
        }
    }

    ui.add(egui::ProgressBar::new(tracker.progress()).show_percentage());

    if let Some(job) = tracker.job() {
        ui.horizontal(|ui| {
            ui.colored_label(color_mapping::import_status_color(job.status, colors), job.status.label());
            ui.label(format!(
                "imported {} · failed {} · skipped {}",
                format_count(job.imported_count),
                format_count(job.failed_count),
                format_count(job.skipped_count)
            ));
        });
        for error in &job.errors {
            ui.colored_label(colors.failure, error);
        }
        for warning in &job.warnings {
            ui.colored_label(colors.warning, warning);
        }
    }
    if tracker.poll_failures() > 0 {
        ui.label(
            RichText::new(format!("{} status check(s) failed; still retrying", tracker.poll_failures()))
                .small()
                .color(colors.warning),
        );
    }

    if !tracker.logs().is_empty() {
        egui::CollapsingHeader::new(format!("Logs ({})", tracker.logs().len()))
            .default_open(true)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("import_logs")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        for line in tracker.logs() {
                            ui.monospace(line);
                        }
                    });
            });
    }

    if tracker.phase().is_terminal() && ui.button("Start over").clicked() {
        interaction = Some(PanelInteraction::ResetImport);
    }

    interaction
}

fn render_history(ui: &mut egui::Ui, state: &AppState, colors: &ThemeColors) {
    ui.label(RichText::new("Recent imports").strong());
    let Some(history) = remote_status(ui, &state.import.history, "import history") else {
        return;
    };
    if history.is_empty() {
        ui.label(RichText::new("Nothing imported yet.").color(colors.text_dim));
        return;
    }

    let now = unix_now();
    egui::Grid::new("import_history")
        .num_columns(5)
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for title in ["File", "Status", "Imported", "Failed", "Started"] {
                ui.label(RichText::new(title).strong());
            }
            ui.end_row();
            for entry in history {
                ui.label(&entry.file_name).on_hover_text(&entry.task_id);
                ui.label(&entry.status);
                ui.label(format_count(entry.imported_count));
                ui.label(format_count(entry.failed_count));
                ui.label(format_age(entry.created_at, now));
                ui.end_row();
            }
        });
}

fn render_clear_data(ui: &mut egui::Ui, state: &mut AppState, colors: &ThemeColors) -> Option<PanelInteraction> {
    let mut interaction = None;
    ui.label(RichText::new("Danger zone").strong().color(colors.failure));
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.import.clear_confirmed, "I understand this deletes every imported trajectory");
        let enabled = state.import.clear_confirmed && !state.import.clear_pending();
        if ui.add_enabled(enabled, egui::Button::new("Clear all data")).clicked() {
            interaction = Some(PanelInteraction::ClearData);
        }
        if state.import.clear_pending() {
            ui.spinner();
        }
    });
    match state.import.clear_outcome() {
        Some(Ok(message)) => {
            ui.colored_label(colors.success, message);
        }
        Some(Err(message)) => {
            ui.colored_label(colors.failure, format!("Clear failed: {message}"));
        }
        None => {}
    }
    interaction
}
