//! Panel orchestration and layout management.
//!
//! Lays out header, status bar and the central view, and funnels whatever
//! the user did into a single [`PanelInteraction`] for the coordinator.

use std::path::PathBuf;

use rtraj::ExportFormat;

use crate::app::{AppState, ListAction};
use crate::state::{DetailEdit, Tab};
use crate::ui::{
    analysis_panel, dashboard_panel, details_panel, header, import_panel, questions_panel, status_bar,
    training_panel, trajectory_panel,
};

/// Result of panel interactions that need to be handled by the application coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelInteraction {
    SwitchTab(Tab),
    Refresh(Tab),
    List(ListAction),
    OpenTrajectory(String),
    CloseDetail,
    ReloadDetail,
    ToggleBookmark(String),
    EditDetail(DetailEdit),
    /// Jump to every trajectory attempting this question.
    ShowQuestion(String),
    /// Jump to the trajectories of one training epoch.
    ShowEpoch { training_id: String, epoch_id: i64 },
    QuestionsPage(u32),
    /// Download every trajectory and save it to the chosen file.
    Export(ExportFormat, PathBuf),
    ToggleTrainingRun(String),
    SelectIterationRun(String),
    LoadToolContexts,
    ImportUpload(PathBuf),
    ImportFromPath,
    ResetImport,
    ClearData,
}

pub struct PanelManager;

impl PanelManager {
    /// Renders every panel. Called from `eframe::App::update`.
    pub fn render_all_panels(
        ctx: &egui::Context,
        state: &mut AppState,
        in_flight: usize,
    ) -> Option<PanelInteraction> {
        let mut interaction: Option<PanelInteraction> = None;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            if let Some(header_interaction) = header::render_header(ui, state) {
                interaction = Some(match header_interaction {
                    header::HeaderInteraction::SwitchTab(tab) => PanelInteraction::SwitchTab(tab),
                    header::HeaderInteraction::Refresh(tab) => PanelInteraction::Refresh(tab),
                });
            }
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar::render_status_bar(ui, state, in_flight);
        });

        let frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(8))
            .fill(ctx.style().visuals.panel_fill);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let view_interaction = if state.nav.detail().is_some() {
                details_panel::render_details_panel(ui, state)
            } else {
                match state.nav.tab() {
                    Tab::Dashboard => {
                        dashboard_panel::render_dashboard_panel(ui, state);
                        None
                    }
                    Tab::Questions => questions_panel::render_questions_panel(ui, state),
                    Tab::Trajectories => trajectory_panel::render_trajectory_panel(ui, state),
                    Tab::Training => training_panel::render_training_panel(ui, state),
                    Tab::Analysis => analysis_panel::render_analysis_panel(ui, state),
                    Tab::Import => import_panel::render_import_panel(ui, state),
                }
            };
            if view_interaction.is_some() {
                interaction = view_interaction;
            }
        });

        interaction
    }
}
