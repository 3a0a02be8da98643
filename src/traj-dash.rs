//! Trajectory analytics dashboard.
//!
//! Desktop client for the trajectory REST backend: overview statistics,
//! per-question success rates, a filterable trajectory list with detail
//! view, training curves, analysis charts and data import.
//!
//! The application is built with a modular architecture:
//! - `app/` - Application state and coordinators
//! - `state/` - Per-view state components
//! - `io/` - Background fetches and import status polling
//! - `presentation/` - Semantic color mapping
//! - `ui/` - Panel rendering
//! - `utils/` - Formatting and text measurement

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use eframe::egui;
use rtraj::{logging, ApiClient, AppConfig, HttpTransport};

mod utils;
mod presentation;
mod io;
mod app;
mod ui;
mod state;

use app::{AppState, ApplicationCoordinator, Services, SettingsCoordinator, ThemeCoordinator};
use io::FetchWorker;
use state::{LayoutState, Tab, ThemeState};
use ui::panel_manager::{PanelInteraction, PanelManager};

const LAYOUT_KEY: &str = "layout";

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    match logging::init(config.log_to_file) {
        Ok(_) => {}
        Err(err) => {
            logging::init_stderr_only();
            tracing::warn!(error = %err, "file logging unavailable; logging to stderr only");
        }
    }
    tracing::info!(api_base = %config.api_base, root_base = %config.root_base, "starting dashboard");

    let transport = HttpTransport::new(&config.api_base, &config.root_base, config.timeout)
        .context("failed to build HTTP client")?;
    let client = ApiClient::new(Arc::new(transport));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Trajectory Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Trajectory Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, client)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the dashboard: {err}"))
}

struct DashboardApp {
    state: AppState,
    services: Services,
}

impl DashboardApp {
    /// Restores theme and layout from persistent storage.
    fn new(cc: &eframe::CreationContext, config: AppConfig, client: ApiClient) -> Self {
        let theme = ThemeState::with_theme(ThemeCoordinator::load_theme_from_storage(cc.storage));
        let layout: LayoutState = SettingsCoordinator::load_setting_or(cc.storage, LAYOUT_KEY, LayoutState::default());

        Self {
            state: AppState::new(config, theme, layout),
            services: Services {
                worker: FetchWorker::new(client),
                poller: None,
            },
        }
    }

    fn persist(&self, storage: &mut dyn eframe::Storage) {
        ThemeCoordinator::save_theme_to_storage(storage, self.state.theme.current_theme_name());
        SettingsCoordinator::save_setting(storage, LAYOUT_KEY, &self.state.layout);
    }

    fn handle_panel_interaction(&mut self, interaction: PanelInteraction, ctx: &egui::Context) {
        let (state, services) = (&mut self.state, &mut self.services);
        match interaction {
            PanelInteraction::SwitchTab(tab) => ApplicationCoordinator::switch_tab(state, tab),
            PanelInteraction::Refresh(tab) => {
                if state.nav.detail().is_some() {
                    ApplicationCoordinator::reload_detail(state, services, ctx);
                } else {
                    ApplicationCoordinator::refresh(state, services, ctx, tab);
                }
            }
            PanelInteraction::List(action) => {
                ApplicationCoordinator::handle_list_action(state, services, ctx, action);
            }
            PanelInteraction::OpenTrajectory(id) => {
                ApplicationCoordinator::open_trajectory(state, services, ctx, id);
            }
            PanelInteraction::CloseDetail => state.nav.close_detail(),
            PanelInteraction::ReloadDetail => ApplicationCoordinator::reload_detail(state, services, ctx),
            PanelInteraction::ToggleBookmark(id) => {
                ApplicationCoordinator::toggle_bookmark(state, services, ctx, id);
            }
            PanelInteraction::EditDetail(edit) => {
                ApplicationCoordinator::edit_detail(state, services, ctx, edit);
            }
            PanelInteraction::Export(format, path) => {
                ApplicationCoordinator::export(state, services, ctx, format, path);
            }
            PanelInteraction::ShowQuestion(data_id) => {
                ApplicationCoordinator::show_question(state, services, ctx, data_id);
            }
            PanelInteraction::ShowEpoch { training_id, epoch_id } => {
                ApplicationCoordinator::show_epoch(state, services, ctx, training_id, epoch_id);
            }
            PanelInteraction::QuestionsPage(page) => {
                ApplicationCoordinator::questions_page(state, services, ctx, page);
            }
            PanelInteraction::ToggleTrainingRun(run) => {
                ApplicationCoordinator::toggle_training_run(state, services, ctx, &run);
            }
            PanelInteraction::SelectIterationRun(run) => {
                ApplicationCoordinator::select_iteration_run(state, services, ctx, run);
            }
            PanelInteraction::LoadToolContexts => ApplicationCoordinator::load_tool_contexts(state, services, ctx),
            PanelInteraction::ImportUpload(path) => {
                ApplicationCoordinator::import_upload(state, services, ctx, path);
            }
            PanelInteraction::ImportFromPath => ApplicationCoordinator::import_from_path(state, services, ctx),
            PanelInteraction::ResetImport => ApplicationCoordinator::reset_import(state, services),
            PanelInteraction::ClearData => ApplicationCoordinator::clear_data(state, services, ctx),
        }
    }
}

impl eframe::App for DashboardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.persist(storage);
    }

    /// 1. Commit finished requests and import polls
    /// 2. Apply theme
    /// 3. Release debounced search and load the visible view
    /// 4. Render panels and handle the interaction
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        ApplicationCoordinator::check_completion(&mut self.state, &mut self.services, ctx);

        ThemeCoordinator::apply_current_theme(ctx, &self.state);

        if let Some(storage) = frame.storage_mut() {
            self.persist(storage);
        }

        ApplicationCoordinator::tick(&mut self.state, &mut self.services, ctx, Instant::now());

        let in_flight = self.services.worker.in_flight();
        if let Some(interaction) = PanelManager::render_all_panels(ctx, &mut self.state, in_flight) {
            tracing::debug!(?interaction, "panel interaction");
            self.handle_panel_interaction(interaction, ctx);
        }

        if self.state.nav.tab() == Tab::Import && self.state.import.tracker.is_polling() {
            ctx.request_repaint_after(self.state.config.poll_interval);
        }
    }
}
