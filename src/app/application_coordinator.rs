//! Application-level workflows.
//!
//! Turns user intents into state changes plus background fetches, and
//! commits finished fetches back into state. Panels never talk to the
//! network directly.

use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;
use rtraj::{ApiError, ExportFormat, FetchRequest, FilterField, ImportAction, JumpFilter, SortField};

use crate::app::AppState;
use crate::io::{FetchOutcome, FetchWorker, ImportPoller, PollEvent};
use crate::state::{DetailEdit, Tab, HISTORY_LIMIT};

/// Trajectory list actions raised by the list panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    /// Parse the filter panel row for this column and apply it.
    ApplyFilter(FilterField),
    SetFilterActive(FilterField, bool),
    ClearFilter(FilterField),
    ClearAll,
    SetSort(SortField),
    ClearSort,
    ChangePage(u32),
    Reset,
    ClearJump,
}

/// Background services owned by the app next to its state.
pub struct Services {
    pub worker: FetchWorker,
    pub poller: Option<ImportPoller>,
}

pub struct ApplicationCoordinator;

impl ApplicationCoordinator {
    // ===== Frame hooks =====

    /// Commits finished fetches and import poll results. Called once per frame.
    pub fn check_completion(state: &mut AppState, services: &mut Services, ctx: &egui::Context) {
        for outcome in services.worker.check_completion() {
            Self::apply_outcome(state, services, ctx, outcome);
        }

        let events = services.poller.as_ref().map(ImportPoller::drain).unwrap_or_default();
        for event in events {
            let action = match event {
                PollEvent::Status(job) => state.import.tracker.on_status(job),
                PollEvent::Failed(err) => state.import.tracker.on_poll_error(&err),
            };
            Self::run_import_action(state, services, ctx, action);
        }
    }

    /// Time-driven work: releases debounced search terms and loads the
    /// visible view the first time it is shown.
    pub fn tick(state: &mut AppState, services: &mut Services, ctx: &egui::Context, now: Instant) {
        if let Some(request) = state.trajectories.list.poll_search(now) {
            Self::spawn_list_fetch(&services.worker, ctx, request);
        }
        if let Some(wait) = state.trajectories.list.search_pending_for(now) {
            ctx.request_repaint_after(wait);
        }

        if state.dashboard.health.needs_load() {
            Self::load_health(state, &services.worker, ctx);
        }
        if state.nav.detail().is_none() {
            let tab = state.nav.tab();
            Self::load_tab(state, &services.worker, ctx, tab, false);
        }
    }

    // ===== Navigation =====

    pub fn switch_tab(state: &mut AppState, tab: Tab) {
        state.nav.switch_to(tab);
    }

    /// Reloads every view of `tab`.
    pub fn refresh(state: &mut AppState, services: &Services, ctx: &egui::Context, tab: Tab) {
        Self::load_tab(state, &services.worker, ctx, tab, true);
    }

    pub fn open_trajectory(state: &mut AppState, services: &Services, ctx: &egui::Context, trajectory_id: String) {
        let seq = state.detail.open(trajectory_id.clone());
        state.nav.open_detail(trajectory_id.clone());
        services.worker.spawn(ctx, "trajectory", move |client| FetchOutcome::Detail {
            seq,
            result: client.trajectory(&trajectory_id),
        });
    }

    pub fn reload_detail(state: &mut AppState, services: &Services, ctx: &egui::Context) {
        if let Some((trajectory_id, seq)) = state.detail.reload() {
            services.worker.spawn(ctx, "trajectory", move |client| FetchOutcome::Detail {
                seq,
                result: client.trajectory(&trajectory_id),
            });
        }
    }

    pub fn toggle_bookmark(state: &mut AppState, services: &Services, ctx: &egui::Context, trajectory_id: String) {
        if !state.detail.begin_bookmark() {
            return;
        }
        services.worker.spawn(ctx, "bookmark", move |client| {
            let result = client.toggle_bookmark(&trajectory_id);
            FetchOutcome::Bookmark { trajectory_id, result }
        });
    }

    /// Writes notes or tag changes for the open trajectory.
    pub fn edit_detail(state: &mut AppState, services: &Services, ctx: &egui::Context, edit: DetailEdit) {
        let Some(trajectory_id) = state.detail.trajectory_id().map(str::to_string) else {
            return;
        };
        if let DetailEdit::AddTag(tag) | DetailEdit::RemoveTag(tag) = &edit {
            if tag.trim().is_empty() {
                return;
            }
        }
        if !state.detail.begin_edit() {
            return;
        }
        services.worker.spawn(ctx, "detail-edit", move |client| {
            let result = match &edit {
                DetailEdit::Notes(notes) => client.update_notes(&trajectory_id, notes).map(|()| None),
                DetailEdit::AddTag(tag) => client.add_tag(&trajectory_id, tag.trim()).map(Some),
                DetailEdit::RemoveTag(tag) => client.remove_tag(&trajectory_id, tag).map(|()| None),
            };
            FetchOutcome::DetailEdited {
                trajectory_id,
                edit,
                result,
            }
        });
    }

    /// Downloads every trajectory in `format` and writes it to `path`.
    pub fn export(state: &mut AppState, services: &Services, ctx: &egui::Context, format: ExportFormat, path: PathBuf) {
        if !state.trajectories.begin_export() {
            return;
        }
        tracing::info!(format = format.as_str(), path = %path.display(), "exporting trajectories");
        services.worker.spawn(ctx, "export", move |client| {
            let result = client.export(format).and_then(|body| {
                std::fs::write(&path, body.as_bytes())
                    .map(|()| body.len())
                    .map_err(|source| ApiError::Io {
                        path: path.clone(),
                        source,
                    })
            });
            FetchOutcome::Exported { path, result }
        });
    }

    /// Shows every trajectory attempting one question.
    pub fn show_question(state: &mut AppState, services: &Services, ctx: &egui::Context, data_id: String) {
        let request = state.trajectories.list.seed_jump(JumpFilter::Question(data_id));
        state.trajectories.sync_drafts();
        state.nav.switch_to(Tab::Trajectories);
        Self::spawn_list_fetch(&services.worker, ctx, request);
    }

    /// Shows the trajectories of one training epoch.
    pub fn show_epoch(
        state: &mut AppState,
        services: &Services,
        ctx: &egui::Context,
        training_id: String,
        epoch_id: i64,
    ) {
        let (request, errors) = state.trajectories.list.seed_filters([
            (FilterField::TrainingId, rtraj::FilterValue::Text(training_id)),
            (FilterField::EpochId, rtraj::FilterValue::Integer(epoch_id)),
        ]);
        for err in errors {
            tracing::warn!(error = %err, "skipped seeded filter");
        }
        state.trajectories.sync_drafts();
        state.nav.switch_to(Tab::Trajectories);
        Self::spawn_list_fetch(&services.worker, ctx, request);
    }

    // ===== Trajectory list =====

    pub fn handle_list_action(state: &mut AppState, services: &Services, ctx: &egui::Context, action: ListAction) {
        let view = &mut state.trajectories;
        let request = match action {
            ListAction::ApplyFilter(field) => {
                let parsed = view.draft(field).map_or(Ok(None), |draft| draft.parse(field));
                match parsed {
                    Ok(Some(value)) => match view.list.apply_filter(field, value) {
                        Ok(request) => {
                            view.set_filter_error(None);
                            Some(request)
                        }
                        Err(err) => {
                            view.set_filter_error(Some(err.to_string()));
                            None
                        }
                    },
                    Ok(None) => {
                        view.set_filter_error(None);
                        Some(view.list.clear_filter(field))
                    }
                    Err(message) => {
                        view.set_filter_error(Some(message));
                        None
                    }
                }
            }
            ListAction::SetFilterActive(field, active) => view.list.set_filter_active(field, active),
            ListAction::ClearFilter(field) => {
                view.clear_draft(field);
                Some(view.list.clear_filter(field))
            }
            ListAction::ClearAll => {
                let request = view.list.clear_all();
                view.sync_drafts();
                Some(request)
            }
            ListAction::SetSort(field) => Some(view.list.set_sort(field)),
            ListAction::ClearSort => Some(view.list.clear_sort()),
            ListAction::ChangePage(page) => Some(view.list.change_page(page)),
            ListAction::Reset => {
                let request = view.list.reset();
                view.sync_drafts();
                Some(request)
            }
            ListAction::ClearJump => view.list.clear_jump(),
        };
        if let Some(request) = request {
            Self::spawn_list_fetch(&services.worker, ctx, request);
        }
    }

    fn spawn_list_fetch(worker: &FetchWorker, ctx: &egui::Context, request: FetchRequest) {
        let FetchRequest { seq, params, .. } = request;
        worker.spawn(ctx, "trajectories", move |client| FetchOutcome::TrajectoryPage {
            seq,
            result: client.list_trajectories(params),
        });
    }

    // ===== Questions, training, analysis =====

    pub fn questions_page(state: &mut AppState, services: &Services, ctx: &egui::Context, page: u32) {
        let (page, seq) = state.questions.go_to(page);
        let page_size = state.questions.page_size();
        services.worker.spawn(ctx, "questions", move |client| FetchOutcome::Questions {
            seq,
            result: client.list_questions(page, page_size),
        });
    }

    pub fn toggle_training_run(state: &mut AppState, services: &Services, ctx: &egui::Context, run: &str) {
        let (runs, seq) = state.training.toggle_run(run);
        services.worker.spawn(ctx, "epoch-level", move |client| FetchOutcome::EpochLevel {
            seq,
            result: client.epoch_level(&runs),
        });
    }

    pub fn select_iteration_run(state: &mut AppState, services: &Services, ctx: &egui::Context, run: String) {
        let seq = state.training.select_iteration_run(run.clone());
        Self::spawn_iteration_fetch(&services.worker, ctx, run, seq);
    }

    fn spawn_iteration_fetch(worker: &FetchWorker, ctx: &egui::Context, run: String, seq: rtraj::Seq) {
        worker.spawn(ctx, "iteration-level", move |client| FetchOutcome::IterationLevel {
            seq,
            result: client.iteration_level(&run),
        });
    }

    pub fn load_tool_contexts(state: &mut AppState, services: &Services, ctx: &egui::Context) {
        let seq = state.analysis.contexts.begin();
        let category = state.analysis.context_category.clone();
        let limit = state.analysis.context_limit;
        services.worker.spawn(ctx, "tool-contexts", move |client| FetchOutcome::ToolContexts {
            seq,
            result: client.unexpected_tool_contexts(category.as_deref(), limit),
        });
    }

    // ===== Import =====

    pub fn import_upload(state: &mut AppState, services: &mut Services, ctx: &egui::Context, path: PathBuf) {
        if !Self::begin_import(state, services) {
            return;
        }
        tracing::info!(path = %path.display(), "uploading import file");
        services.worker.spawn(ctx, "import-upload", move |client| FetchOutcome::ImportSubmitted {
            result: client.import_upload(path),
        });
    }

    pub fn import_from_path(state: &mut AppState, services: &mut Services, ctx: &egui::Context) {
        let path = state.import.path_input.trim().to_string();
        if path.is_empty() || !Self::begin_import(state, services) {
            return;
        }
        let file_type = state.import.file_type;
        tracing::info!(%path, file_type = file_type.as_str(), "importing from server path");
        services.worker.spawn(ctx, "import-path", move |client| FetchOutcome::ImportSubmitted {
            result: client.import_from_path(&path, file_type),
        });
    }

    fn begin_import(state: &mut AppState, services: &mut Services) -> bool {
        if !state.import.tracker.begin_submit() {
            return false;
        }
        services.poller = None;
        true
    }

    /// Forgets the current job and stops its poller.
    pub fn reset_import(state: &mut AppState, services: &mut Services) {
        if let Some(poller) = services.poller.take() {
            tracing::info!(task_id = poller.task_id(), "import polling cancelled");
        }
        state.import.tracker.reset();
    }

    pub fn clear_data(state: &mut AppState, services: &Services, ctx: &egui::Context) {
        if !state.import.begin_clear() {
            return;
        }
        tracing::info!("clearing all imported data");
        services.worker.spawn(ctx, "clear-data", |client| FetchOutcome::DataCleared {
            result: client.clear_data(),
        });
    }

    fn run_import_action(state: &mut AppState, services: &mut Services, ctx: &egui::Context, action: ImportAction) {
        match action {
            ImportAction::Nothing | ImportAction::ContinuePolling => {}
            ImportAction::StartPolling(task_id) => {
                let started = ImportPoller::start(
                    services.worker.client().clone(),
                    task_id.clone(),
                    state.config.poll_interval,
                    ctx,
                );
                match started {
                    Ok(poller) => services.poller = Some(poller),
                    Err(err) => {
                        tracing::error!(%task_id, error = %err, "failed to spawn import poller");
                        services.poller = None;
                        state.import.tracker.on_poll_unavailable(&err.to_string());
                    }
                }
            }
            ImportAction::FinishAndFetchLogs(task_id) => {
                services.poller = None;
                services.worker.spawn(ctx, "import-logs", move |client| {
                    let result = client.import_logs(&task_id);
                    FetchOutcome::ImportLogs { task_id, result }
                });
                Self::load_import_history(state, &services.worker, ctx);
            }
        }
    }

    // ===== Loading =====

    fn load_tab(state: &mut AppState, worker: &FetchWorker, ctx: &egui::Context, tab: Tab, force: bool) {
        match tab {
            Tab::Dashboard => {
                if force || state.dashboard.stats.needs_load() {
                    let seq = state.dashboard.stats.begin();
                    worker.spawn(ctx, "stats", move |client| FetchOutcome::Stats {
                        seq,
                        result: client.global_stats(),
                    });
                }
                if force {
                    Self::load_health(state, worker, ctx);
                }
            }
            Tab::Questions => {
                if force || state.questions.questions.needs_load() {
                    let (page, seq) = state.questions.go_to(state.questions.page());
                    let page_size = state.questions.page_size();
                    worker.spawn(ctx, "questions", move |client| FetchOutcome::Questions {
                        seq,
                        result: client.list_questions(page, page_size),
                    });
                }
            }
            Tab::Trajectories => {
                let list = &mut state.trajectories.list;
                let first_show = !list.result().loaded && !list.is_loading();
                if force || first_show {
                    let request = list.fetch_page(list.page());
                    Self::spawn_list_fetch(worker, ctx, request);
                }
            }
            Tab::Training => {
                if force || state.training.runs.needs_load() {
                    let seq = state.training.runs.begin();
                    worker.spawn(ctx, "training-runs", move |client| FetchOutcome::TrainingRuns {
                        seq,
                        result: client.training_runs(),
                    });
                    let runs = state.training.selected_runs();
                    let seq = state.training.epochs.begin();
                    worker.spawn(ctx, "epoch-level", move |client| FetchOutcome::EpochLevel {
                        seq,
                        result: client.epoch_level(&runs),
                    });
                }
                if force {
                    if let Some(run) = state.training.iteration_run().map(str::to_string) {
                        let seq = state.training.iterations.begin();
                        Self::spawn_iteration_fetch(worker, ctx, run, seq);
                    }
                }
            }
            Tab::Analysis => {
                if force || state.analysis.needs_load() {
                    Self::load_analysis(state, worker, ctx);
                }
            }
            Tab::Import => {
                if force || state.import.allowed_dirs.needs_load() {
                    let seq = state.import.allowed_dirs.begin();
                    worker.spawn(ctx, "allowed-dirs", move |client| FetchOutcome::AllowedDirectories {
                        seq,
                        result: client.allowed_directories(),
                    });
                    Self::load_import_history(state, worker, ctx);
                }
            }
        }
    }

    fn load_health(state: &mut AppState, worker: &FetchWorker, ctx: &egui::Context) {
        let seq = state.dashboard.health.begin();
        worker.spawn(ctx, "health", move |client| FetchOutcome::Health {
            seq,
            result: client.health(),
        });
    }

    fn load_analysis(state: &mut AppState, worker: &FetchWorker, ctx: &egui::Context) {
        let analysis = &mut state.analysis;
        let seq = analysis.termination.begin();
        worker.spawn(ctx, "termination", move |client| FetchOutcome::Termination {
            seq,
            result: client.termination_stats(),
        });
        let seq = analysis.rewards.begin();
        worker.spawn(ctx, "reward-categories", move |client| FetchOutcome::RewardCategories {
            seq,
            result: client.reward_category_stats(),
        });
        let seq = analysis.tool_returns.begin();
        worker.spawn(ctx, "tool-returns", move |client| FetchOutcome::ToolReturns {
            seq,
            result: client.tool_return_stats(),
        });
        let seq = analysis.correlation.begin();
        worker.spawn(ctx, "correlation", move |client| FetchOutcome::Correlation {
            seq,
            result: client.process_reward_correlation(),
        });
        let seq = analysis.contexts.begin();
        let category = analysis.context_category.clone();
        let limit = analysis.context_limit;
        worker.spawn(ctx, "tool-contexts", move |client| FetchOutcome::ToolContexts {
            seq,
            result: client.unexpected_tool_contexts(category.as_deref(), limit),
        });
    }

    fn load_import_history(state: &mut AppState, worker: &FetchWorker, ctx: &egui::Context) {
        let seq = state.import.history.begin();
        worker.spawn(ctx, "import-history", move |client| FetchOutcome::ImportHistory {
            seq,
            result: client.import_history(HISTORY_LIMIT),
        });
    }

    // ===== Commit =====

    fn apply_outcome(state: &mut AppState, services: &mut Services, ctx: &egui::Context, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::TrajectoryPage { seq, result } => {
                state.trajectories.list.apply_response(seq, result);
            }
            FetchOutcome::Detail { seq, result } => {
                state.detail.commit(seq, result);
            }
            FetchOutcome::Bookmark { trajectory_id, result } => {
                state.detail.finish_bookmark(&trajectory_id, result);
            }
            FetchOutcome::DetailEdited {
                trajectory_id,
                edit,
                result,
            } => {
                if let Err(err) = &result {
                    tracing::warn!(%trajectory_id, ?edit, error = %err, "annotation write failed");
                }
                state.detail.finish_edit(&trajectory_id, edit, result);
            }
            FetchOutcome::Exported { path, result } => {
                if let Err(err) = &result {
                    tracing::warn!(path = %path.display(), error = %err, "export failed");
                }
                if let Some(failure) = state.trajectories.finish_export(&path, result) {
                    state.error_message = Some(format!("Export failed: {failure}"));
                }
            }
            FetchOutcome::Questions { seq, result } => {
                state.questions.questions.commit(seq, result);
            }
            FetchOutcome::Stats { seq, result } => {
                state.dashboard.stats.commit(seq, result);
            }
            FetchOutcome::Health { seq, result } => {
                state.dashboard.health.commit(seq, result);
            }
            FetchOutcome::TrainingRuns { seq, result } => {
                if state.training.runs.commit(seq, result) {
                    if let Some((run, seq)) = state.training.default_iteration_run() {
                        Self::spawn_iteration_fetch(&services.worker, ctx, run, seq);
                    }
                }
            }
            FetchOutcome::EpochLevel { seq, result } => {
                state.training.epochs.commit(seq, result);
            }
            FetchOutcome::IterationLevel { seq, result } => {
                state.training.iterations.commit(seq, result);
            }
            FetchOutcome::Termination { seq, result } => {
                state.analysis.termination.commit(seq, result);
            }
            FetchOutcome::RewardCategories { seq, result } => {
                state.analysis.rewards.commit(seq, result);
            }
            FetchOutcome::ToolReturns { seq, result } => {
                state.analysis.tool_returns.commit(seq, result);
            }
            FetchOutcome::Correlation { seq, result } => {
                state.analysis.correlation.commit(seq, result);
            }
            FetchOutcome::ToolContexts { seq, result } => {
                state.analysis.contexts.commit(seq, result);
            }
            FetchOutcome::ImportSubmitted { result } => {
                let action = state.import.tracker.on_submitted(result);
                Self::run_import_action(state, services, ctx, action);
            }
            FetchOutcome::ImportLogs { task_id, result } => {
                state.import.tracker.on_logs(&task_id, result);
            }
            FetchOutcome::AllowedDirectories { seq, result } => {
                state.import.allowed_dirs.commit(seq, result);
            }
            FetchOutcome::ImportHistory { seq, result } => {
                state.import.history.commit(seq, result);
            }
            FetchOutcome::DataCleared { result } => {
                let cleared = result.is_ok();
                state.import.finish_clear(result);
                if cleared {
                    let request = Self::invalidate_data_views(state);
                    Self::spawn_list_fetch(&services.worker, ctx, request);
                    Self::load_import_history(state, &services.worker, ctx);
                }
            }
        }
    }

    /// Drops cached data after the backend was wiped so views reload on
    /// their next show. The trajectory list restarts right away.
    fn invalidate_data_views(state: &mut AppState) -> FetchRequest {
        state.dashboard.stats.reset();
        state.questions.questions.reset();
        state.training.runs.reset();
        state.training.epochs.reset();
        state.training.iterations.reset();
        state.analysis = crate::state::AnalysisState::new();
        let request = state.trajectories.list.reset();
        state.trajectories.sync_drafts();
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtraj::{ApiClient, ApiError, ApiRequest, Transport};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records request paths and answers each with a canned body.
    #[derive(Default)]
    struct Recorder {
        paths: Mutex<Vec<String>>,
    }

    impl Transport for Recorder {
        fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
            self.paths.lock().unwrap().push(request.path.clone());
            Ok(match request.path.as_str() {
                "/trajectories" if !request.segments.is_empty() => json!({"tags": ["slow", "review"]}),
                "/trajectories" if request.params.iter().any(|(k, _)| k == "agent_name") => {
                    return Err(ApiError::Status {
                        code: 500,
                        message: "database locked".into(),
                    })
                }
                "/trajectories" => json!({"data": [{"trajectory_id": "t1"}], "total": 1}),
                "/trajectories/t1" => json!({"trajectory_id": "t1", "tags": ["slow"], "notes": ""}),
                "/export/csv" => json!("trajectory_id\nt1\n"),
                "/import/from-path" => json!({"task_id": "imp_1", "status": "completed", "progress": 100}),
                "/import/logs/imp_1" => json!({"logs": ["imported 1 trajectory"]}),
                _ => json!({}),
            })
        }
    }

    fn setup() -> (AppState, Services, Arc<Recorder>, egui::Context) {
        let recorder = Arc::new(Recorder::default());
        let services = Services {
            worker: FetchWorker::new(ApiClient::new(recorder.clone())),
            poller: None,
        };
        (AppState::default(), services, recorder, egui::Context::default())
    }

    fn settle(state: &mut AppState, services: &mut Services, ctx: &egui::Context) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            ApplicationCoordinator::check_completion(state, services, ctx);
            if services.worker.in_flight() == 0 || Instant::now() > deadline {
                ApplicationCoordinator::check_completion(state, services, ctx);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn epoch_navigation_seeds_filters_and_switches_tab() {
        let (mut state, mut services, _, ctx) = setup();
        ApplicationCoordinator::show_epoch(&mut state, &services, &ctx, "train_7".into(), 3);
        assert_eq!(state.nav.tab(), Tab::Trajectories);
        settle(&mut state, &mut services, &ctx);

        let list = &state.trajectories.list;
        assert_eq!(list.page(), 1);
        assert_eq!(list.result().total, 1);
        assert!(list.filters().get(FilterField::EpochId).is_some());
        assert_eq!(
            state.trajectories.draft(FilterField::TrainingId).map(|d| d.text.as_str()),
            Some("train_7")
        );
    }

    #[test]
    fn invalid_filter_input_is_reported_without_fetching() {
        let (mut state, services, recorder, ctx) = setup();
        state.trajectories.draft_mut(FilterField::EpochId).text = "x".into();
        ApplicationCoordinator::handle_list_action(
            &mut state,
            &services,
            &ctx,
            ListAction::ApplyFilter(FilterField::EpochId),
        );
        assert!(state.trajectories.filter_error().is_some());
        assert_eq!(services.worker.in_flight(), 0);
        assert!(recorder.paths.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_list_read_shows_an_empty_page_without_a_banner() {
        let (mut state, mut services, _, ctx) = setup();
        state.trajectories.draft_mut(FilterField::AgentName).text = "planner".into();
        ApplicationCoordinator::handle_list_action(
            &mut state,
            &services,
            &ctx,
            ListAction::ApplyFilter(FilterField::AgentName),
        );
        settle(&mut state, &mut services, &ctx);

        let result = state.trajectories.list.result();
        assert!(result.loaded);
        assert!(result.trajectories.is_empty());
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn tag_added_in_detail_view_uses_server_tag_list() {
        let (mut state, mut services, recorder, ctx) = setup();
        ApplicationCoordinator::open_trajectory(&mut state, &services, &ctx, "t1".into());
        settle(&mut state, &mut services, &ctx);

        ApplicationCoordinator::edit_detail(&mut state, &services, &ctx, DetailEdit::AddTag("  ".into()));
        assert_eq!(services.worker.in_flight(), 0);

        state.detail.tag_input = "review".into();
        ApplicationCoordinator::edit_detail(&mut state, &services, &ctx, DetailEdit::AddTag("review".into()));
        settle(&mut state, &mut services, &ctx);

        let tags = state.detail.detail.data().map(|d| d.tags.clone());
        assert_eq!(tags, Some(vec!["slow".to_string(), "review".to_string()]));
        assert!(state.detail.tag_input.is_empty());
        assert_eq!(recorder.paths.lock().unwrap().iter().filter(|p| *p == "/trajectories").count(), 1);
    }

    #[test]
    fn export_writes_the_downloaded_body() {
        let (mut state, mut services, _, ctx) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectories.csv");
        ApplicationCoordinator::export(&mut state, &services, &ctx, ExportFormat::Csv, path.clone());
        assert!(state.trajectories.export_pending());
        settle(&mut state, &mut services, &ctx);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "trajectory_id\nt1\n");
        assert!(state.trajectories.last_export().is_some());
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn terminal_import_fetches_logs_without_polling() {
        let (mut state, mut services, recorder, ctx) = setup();
        state.import.set_path("/data/run.json".into());
        ApplicationCoordinator::import_from_path(&mut state, &mut services, &ctx);
        settle(&mut state, &mut services, &ctx);
        settle(&mut state, &mut services, &ctx);

        assert!(services.poller.is_none());
        assert_eq!(state.import.tracker.logs(), ["imported 1 trajectory"]);
        let paths = recorder.paths.lock().unwrap();
        assert!(paths.iter().all(|p| !p.starts_with("/import/status")));
    }
}
