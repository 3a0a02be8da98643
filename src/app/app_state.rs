//! Centralized application state.
//!
//! Composed of focused state components, one per view, each keeping its
//! invariants behind intent-revealing methods. The trajectory list lives
//! here rather than in its panel so its filters survive tab switches.

use rtraj::{AppConfig, TrajectoryListController};

use crate::state::{
    AnalysisState, DashboardState, DetailState, ImportViewState, LayoutState, NavigationState,
    QuestionsState, ThemeState, TrainingState, TrajectoryViewState,
};

pub struct AppState {
    pub config: AppConfig,

    // ===== Views =====
    pub nav: NavigationState,
    pub trajectories: TrajectoryViewState,
    pub detail: DetailState,
    pub questions: QuestionsState,
    pub dashboard: DashboardState,
    pub training: TrainingState,
    pub analysis: AnalysisState,
    pub import: ImportViewState,

    // ===== Preferences =====
    pub theme: ThemeState,
    pub layout: LayoutState,

    /// Last action-level error, shown under the header until dismissed.
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, theme: ThemeState, layout: LayoutState) -> Self {
        let list = TrajectoryListController::new(config.page_size, config.search_debounce);
        Self {
            nav: NavigationState::new(),
            trajectories: TrajectoryViewState::new(list),
            detail: DetailState::new(),
            questions: QuestionsState::new(config.page_size),
            dashboard: DashboardState::new(),
            training: TrainingState::new(),
            analysis: AnalysisState::new(),
            import: ImportViewState::new(),
            theme,
            layout,
            error_message: None,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), ThemeState::default(), LayoutState::default())
    }
}
