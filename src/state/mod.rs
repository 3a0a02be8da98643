//! State components of the dashboard (no UI code).
//!
//! - Navigation (tab, open detail view)
//! - Trajectory list (controller, filter panel buffers)
//! - Detail, questions, dashboard, training, analysis and import views
//! - Theme and layout preferences

mod navigation;
mod trajectory_state;
mod detail_state;
mod questions_state;
mod dashboard_state;
mod training_state;
mod analysis_state;
mod import_state;
mod theme_state;
mod layout_state;

pub use navigation::{NavigationState, Tab};
pub use trajectory_state::TrajectoryViewState;
pub use detail_state::{DetailEdit, DetailState};
pub use questions_state::QuestionsState;
pub use dashboard_state::DashboardState;
pub use training_state::{CurveMetric, TrainingState};
pub use analysis_state::AnalysisState;
pub use import_state::{ImportViewState, HISTORY_LIMIT};
pub use theme_state::ThemeState;
pub use layout_state::{LayoutState, TRAJECTORY_COLUMNS};
