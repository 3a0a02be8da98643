//! Application-level modules for the trajectory dashboard.
//!
//! Centralized state plus the coordinators that turn user intents into
//! state changes and background requests.

mod app_state;
mod application_coordinator;
mod theme_coordinator;
mod settings_coordinator;

pub use app_state::AppState;
pub use application_coordinator::{ApplicationCoordinator, ListAction, Services};
pub use theme_coordinator::ThemeCoordinator;
pub use settings_coordinator::SettingsCoordinator;
