//! Overview cards and server health.

use rtraj::model::Health;
use rtraj::{GlobalStats, Remote};

#[derive(Debug, Default)]
pub struct DashboardState {
    pub stats: Remote<GlobalStats>,
    pub health: Remote<Health>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Health label for the status bar.
    pub fn health_label(&self) -> &str {
        if self.health.is_loading() && self.health.data().is_none() {
            return "checking";
        }
        match self.health.data() {
            Some(health) if !health.status.is_empty() => &health.status,
            Some(_) => "unknown",
            None => "unreachable",
        }
    }
}
