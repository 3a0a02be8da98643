//! Which view is on screen.

/// Top-level dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Questions,
    Trajectories,
    Training,
    Analysis,
    Import,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Dashboard,
        Tab::Questions,
        Tab::Trajectories,
        Tab::Training,
        Tab::Analysis,
        Tab::Import,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Questions => "Questions",
            Tab::Trajectories => "Trajectories",
            Tab::Training => "Training",
            Tab::Analysis => "Analysis",
            Tab::Import => "Import",
        }
    }
}

/// Current tab plus the trajectory detail overlay.
///
/// The detail view sits on top of whichever tab opened it; closing it returns
/// to that tab unchanged.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    tab: Tab,
    detail: Option<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Trajectory shown in the detail view, if open.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Switches tab and closes any open detail view.
    pub fn switch_to(&mut self, tab: Tab) {
        self.tab = tab;
        self.detail = None;
    }

    pub fn open_detail(&mut self, trajectory_id: String) {
        self.detail = Some(trajectory_id);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_tab_closes_detail() {
        let mut nav = NavigationState::new();
        nav.switch_to(Tab::Trajectories);
        nav.open_detail("t1".into());
        assert_eq!(nav.detail(), Some("t1"));
        assert_eq!(nav.tab(), Tab::Trajectories);

        nav.switch_to(Tab::Questions);
        assert_eq!(nav.detail(), None);
    }
}
