//! Theme selection state.

use rtraj::theme::{ThemeColors, ThemeManager, DEFAULT_THEME};

pub struct ThemeState {
    theme_manager: ThemeManager,
    current_theme_name: String,
}

impl std::fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeState")
            .field("current_theme_name", &self.current_theme_name)
            .finish_non_exhaustive()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::with_theme(DEFAULT_THEME.to_string())
    }
}

impl ThemeState {
    /// Uses `theme_name` if it exists, otherwise the default theme.
    pub fn with_theme(theme_name: String) -> Self {
        let theme_manager = ThemeManager::new();
        let current_theme_name = theme_manager.resolve(&theme_name).name.clone();
        Self {
            theme_manager,
            current_theme_name,
        }
    }

    pub fn theme_manager(&self) -> &ThemeManager {
        &self.theme_manager
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme_name
    }

    pub fn colors(&self) -> &ThemeColors {
        &self.theme_manager.resolve(&self.current_theme_name).colors
    }

    pub fn set_theme(&mut self, theme_name: String) {
        self.current_theme_name = theme_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_persisted_theme_falls_back() {
        let state = ThemeState::with_theme("One Dark Pro".into());
        assert_eq!(state.current_theme_name(), DEFAULT_THEME);
    }
}
