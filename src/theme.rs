//! Color themes for the dashboard.
//!
//! Each theme carries a base palette for egui widgets plus semantic colors
//! for outcomes (success/failure), difficulty buckets and a chart series
//! palette.
//!
//! # Examples
//!
//! ```
//! use rtraj::theme::ThemeManager;
//!
//! let manager = ThemeManager::new();
//! let dracula = manager.get_theme("Dracula").unwrap();
//! assert_ne!(dracula.colors.success, dracula.colors.failure);
//! ```

use egui::Color32;
use std::collections::BTreeMap;

pub const DEFAULT_THEME: &str = "Dark";

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub panel_background: Color32,
    pub extreme_background: Color32,
    pub text: Color32,
    pub text_dim: Color32,
    pub selection: Color32,
    pub hover: Color32,
    pub accent: Color32,

    pub success: Color32,
    pub failure: Color32,
    pub warning: Color32,

    pub easy: Color32,
    pub medium: Color32,
    pub hard: Color32,

    /// Series colors for line and bar charts, cycled in order.
    pub series: [Color32; 6],
}

impl ThemeColors {
    /// Color of the `index`-th chart series.
    pub fn series_color(&self, index: usize) -> Color32 {
        self.series[index % self.series.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub dark: bool,
    pub colors: ThemeColors,
}

/// Built-in themes keyed by name.
pub struct ThemeManager {
    themes: BTreeMap<String, Theme>,
}

impl ThemeManager {
    pub fn new() -> Self {
        let themes = [light_theme(), dark_theme(), dracula_theme()]
            .into_iter()
            .map(|theme| (theme.name.clone(), theme))
            .collect();
        Self { themes }
    }

    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// The named theme, or the default one when the name is unknown (for
    /// example a stale persisted preference).
    pub fn resolve(&self, name: &str) -> &Theme {
        match self.themes.get(name) {
            Some(theme) => theme,
            None => &self.themes[DEFAULT_THEME],
        }
    }

    /// Theme names in alphabetical order.
    pub fn list_themes(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    /// Builds egui visuals for a theme.
    pub fn visuals(&self, theme: &Theme) -> egui::Visuals {
        let colors = &theme.colors;
        let mut visuals = if theme.dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };

        visuals.panel_fill = colors.panel_background;
        visuals.window_fill = colors.panel_background;
        visuals.extreme_bg_color = colors.extreme_background;
        visuals.faint_bg_color = colors.hover;
        visuals.override_text_color = Some(colors.text);

        visuals.selection.bg_fill = colors.selection;
        visuals.selection.stroke.color = colors.accent;
        visuals.widgets.noninteractive.bg_fill = colors.panel_background;
        visuals.widgets.inactive.bg_fill = colors.hover;
        visuals.widgets.hovered.bg_fill = colors.hover;
        visuals.widgets.active.bg_fill = colors.selection;

        visuals.hyperlink_color = colors.accent;
        visuals.error_fg_color = colors.failure;
        visuals.warn_fg_color = colors.warning;
        visuals
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn light_theme() -> Theme {
    Theme {
        name: "Light".to_string(),
        dark: false,
        colors: ThemeColors {
            panel_background: Color32::from_rgb(248, 248, 248),
            extreme_background: Color32::WHITE,
            text: Color32::from_rgb(20, 20, 20),
            text_dim: Color32::from_rgb(120, 120, 120),
            selection: Color32::from_rgb(180, 200, 255),
            hover: Color32::from_rgb(225, 225, 225),
            accent: Color32::from_rgb(40, 100, 200),
            success: Color32::from_rgb(40, 150, 60),
            failure: Color32::from_rgb(200, 40, 40),
            warning: Color32::from_rgb(210, 120, 20),
            easy: Color32::from_rgb(40, 150, 60),
            medium: Color32::from_rgb(200, 150, 0),
            hard: Color32::from_rgb(200, 40, 40),
            series: [
                Color32::from_rgb(40, 100, 200),
                Color32::from_rgb(230, 120, 20),
                Color32::from_rgb(40, 160, 40),
                Color32::from_rgb(140, 60, 180),
                Color32::from_rgb(0, 160, 180),
                Color32::from_rgb(200, 40, 160),
            ],
        },
    }
}

fn dark_theme() -> Theme {
    Theme {
        name: "Dark".to_string(),
        dark: true,
        colors: ThemeColors {
            panel_background: Color32::from_rgb(39, 39, 39),
            extreme_background: Color32::from_rgb(16, 16, 16),
            text: Color32::from_rgb(235, 235, 235),
            text_dim: Color32::from_rgb(160, 160, 160),
            selection: Color32::from_rgb(50, 80, 120),
            hover: Color32::from_rgb(70, 70, 70),
            accent: Color32::from_rgb(52, 152, 219),
            success: Color32::from_rgb(46, 204, 113),
            failure: Color32::from_rgb(231, 76, 60),
            warning: Color32::from_rgb(243, 156, 18),
            easy: Color32::from_rgb(46, 204, 113),
            medium: Color32::from_rgb(241, 196, 15),
            hard: Color32::from_rgb(231, 76, 60),
            series: [
                Color32::from_rgb(52, 152, 219),
                Color32::from_rgb(243, 156, 18),
                Color32::from_rgb(46, 204, 113),
                Color32::from_rgb(155, 89, 182),
                Color32::from_rgb(26, 188, 156),
                Color32::from_rgb(255, 121, 198),
            ],
        },
    }
}

/// Palette from draculatheme.com.
fn dracula_theme() -> Theme {
    Theme {
        name: "Dracula".to_string(),
        dark: true,
        colors: ThemeColors {
            panel_background: hex_to_color32("#282a36"),
            extreme_background: hex_to_color32("#21222c"),
            text: hex_to_color32("#f8f8f2"),
            text_dim: hex_to_color32("#6272a4"),
            selection: hex_to_color32("#44475a"),
            hover: hex_to_color32("#44475a"),
            accent: hex_to_color32("#bd93f9"),
            success: hex_to_color32("#50fa7b"),
            failure: hex_to_color32("#ff5555"),
            warning: hex_to_color32("#ffb86c"),
            easy: hex_to_color32("#50fa7b"),
            medium: hex_to_color32("#f1fa8c"),
            hard: hex_to_color32("#ff5555"),
            series: [
                hex_to_color32("#bd93f9"),
                hex_to_color32("#ffb86c"),
                hex_to_color32("#50fa7b"),
                hex_to_color32("#ff79c6"),
                hex_to_color32("#8be9fd"),
                hex_to_color32("#f1fa8c"),
            ],
        },
    }
}

/// Converts `#rrggbb` to a color; malformed input yields black.
pub fn hex_to_color32(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color32::BLACK;
    }
    let channel = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
    Color32::from_rgb(channel(0..2), channel(2..4), channel(4..6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let manager = ThemeManager::new();
        assert_eq!(manager.resolve("Solarized").name, DEFAULT_THEME);
        assert_eq!(manager.list_themes(), vec!["Dark", "Dracula", "Light"]);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_color32("#ff5555"), Color32::from_rgb(255, 85, 85));
        assert_eq!(hex_to_color32("nope"), Color32::BLACK);
    }

    #[test]
    fn series_colors_cycle() {
        let manager = ThemeManager::new();
        let colors = &manager.resolve("Light").colors;
        assert_eq!(colors.series_color(0), colors.series_color(6));
    }
}
