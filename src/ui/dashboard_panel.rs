//! Overview cards and the difficulty distribution.

use eframe::egui;
use egui::RichText;
use egui_plot::{Bar, BarChart, Legend, Plot};
use rtraj::{Difficulty, ThemeColors};

use crate::app::AppState;
use crate::presentation::color_mapping;
use crate::ui::remote_status;
use crate::utils::{format_count, format_percent};

pub fn render_dashboard_panel(ui: &mut egui::Ui, state: &AppState) {
    let colors = state.theme.colors();
    ui.heading("Overview");
    ui.separator();

    let Some(stats) = remote_status(ui, &state.dashboard.stats, "statistics") else {
        return;
    };

    ui.horizontal_wrapped(|ui| {
        stat_card(ui, "Questions", &format_count(stats.total_questions), colors);
        stat_card(ui, "Trajectories", &format_count(stats.total_trajectories), colors);
        stat_card(ui, "pass@1", &format_percent(stats.pass_at_1), colors);
        stat_card(ui, "pass@k", &format_percent(stats.pass_at_k), colors);
    });

    ui.add_space(12.0);
    ui.label(RichText::new("Question difficulty").strong());

    let buckets = [
        (Difficulty::Easy, stats.simple_ratio),
        (Difficulty::Medium, stats.medium_ratio),
        (Difficulty::Hard, stats.hard_ratio),
    ];
    Plot::new("difficulty_plot")
        .height(260.0)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_y(0.0)
        .include_y(100.0)
        .show(ui, |plot_ui| {
            for (i, (difficulty, ratio)) in buckets.into_iter().enumerate() {
                let bar = Bar::new(i as f64, ratio * 100.0)
                    .width(0.6)
                    .name(format!("{} {}", difficulty.label(), format_percent(ratio)));
                plot_ui.bar_chart(
                    BarChart::new(difficulty.label(), vec![bar])
                        .color(color_mapping::difficulty_color(difficulty, colors)),
                );
            }
        });
}

fn stat_card(ui: &mut egui::Ui, title: &str, value: &str, colors: &ThemeColors) {
    egui::Frame::group(ui.style())
        .fill(colors.extreme_background)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_min_width(140.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(title).color(colors.text_dim));
                ui.label(RichText::new(value).size(24.0).strong().color(colors.accent));
            });
        });
}
