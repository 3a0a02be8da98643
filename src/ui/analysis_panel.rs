//! Analysis aggregates: termination reasons, reward categories, tool-call
//! returns, process/outcome reward correlation and unexpected tool returns.

use eframe::egui;
use egui::RichText;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};
use rtraj::model::Categories;
use rtraj::ThemeColors;

use crate::app::AppState;
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::remote_status;
use crate::utils::{format_count, format_percent, format_reward, preview};

const CHART_HEIGHT: f32 = 200.0;
const MAX_CONTEXT_LIMIT: u32 = 200;

pub fn render_analysis_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors().clone();

    ui.heading("Analysis");
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("analysis_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let analysis = &state.analysis;

            section(ui, "Termination reasons");
            if let Some(stats) = remote_status(ui, &analysis.termination, "termination stats") {
                ui.label(format!(
                    "{} trajectories · unexpected {} ({})",
                    format_count(stats.total),
                    format_count(stats.unexpected.count),
                    format_percent(stats.unexpected.ratio)
                ));
                category_chart(ui, "termination_plot", &stats.categories, &colors);
            }

            section(ui, "Reward categories");
            if let Some(stats) = remote_status(ui, &analysis.rewards, "reward stats") {
                ui.label(format!(
                    "{} trajectories · min {} · avg {} · max {}",
                    format_count(stats.total),
                    format_reward(stats.min_reward),
                    format_reward(stats.avg_reward),
                    format_reward(stats.max_reward)
                ));
                category_chart(ui, "reward_plot", &stats.categories, &colors);
            }

            section(ui, "Tool-call returns");
            if let Some(stats) = remote_status(ui, &analysis.tool_returns, "tool return stats") {
                ui.label(format!(
                    "{} tool calls · unexpected {} ({})",
                    format_count(stats.total_tool_calls),
                    format_count(stats.unexpected.count),
                    format_percent(stats.unexpected.ratio)
                ));
                category_chart(ui, "tool_return_plot", &stats.categories, &colors);
            }

            section(ui, "Process vs outcome reward");
            if let Some(corr) = remote_status(ui, &analysis.correlation, "correlation") {
                ui.label(format!(
                    "Kendall τ = {:.3} · p = {:.4} · n = {}",
                    corr.kendall_tau,
                    corr.p_value,
                    format_count(corr.sample_size)
                ));
                if !corr.interpretation.is_empty() {
                    ui.label(&corr.interpretation);
                }
                if !corr.suggested_strategy.is_empty() {
                    ui.label(RichText::new(&corr.suggested_strategy).italics().color(colors.text_dim));
                }
                let points: Vec<[f64; 2]> = corr
                    .scatter_data
                    .x
                    .iter()
                    .zip(&corr.scatter_data.y)
                    .map(|(x, y)| [*x, *y])
                    .collect();
                Plot::new("correlation_plot")
                    .height(CHART_HEIGHT)
                    .x_axis_label("process reward")
                    .y_axis_label("outcome reward")
                    .show(ui, |plot_ui| {
                        plot_ui.points(
                            Points::new("trajectories", PlotPoints::from(points))
                                .radius(2.5)
                                .color(colors.accent),
                        );
                    });
            }

            section(ui, "Unexpected tool returns");
            if let Some(action) = render_contexts(ui, state, &colors) {
                interaction = Some(action);
            }
        });

    interaction
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(10.0);
    ui.label(RichText::new(title).strong().size(15.0));
}

/// One bar per category, each its own series so the legend names it.
fn category_chart(ui: &mut egui::Ui, id: &str, categories: &Categories, colors: &ThemeColors) {
    if categories.is_empty() {
        ui.label(RichText::new("(no data)").color(colors.text_dim));
        return;
    }
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (i, (name, count)) in categories.iter().enumerate() {
                let bar = Bar::new(i as f64, count.count as f64)
                    .width(0.7)
                    .name(format!("{name}: {} ({})", count.count, format_percent(count.ratio)));
                plot_ui.bar_chart(BarChart::new(name.clone(), vec![bar]).color(colors.series_color(i)));
            }
        });
}

fn render_contexts(ui: &mut egui::Ui, state: &mut AppState, colors: &ThemeColors) -> Option<PanelInteraction> {
    let mut interaction = None;
    let categories: Vec<String> = state
        .analysis
        .tool_returns
        .data()
        .map(|stats| stats.categories.keys().cloned().collect())
        .unwrap_or_default();

    ui.horizontal(|ui| {
        let analysis = &mut state.analysis;
        let selected = analysis.context_category.clone().unwrap_or_else(|| "All".to_string());
        egui::ComboBox::from_id_salt("context_category")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut analysis.context_category, None, "All");
                for category in &categories {
                    ui.selectable_value(&mut analysis.context_category, Some(category.clone()), category);
                }
            });
        ui.label("Limit:");
        ui.add(egui::DragValue::new(&mut analysis.context_limit).range(1..=MAX_CONTEXT_LIMIT));
        if ui.button("Load").clicked() {
            interaction = Some(PanelInteraction::LoadToolContexts);
        }
    });

    let Some(contexts) = remote_status(ui, &state.analysis.contexts, "tool contexts") else {
        return interaction;
    };
    ui.label(format!("Showing {} of {}", contexts.data.len(), format_count(contexts.total)));

    egui::Grid::new("contexts_grid")
        .num_columns(6)
        .striped(true)
        .spacing([10.0, 4.0])
        .show(ui, |ui| {
            for title in ["Trajectory", "Step", "Category", "Action", "Observation", "Question"] {
                ui.label(RichText::new(title).strong());
            }
            ui.end_row();

            for ctx in &contexts.data {
                if ui.link(&ctx.trajectory_id).clicked() {
                    interaction = Some(PanelInteraction::OpenTrajectory(ctx.trajectory_id.clone()));
                }
                ui.label(ctx.step_id.to_string());
                ui.colored_label(colors.warning, &ctx.category);
                ui.label(preview(&ctx.action, 40)).on_hover_text(&ctx.action);
                ui.label(preview(&ctx.observation, 60)).on_hover_text(&ctx.observation);
                ui.label(preview(&ctx.context.question, 50)).on_hover_text(&ctx.context.question);
                ui.end_row();
            }
        });

    interaction
}
