//! Training curves: metric per epoch across runs, and per iteration within
//! one run.

use eframe::egui;
use egui::RichText;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::app::AppState;
use crate::state::CurveMetric;
use crate::ui::panel_manager::PanelInteraction;
use crate::ui::remote_status;
use crate::utils::format_percent;

pub fn render_training_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;
    let colors = state.theme.colors().clone();

    ui.heading("Training curves");
    ui.separator();

    let Some(runs) = remote_status(ui, &state.training.runs, "training runs") else {
        return None;
    };
    if runs.training_ids.is_empty() {
        ui.label(RichText::new("No training runs found.").color(colors.text_dim));
        return None;
    }
    let run_ids = runs.training_ids.clone();

    ui.horizontal_wrapped(|ui| {
        ui.label("Runs:");
        for run in &run_ids {
            let mut checked = state.training.is_selected(run);
            if ui.checkbox(&mut checked, run).changed() {
                interaction = Some(PanelInteraction::ToggleTrainingRun(run.clone()));
            }
        }
        ui.separator();
        ui.label("Metric:");
        egui::ComboBox::from_id_salt("curve_metric")
            .selected_text(state.training.metric.label())
            .show_ui(ui, |ui| {
                for metric in CurveMetric::ALL {
                    ui.selectable_value(&mut state.training.metric, metric, metric.label());
                }
            });
    });
    if state.training.selected_runs().is_empty() {
        ui.label(RichText::new("No run selected: showing all runs.").small().color(colors.text_dim));
    }

    let metric = state.training.metric;
    ui.add_space(6.0);
    ui.label(RichText::new(format!("{} by epoch", metric.label())).strong());

    if let Some(epochs) = remote_status(ui, &state.training.epochs, "epoch curves") {
        Plot::new("epoch_plot")
            .height(240.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, training) in epochs.trainings.iter().enumerate() {
                    let points: Vec<[f64; 2]> = training
                        .epochs
                        .iter()
                        .map(|p| [p.epoch as f64, metric.value(&p.metrics)])
                        .collect();
                    let color = colors.series_color(i);
                    plot_ui.line(Line::new(training.training_id.clone(), PlotPoints::from(points.clone())).color(color));
                    plot_ui.points(Points::new(training.training_id.clone(), PlotPoints::from(points)).radius(3.0).color(color));
                }
            });

        egui::CollapsingHeader::new("Epochs").show(ui, |ui| {
            egui::Grid::new("epoch_grid").striped(true).num_columns(4).show(ui, |ui| {
                for training in &epochs.trainings {
                    for point in &training.epochs {
                        ui.label(&training.training_id);
                        ui.label(format!("epoch {}", point.epoch));
                        ui.label(format!("{} {}", metric.label(), format_metric(metric, metric.value(&point.metrics))));
                        if ui.small_button("Show trajectories").clicked() {
                            interaction = Some(PanelInteraction::ShowEpoch {
                                training_id: training.training_id.clone(),
                                epoch_id: point.epoch,
                            });
                        }
                        ui.end_row();
                    }
                }
            });
        });
    }

    ui.add_space(6.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{} by iteration", metric.label())).strong());
        let current = state.training.iteration_run().unwrap_or("select a run").to_string();
        egui::ComboBox::from_id_salt("iteration_run")
            .selected_text(&current)
            .show_ui(ui, |ui| {
                for run in &run_ids {
                    if ui.selectable_label(*run == current, run).clicked() && *run != current {
                        interaction = Some(PanelInteraction::SelectIterationRun(run.clone()));
                    }
                }
            });
    });

    if state.training.iteration_run().is_some() {
        if let Some(iterations) = remote_status(ui, &state.training.iterations, "iteration curves") {
            Plot::new("iteration_plot")
                .height(240.0)
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for (i, epoch) in iterations.epochs.iter().enumerate() {
                        let points: Vec<[f64; 2]> = epoch
                            .iterations
                            .iter()
                            .map(|p| [p.iteration as f64, metric.value(&p.metrics)])
                            .collect();
                        plot_ui.line(
                            Line::new(format!("epoch {}", epoch.epoch_id), PlotPoints::from(points))
                                .color(colors.series_color(i)),
                        );
                    }
                });
        }
    }

    interaction
}

/// Rates read as percentages; rewards as plain numbers.
fn format_metric(metric: CurveMetric, value: f64) -> String {
    match metric {
        CurveMetric::AvgReward => format!("{value:.3}"),
        _ => format_percent(value),
    }
}
