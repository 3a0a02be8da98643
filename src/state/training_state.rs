//! Training curve view state.

use std::collections::BTreeSet;

use rtraj::model::{CurveMetrics, EpochLevelStats, IterationLevelStats, TrainingRuns};
use rtraj::{Remote, Seq};

/// Metric plotted on the curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveMetric {
    #[default]
    PassAt1,
    PassAtK,
    AvgReward,
    SuccessRate,
}

impl CurveMetric {
    pub const ALL: [CurveMetric; 4] = [
        CurveMetric::PassAt1,
        CurveMetric::PassAtK,
        CurveMetric::AvgReward,
        CurveMetric::SuccessRate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CurveMetric::PassAt1 => "pass@1",
            CurveMetric::PassAtK => "pass@k",
            CurveMetric::AvgReward => "avg reward",
            CurveMetric::SuccessRate => "success rate",
        }
    }

    pub fn value(self, metrics: &CurveMetrics) -> f64 {
        match self {
            CurveMetric::PassAt1 => metrics.pass_at_1,
            CurveMetric::PassAtK => metrics.pass_at_k,
            CurveMetric::AvgReward => metrics.avg_reward,
            CurveMetric::SuccessRate => metrics.success_rate,
        }
    }
}

#[derive(Debug, Default)]
pub struct TrainingState {
    pub runs: Remote<TrainingRuns>,
    pub epochs: Remote<EpochLevelStats>,
    pub iterations: Remote<IterationLevelStats>,
    selected_runs: BTreeSet<String>,
    iteration_run: Option<String>,
    pub metric: CurveMetric,
}

impl TrainingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs whose epoch curves are plotted. Empty means all.
    pub fn selected_runs(&self) -> Vec<String> {
        self.selected_runs.iter().cloned().collect()
    }

    pub fn is_selected(&self, run: &str) -> bool {
        self.selected_runs.contains(run)
    }

    /// Toggles a run and starts refetching the epoch curves.
    pub fn toggle_run(&mut self, run: &str) -> (Vec<String>, Seq) {
        if !self.selected_runs.remove(run) {
            self.selected_runs.insert(run.to_string());
        }
        (self.selected_runs(), self.epochs.begin())
    }

    pub fn iteration_run(&self) -> Option<&str> {
        self.iteration_run.as_deref()
    }

    /// Picks the run whose iteration curves are shown and starts the fetch.
    pub fn select_iteration_run(&mut self, run: String) -> Seq {
        self.iteration_run = Some(run);
        self.iterations.begin()
    }

    /// Defaults the iteration run to the first known run, once runs load.
    pub fn default_iteration_run(&mut self) -> Option<(String, Seq)> {
        if self.iteration_run.is_some() {
            return None;
        }
        let first = self.runs.data()?.training_ids.first()?.clone();
        let seq = self.select_iteration_run(first.clone());
        Some((first, seq))
    }
}
