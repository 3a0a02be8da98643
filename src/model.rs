//! Backend data model.
//!
//! Every type here mirrors a JSON payload returned by the trajectory REST
//! backend. The records are read-only on the client: the dashboard holds the
//! last fetched page per query and never edits them locally. Fields the
//! backend may omit default to empty values so a partially populated row
//! still renders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of a paginated listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<u32>,
}

impl<T> Page<T> {
    /// An empty page, used when a fetch fails.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: None,
            page_size: None,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Task payload attached to a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub ground_truth: String,
}

/// One recorded episode as it appears in the trajectory list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub trajectory_id: String,
    #[serde(default)]
    pub data_id: String,
    #[serde(default)]
    pub training_id: String,
    #[serde(default)]
    pub epoch_id: i64,
    #[serde(default)]
    pub iteration_id: i64,
    #[serde(default)]
    pub sample_id: i64,
    #[serde(default)]
    pub task: Task,
    #[serde(default, rename = "isSuccess")]
    pub is_success: bool,
    #[serde(default)]
    pub termination_reason: String,
    #[serde(default)]
    pub step_count: u32,
    #[serde(default)]
    pub exec_time: f64,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub reward: f64,
    #[serde(default)]
    pub toolcall_reward: f64,
    #[serde(default)]
    pub res_reward: f64,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "rootCause")]
    pub root_cause: String,
}

impl Trajectory {
    /// Question text of the task this trajectory attempted.
    pub fn question(&self) -> &str {
        &self.task.question
    }
}

/// One agent step inside a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub step_id: i64,
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub model_response: String,
    #[serde(default)]
    pub reward: f64,
    #[serde(default)]
    pub done: bool,
}

/// One message of the recorded chat history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl ChatMessage {
    /// Renders the message content as plain text.
    ///
    /// Content is either a string or a structured value (multi-part
    /// messages, tool calls); structured content is shown as JSON.
    pub fn content_text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Full trajectory detail including step and chat history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryDetail {
    #[serde(flatten)]
    pub summary: Trajectory,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub chat_completions: Vec<ChatMessage>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// Difficulty bucket the backend assigns from a question's success rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Per-question aggregate returned by `GET /questions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default, rename = "successCount")]
    pub success_count: u64,
    #[serde(default, rename = "totalCount")]
    pub total_count: u64,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Global aggregate metrics returned by `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    #[serde(default)]
    pub total_questions: u64,
    #[serde(default)]
    pub total_trajectories: u64,
    #[serde(default, rename = "passAt1")]
    pub pass_at_1: f64,
    #[serde(default, rename = "passAtK")]
    pub pass_at_k: f64,
    #[serde(default)]
    pub simple_ratio: f64,
    #[serde(default)]
    pub medium_ratio: f64,
    #[serde(default)]
    pub hard_ratio: f64,
}

/// `GET /health` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub status: String,
}

// ===== Training curves =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingRuns {
    #[serde(default)]
    pub training_ids: Vec<String>,
}

/// Metrics of one point on a training curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveMetrics {
    #[serde(default)]
    pub pass_at_1: f64,
    #[serde(default)]
    pub pass_at_k: f64,
    #[serde(default)]
    pub avg_reward: f64,
    #[serde(default)]
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochPoint {
    pub epoch: i64,
    #[serde(flatten)]
    pub metrics: CurveMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingEpochs {
    pub training_id: String,
    #[serde(default)]
    pub epochs: Vec<EpochPoint>,
}

/// `GET /training-stats/epoch-level` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochLevelStats {
    #[serde(default)]
    pub trainings: Vec<TrainingEpochs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationPoint {
    pub iteration: i64,
    #[serde(flatten)]
    pub metrics: CurveMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochIterations {
    pub epoch_id: i64,
    #[serde(default)]
    pub iterations: Vec<IterationPoint>,
}

/// `GET /training-stats/iteration-level` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationLevelStats {
    #[serde(default)]
    pub training_id: String,
    #[serde(default)]
    pub epochs: Vec<EpochIterations>,
}

// ===== Analysis aggregates =====

/// Count and share of one category in an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub ratio: f64,
}

/// Categories keyed by name; ordered so charts are stable between frames.
pub type Categories = BTreeMap<String, CategoryCount>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminationStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub unexpected: CategoryCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardCategoryStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub max_reward: f64,
    #[serde(default)]
    pub min_reward: f64,
    #[serde(default)]
    pub avg_reward: f64,
    #[serde(default)]
    pub categories: Categories,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolReturnStats {
    #[serde(default)]
    pub total_tool_calls: u64,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub unexpected: CategoryCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterData {
    #[serde(default)]
    pub x: Vec<f64>,
    #[serde(default)]
    pub y: Vec<f64>,
    #[serde(default)]
    pub trajectory_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRewardCorrelation {
    #[serde(default)]
    pub kendall_tau: f64,
    #[serde(default = "default_p_value")]
    pub p_value: f64,
    #[serde(default)]
    pub sample_size: u64,
    #[serde(default)]
    pub interpretation: String,
    #[serde(default)]
    pub suggested_strategy: String,
    #[serde(default)]
    pub scatter_data: ScatterData,
}

fn default_p_value() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolContext {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub step_number: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedToolContext {
    #[serde(default)]
    pub trajectory_id: String,
    #[serde(default)]
    pub step_id: i64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub context: ToolContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedToolContexts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub data: Vec<UnexpectedToolContext>,
}

// ===== Import =====

/// Server-side status of an import job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Pending,
    #[default]
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ImportStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportStatus::Completed | ImportStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Processing => "processing",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
            ImportStatus::Unknown => "unknown",
        }
    }
}

/// An import job as reported by submit and status endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub task_id: String,
    #[serde(default)]
    pub status: ImportStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub imported_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// One entry of `GET /import/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportHistoryEntry {
    pub task_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub imported_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub completed_at: Option<f64>,
}

/// Kind of file submitted through a server-local path import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFileType {
    #[default]
    Json,
    Jsonl,
}

impl ImportFileType {
    pub const ALL: [ImportFileType; 2] = [ImportFileType::Json, ImportFileType::Jsonl];

    pub fn as_str(self) -> &'static str {
        match self {
            ImportFileType::Json => "json",
            ImportFileType::Jsonl => "jsonl",
        }
    }

    /// Guesses the file type from a path's extension.
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".jsonl") {
            ImportFileType::Jsonl
        } else {
            ImportFileType::Json
        }
    }
}

/// Full-database download formats offered by `GET /export/{format}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }

    /// File name suggested in the save dialog.
    pub fn default_file_name(self) -> String {
        format!("trajectories.{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trajectory_row_tolerates_missing_fields() {
        let row: Trajectory = serde_json::from_value(json!({
            "trajectory_id": "t1",
            "data_id": "q1",
            "task": {"question": "2+2?"},
            "isSuccess": true,
            "reward": 1.5
        }))
        .unwrap();
        assert_eq!(row.trajectory_id, "t1");
        assert_eq!(row.question(), "2+2?");
        assert!(row.is_success);
        assert_eq!(row.step_count, 0);
        assert!(row.agent_name.is_empty());
    }

    #[test]
    fn detail_flattens_summary_fields() {
        let detail: TrajectoryDetail = serde_json::from_value(json!({
            "trajectory_id": "t9",
            "reward": 0.25,
            "steps": [{"step_id": 1, "action": "search", "observation": "ok"}],
            "chat_completions": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();
        assert_eq!(detail.summary.trajectory_id, "t9");
        assert_eq!(detail.steps.len(), 1);
        assert_eq!(detail.steps[0].action.as_deref(), Some("search"));
        assert_eq!(detail.chat_completions[0].content_text(), "hi");
    }

    #[test]
    fn unknown_import_status_is_not_terminal() {
        let job: ImportJob =
            serde_json::from_value(json!({"task_id": "x", "status": "queued"})).unwrap();
        assert_eq!(job.status, ImportStatus::Unknown);
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn epoch_points_flatten_metrics() {
        let stats: EpochLevelStats = serde_json::from_value(json!({
            "trainings": [{
                "training_id": "train_7",
                "epochs": [{"epoch": 3, "pass_at_1": 0.5, "pass_at_k": 0.75, "avg_reward": 1.0, "success_rate": 0.5}]
            }]
        }))
        .unwrap();
        let point = &stats.trainings[0].epochs[0];
        assert_eq!(point.epoch, 3);
        assert_eq!(point.metrics.pass_at_k, 0.75);
    }

    #[test]
    fn file_type_is_guessed_from_extension() {
        assert_eq!(ImportFileType::from_path("/data/run.JSONL"), ImportFileType::Jsonl);
        assert_eq!(ImportFileType::from_path("/data/run.json"), ImportFileType::Json);
    }
}
