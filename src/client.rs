//! Typed REST client shared by every view.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::model::{
    EpochLevelStats, ExportFormat, GlobalStats, Health, ImportFileType, ImportHistoryEntry, ImportJob,
    IterationLevelStats, Page, ProcessRewardCorrelation, Question, RewardCategoryStats,
    TerminationStats, ToolReturnStats, TrainingRuns, Trajectory, TrajectoryDetail,
    UnexpectedToolContexts,
};
use crate::query::QueryParams;
use crate::transport::{ApiError, ApiRequest, Transport};

/// Typed endpoints over an injected [`Transport`].
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Raw JSON fetch.
    pub fn fetch_json(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.transport.execute(request)
    }

    fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.transport.execute(&request)?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("{}: {e}", request.path)))
    }

    // ===== Trajectories =====

    /// `GET /trajectories` with pre-built page, filter and sort parameters.
    pub fn list_trajectories(&self, params: QueryParams) -> Result<Page<Trajectory>, ApiError> {
        self.fetch(ApiRequest::get("/trajectories").with_params(params))
    }

    pub fn trajectory(&self, trajectory_id: &str) -> Result<TrajectoryDetail, ApiError> {
        self.fetch(ApiRequest::get(format!("/trajectories/{trajectory_id}")))
    }

    /// Flips the bookmark flag and returns the new value.
    pub fn toggle_bookmark(&self, trajectory_id: &str) -> Result<bool, ApiError> {
        #[derive(Deserialize)]
        struct Bookmark {
            is_bookmarked: bool,
        }
        let reply: Bookmark =
            self.fetch(ApiRequest::put(format!("/trajectories/{trajectory_id}/bookmark")))?;
        Ok(reply.is_bookmarked)
    }

    /// Replaces the free-text notes of a trajectory.
    pub fn update_notes(&self, trajectory_id: &str, notes: &str) -> Result<(), ApiError> {
        let request = ApiRequest::put_json("/trajectories", json!({ "notes": notes }))
            .segment(trajectory_id)
            .segment("notes");
        self.transport.execute(&request).map(|_| ())
    }

    /// Adds one tag and returns the trajectory's full tag list.
    pub fn add_tag(&self, trajectory_id: &str, tag: &str) -> Result<Vec<String>, ApiError> {
        #[derive(Deserialize)]
        struct Tags {
            tags: Vec<String>,
        }
        let request = ApiRequest::put_json("/trajectories", json!({ "tags": [tag] }))
            .segment(trajectory_id)
            .segment("tags");
        let reply: Tags = self.fetch(request)?;
        Ok(reply.tags)
    }

    pub fn remove_tag(&self, trajectory_id: &str, tag: &str) -> Result<(), ApiError> {
        let request = ApiRequest::delete("/trajectories")
            .segment(trajectory_id)
            .segment("tags")
            .segment(tag);
        self.transport.execute(&request).map(|_| ())
    }

    // ===== Export =====

    /// Downloads every trajectory in `format` as the file body to save.
    pub fn export(&self, format: ExportFormat) -> Result<String, ApiError> {
        let request = ApiRequest::get(format!("/export/{}", format.as_str())).text_response();
        match self.transport.execute(&request)? {
            Value::String(text) => Ok(text),
            other => serde_json::to_string_pretty(&other).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    // ===== Questions & stats =====

    pub fn list_questions(&self, page: u32, page_size: u32) -> Result<Page<Question>, ApiError> {
        self.fetch(
            ApiRequest::get("/questions")
                .param("page", page)
                .param("pageSize", page_size),
        )
    }

    pub fn global_stats(&self) -> Result<GlobalStats, ApiError> {
        self.fetch(ApiRequest::get("/stats").at_root())
    }

    pub fn health(&self) -> Result<Health, ApiError> {
        self.fetch(ApiRequest::get("/health").at_root())
    }

    // ===== Training curves =====

    pub fn training_runs(&self) -> Result<TrainingRuns, ApiError> {
        self.fetch(ApiRequest::get("/training-stats/training-runs"))
    }

    /// Epoch curves for the given runs; an empty slice means all runs.
    pub fn epoch_level(&self, training_ids: &[String]) -> Result<EpochLevelStats, ApiError> {
        let mut request = ApiRequest::get("/training-stats/epoch-level");
        if !training_ids.is_empty() {
            request = request.param("training_ids", training_ids.join(","));
        }
        self.fetch(request)
    }

    pub fn iteration_level(&self, training_id: &str) -> Result<IterationLevelStats, ApiError> {
        self.fetch(ApiRequest::get("/training-stats/iteration-level").param("training_id", training_id))
    }

    // ===== Analysis aggregates =====

    pub fn termination_stats(&self) -> Result<TerminationStats, ApiError> {
        self.fetch(ApiRequest::get("/analysis-stats/termination-stats"))
    }

    pub fn reward_category_stats(&self) -> Result<RewardCategoryStats, ApiError> {
        self.fetch(ApiRequest::get("/analysis-stats/reward-category-stats"))
    }

    pub fn tool_return_stats(&self) -> Result<ToolReturnStats, ApiError> {
        self.fetch(ApiRequest::get("/analysis-stats/tool-return-stats"))
    }

    pub fn process_reward_correlation(&self) -> Result<ProcessRewardCorrelation, ApiError> {
        self.fetch(ApiRequest::get("/analysis-stats/process-reward-correlation"))
    }

    pub fn unexpected_tool_contexts(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<UnexpectedToolContexts, ApiError> {
        let mut request = ApiRequest::get("/analysis-stats/unexpected-tool-contexts");
        if let Some(category) = category {
            request = request.param("category", category);
        }
        self.fetch(request.param("limit", limit))
    }

    // ===== Import =====

    pub fn import_upload(&self, file: PathBuf) -> Result<ImportJob, ApiError> {
        self.fetch(ApiRequest::upload("/import/json", "file", file))
    }

    pub fn import_from_path(&self, file_path: &str, file_type: ImportFileType) -> Result<ImportJob, ApiError> {
        self.fetch(ApiRequest::post_json(
            "/import/from-path",
            json!({ "file_path": file_path, "file_type": file_type.as_str() }),
        ))
    }

    pub fn import_status(&self, task_id: &str) -> Result<ImportJob, ApiError> {
        self.fetch(ApiRequest::get(format!("/import/status/{task_id}")))
    }

    /// Log lines of a job. Accepts `{"logs": [...]}` or a bare array.
    pub fn import_logs(&self, task_id: &str) -> Result<Vec<String>, ApiError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Logs {
            Wrapped { logs: Vec<String> },
            Bare(Vec<String>),
        }
        let logs: Logs = self.fetch(ApiRequest::get(format!("/import/logs/{task_id}")))?;
        Ok(match logs {
            Logs::Wrapped { logs } | Logs::Bare(logs) => logs,
        })
    }

    /// Server directories a path import may read from.
    /// Accepts `{"directories": [...]}` or a bare array.
    pub fn allowed_directories(&self) -> Result<Vec<String>, ApiError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Dirs {
            Wrapped { directories: Vec<String> },
            Bare(Vec<String>),
        }
        let dirs: Dirs = self.fetch(ApiRequest::get("/import/allowed-directories"))?;
        Ok(match dirs {
            Dirs::Wrapped { directories } | Dirs::Bare(directories) => directories,
        })
    }

    pub fn import_history(&self, limit: u32) -> Result<Vec<ImportHistoryEntry>, ApiError> {
        let page: Page<ImportHistoryEntry> =
            self.fetch(ApiRequest::get("/import/history").param("limit", limit))?;
        Ok(page.data)
    }

    /// Deletes all imported data; returns the server's confirmation text.
    pub fn clear_data(&self) -> Result<String, ApiError> {
        let reply = self.transport.execute(&ApiRequest::post_json("/import/clear-data", json!({})))?;
        Ok(reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("All data cleared")
            .to_string())
    }
}
