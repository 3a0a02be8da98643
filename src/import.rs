//! Import job state machine.
//!
//! ```text
//! idle ──submit──▶ submitting ──ok──▶ processing ──status──▶ completed | failed
//!                      │                  ▲    │
//!                      └──err──▶ failed   └────┘ poll error / non-terminal status
//! ```
//!
//! The tracker decides; the caller acts. Each transition returns an
//! [`ImportAction`] telling the caller whether to start or stop polling and
//! whether to fetch the final logs.

use crate::model::{ImportJob, ImportStatus};
use crate::transport::ApiError;

/// Where the import currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Submitting,
    Processing { task_id: String },
    Completed { task_id: String },
    Failed { task_id: Option<String>, message: String },
}

impl ImportPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportPhase::Completed { .. } | ImportPhase::Failed { .. })
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            ImportPhase::Processing { task_id } | ImportPhase::Completed { task_id } => {
                Some(task_id.as_str())
            }
            ImportPhase::Failed { task_id, .. } => task_id.as_deref(),
            ImportPhase::Idle | ImportPhase::Submitting => None,
        }
    }
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAction {
    Nothing,
    /// Start the status poll timer for this job.
    StartPolling(String),
    /// Keep the poll timer running.
    ContinuePolling,
    /// Stop polling and fetch the job's logs once.
    FinishAndFetchLogs(String),
}

#[derive(Debug, Clone)]
pub struct ImportTracker {
    phase: ImportPhase,
    job: Option<ImportJob>,
    logs: Vec<String>,
    poll_failures: u32,
}

impl Default for ImportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportTracker {
    pub fn new() -> Self {
        Self {
            phase: ImportPhase::Idle,
            job: None,
            logs: Vec::new(),
            poll_failures: 0,
        }
    }

    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    /// Latest job snapshot reported by the server.
    pub fn job(&self) -> Option<&ImportJob> {
        self.job.as_ref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Poll requests that failed during this job.
    pub fn poll_failures(&self) -> u32 {
        self.poll_failures
    }

    /// Progress in `0.0..=1.0` for the progress bar.
    pub fn progress(&self) -> f32 {
        match (&self.phase, &self.job) {
            (ImportPhase::Completed { .. }, _) => 1.0,
            (_, Some(job)) => f32::from(job.progress.min(100)) / 100.0,
            _ => 0.0,
        }
    }

    /// Whether a new submission may start.
    pub fn can_submit(&self) -> bool {
        !matches!(self.phase, ImportPhase::Submitting | ImportPhase::Processing { .. })
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.phase, ImportPhase::Processing { .. })
    }

    /// Enters `submitting`. Returns false while another job is running.
    pub fn begin_submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.phase = ImportPhase::Submitting;
        self.job = None;
        self.logs.clear();
        self.poll_failures = 0;
        true
    }

    /// Handles the submit response.
    ///
    /// A rejected submission fails immediately and never polls. A job that is
    /// already terminal skips polling and goes straight to the logs.
    pub fn on_submitted(&mut self, outcome: Result<ImportJob, ApiError>) -> ImportAction {
        if self.phase != ImportPhase::Submitting {
            return ImportAction::Nothing;
        }
        match outcome {
            Ok(job) => {
                tracing::info!(task_id = %job.task_id, status = job.status.label(), "import submitted");
                self.apply_job(job)
            }
            Err(err) => {
                tracing::warn!(error = %err, "import submission failed");
                self.phase = ImportPhase::Failed {
                    task_id: None,
                    message: err.user_message(),
                };
                ImportAction::Nothing
            }
        }
    }

    /// Handles one status poll result for the current job.
    pub fn on_status(&mut self, job: ImportJob) -> ImportAction {
        let current = matches!(&self.phase, ImportPhase::Processing { task_id } if *task_id == job.task_id);
        if current {
            self.apply_job(job)
        } else {
            ImportAction::Nothing
        }
    }

    /// A poll request failed: log it and keep polling.
    pub fn on_poll_error(&mut self, err: &ApiError) -> ImportAction {
        if !self.is_polling() {
            return ImportAction::Nothing;
        }
        self.poll_failures += 1;
        tracing::warn!(error = %err, failures = self.poll_failures, "import status poll failed; retrying");
        ImportAction::ContinuePolling
    }

    /// Status polling could not be started for the current job. The job is
    /// marked failed locally so a new submission is possible without a reset.
    pub fn on_poll_unavailable(&mut self, reason: &str) -> ImportAction {
        let ImportPhase::Processing { task_id } = &self.phase else {
            return ImportAction::Nothing;
        };
        tracing::warn!(%task_id, reason, "import progress cannot be tracked");
        self.phase = ImportPhase::Failed {
            task_id: Some(task_id.clone()),
            message: format!("Could not track import progress: {reason}"),
        };
        ImportAction::Nothing
    }

    /// Stores the final log lines. A failed logs fetch leaves them empty.
    pub fn on_logs(&mut self, task_id: &str, outcome: Result<Vec<String>, ApiError>) {
        if self.phase.task_id() != Some(task_id) {
            return;
        }
        match outcome {
            Ok(lines) => self.logs = lines,
            Err(err) => tracing::warn!(error = %err, task_id, "failed to fetch import logs"),
        }
    }

    /// Returns to idle, forgetting the job.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn apply_job(&mut self, job: ImportJob) -> ImportAction {
        let task_id = job.task_id.clone();
        let was_polling = self.is_polling();
        let status = job.status;
        let message = job.errors.first().cloned();
        self.job = Some(job);

        match status {
            ImportStatus::Completed => {
                tracing::info!(%task_id, "import completed");
                self.phase = ImportPhase::Completed {
                    task_id: task_id.clone(),
                };
                ImportAction::FinishAndFetchLogs(task_id)
            }
            ImportStatus::Failed => {
                tracing::info!(%task_id, "import failed");
                self.phase = ImportPhase::Failed {
                    task_id: Some(task_id.clone()),
                    message: message.unwrap_or_else(|| "Import failed".to_string()),
                };
                ImportAction::FinishAndFetchLogs(task_id)
            }
            ImportStatus::Pending | ImportStatus::Processing | ImportStatus::Unknown => {
                self.phase = ImportPhase::Processing {
                    task_id: task_id.clone(),
                };
                if was_polling {
                    ImportAction::ContinuePolling
                } else {
                    ImportAction::StartPolling(task_id)
                }
            }
        }
    }
}
