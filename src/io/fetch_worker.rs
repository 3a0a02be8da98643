//! Background REST fetches.
//!
//! Each request runs on a short-lived thread so the frame loop never blocks
//! on the network. Results come back over a channel that the update loop
//! drains once per frame; the worker requests a repaint when one arrives.

use eframe::egui;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use rtraj::model::{
    EpochLevelStats, Health, ImportHistoryEntry, IterationLevelStats, ProcessRewardCorrelation,
    RewardCategoryStats, TerminationStats, ToolReturnStats, TrainingRuns, UnexpectedToolContexts,
};
use crate::state::DetailEdit;
use rtraj::{
    ApiClient, ApiError, GlobalStats, ImportJob, Page, Question, Seq, Trajectory,
    TrajectoryDetail,
};

type Outcome<T> = Result<T, ApiError>;

/// A finished request, tagged with what the caller needs to commit it.
#[derive(Debug)]
pub enum FetchOutcome {
    TrajectoryPage { seq: Seq, result: Outcome<Page<Trajectory>> },
    Detail { seq: Seq, result: Outcome<TrajectoryDetail> },
    Bookmark { trajectory_id: String, result: Outcome<bool> },
    /// Added tags come back as the full tag list.
    DetailEdited { trajectory_id: String, edit: DetailEdit, result: Outcome<Option<Vec<String>>> },
    /// Bytes written to `path`.
    Exported { path: PathBuf, result: Outcome<usize> },
    Questions { seq: Seq, result: Outcome<Page<Question>> },
    Stats { seq: Seq, result: Outcome<GlobalStats> },
    Health { seq: Seq, result: Outcome<Health> },
    TrainingRuns { seq: Seq, result: Outcome<TrainingRuns> },
    EpochLevel { seq: Seq, result: Outcome<EpochLevelStats> },
    IterationLevel { seq: Seq, result: Outcome<IterationLevelStats> },
    Termination { seq: Seq, result: Outcome<TerminationStats> },
    RewardCategories { seq: Seq, result: Outcome<RewardCategoryStats> },
    ToolReturns { seq: Seq, result: Outcome<ToolReturnStats> },
    Correlation { seq: Seq, result: Outcome<ProcessRewardCorrelation> },
    ToolContexts { seq: Seq, result: Outcome<UnexpectedToolContexts> },
    ImportSubmitted { result: Outcome<ImportJob> },
    ImportLogs { task_id: String, result: Outcome<Vec<String>> },
    AllowedDirectories { seq: Seq, result: Outcome<Vec<String>> },
    ImportHistory { seq: Seq, result: Outcome<Vec<ImportHistoryEntry>> },
    DataCleared { result: Outcome<String> },
}

pub struct FetchWorker {
    client: ApiClient,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
    in_flight: Arc<AtomicUsize>,
}

impl FetchWorker {
    pub fn new(client: ApiClient) -> Self {
        let (sender, receiver) = channel();
        Self {
            client,
            sender,
            receiver,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Requests still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs `job` on a background thread.
    ///
    /// `label` names the thread and tags log lines.
    pub fn spawn<F>(&self, ctx: &egui::Context, label: &'static str, job: F)
    where
        F: FnOnce(&ApiClient) -> FetchOutcome + Send + 'static,
    {
        let client = self.client.clone();
        let sender = self.sender.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let ctx_handle = ctx.clone();

        in_flight.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(request = label, "fetch started");

        let spawned = thread::Builder::new()
            .name(format!("fetch-{label}"))
            .spawn(move || {
                let outcome = job(&client);
                in_flight.fetch_sub(1, Ordering::AcqRel);
                // The receiver only disappears when the app is shutting down.
                let _ = sender.send(outcome);
                ctx_handle.request_repaint();
            });

        if let Err(err) = spawned {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            tracing::error!(request = label, error = %err, "failed to spawn fetch thread");
        }
    }

    /// Drains every finished request. Call once per frame.
    pub fn check_completion(&self) -> Vec<FetchOutcome> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtraj::{ApiRequest, Transport};
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    struct Fixed(Value);

    impl Transport for Fixed {
        fn execute(&self, _request: &ApiRequest) -> Result<Value, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn wait_for(worker: &FetchWorker, count: usize) -> Vec<FetchOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.len() < count && Instant::now() < deadline {
            outcomes.extend(worker.check_completion());
            thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    #[test]
    fn idle_worker_has_nothing() {
        let worker = FetchWorker::new(ApiClient::new(Arc::new(Fixed(Value::Null))));
        assert_eq!(worker.in_flight(), 0);
        assert!(worker.check_completion().is_empty());
    }

    #[test]
    fn results_arrive_over_the_channel() {
        let transport = Fixed(json!({"data": [{"trajectory_id": "t1"}], "total": 1}));
        let worker = FetchWorker::new(ApiClient::new(Arc::new(transport)));
        let ctx = egui::Context::default();

        worker.spawn(&ctx, "trajectories", |client| FetchOutcome::TrajectoryPage {
            seq: 7,
            result: client.list_trajectories(Vec::new()),
        });

        let outcomes = wait_for(&worker, 1);
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            FetchOutcome::TrajectoryPage { seq, result: Ok(page) } => {
                assert_eq!(*seq, 7);
                assert_eq!(page.total, 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(worker.in_flight(), 0);
    }
}
