//! Import status polling.
//!
//! One dedicated thread per job asks for the status every `interval` and
//! reports each answer over a channel. The thread stops on its own after a
//! terminal status, and immediately when the handle is cancelled or dropped.

use eframe::egui;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::{io, thread};
use std::time::{Duration, Instant};

use rtraj::{ApiClient, ApiError, ImportJob};

/// Granularity at which a sleeping poller notices cancellation.
const CANCEL_CHECK: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum PollEvent {
    Status(ImportJob),
    Failed(ApiError),
}

pub struct ImportPoller {
    task_id: String,
    cancel: Arc<AtomicBool>,
    receiver: Receiver<PollEvent>,
}

impl ImportPoller {
    /// Spawns the poll thread. Fails only when the OS refuses a new thread.
    pub fn start(client: ApiClient, task_id: String, interval: Duration, ctx: &egui::Context) -> io::Result<Self> {
        let (sender, receiver) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);
        let ctx_handle = ctx.clone();
        let job_id = task_id.clone();

        thread::Builder::new()
            .name(format!("import-poll-{task_id}"))
            .spawn(move || {
                while sleep_unless_cancelled(interval, &cancel_flag) {
                    let event = match client.import_status(&job_id) {
                        Ok(job) => PollEvent::Status(job),
                        Err(err) => PollEvent::Failed(err),
                    };
                    let terminal = matches!(&event, PollEvent::Status(job) if job.status.is_terminal());
                    if sender.send(event).is_err() {
                        break;
                    }
                    ctx_handle.request_repaint();
                    if terminal {
                        break;
                    }
                }
                tracing::debug!(task_id = %job_id, "import polling stopped");
            })?;

        tracing::info!(task_id = %task_id, interval_ms = interval.as_millis() as u64, "import polling started");
        Ok(Self {
            task_id,
            cancel,
            receiver,
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Events received since the last call.
    pub fn drain(&self) -> Vec<PollEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for ImportPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sleeps for `interval`. Returns false as soon as `cancel` is set.
fn sleep_unless_cancelled(interval: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if cancel.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(CANCEL_CHECK));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtraj::{ApiRequest, ImportStatus, Transport};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replies with queued bodies, then repeats the last one. `None` stands
    /// for a dropped connection.
    struct Scripted(Mutex<Vec<Option<Value>>>);

    impl Transport for Scripted {
        fn execute(&self, _request: &ApiRequest) -> Result<Value, ApiError> {
            let mut queue = self.0.lock().unwrap();
            let next = if queue.len() > 1 { queue.remove(0) } else { queue[0].clone() };
            next.ok_or_else(|| ApiError::Transport("connection reset".into()))
        }
    }

    fn collect(poller: &ImportPoller, until: impl Fn(&[PollEvent]) -> bool) -> Vec<PollEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while !until(events.as_slice()) && Instant::now() < deadline {
            events.extend(poller.drain());
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    #[test]
    fn polls_through_errors_until_terminal() {
        let transport = Scripted(Mutex::new(vec![
            Some(json!({"task_id": "imp", "status": "processing", "progress": 10})),
            None,
            Some(json!({"task_id": "imp", "status": "completed", "progress": 100})),
        ]));
        let client = ApiClient::new(Arc::new(transport));
        let ctx = egui::Context::default();
        let poller = ImportPoller::start(client, "imp".into(), Duration::from_millis(10), &ctx).unwrap();

        let events = collect(&poller, |events| events.len() >= 3);
        assert!(matches!(&events[0], PollEvent::Status(job) if job.status == ImportStatus::Processing));
        assert!(matches!(&events[1], PollEvent::Failed(_)));
        assert!(matches!(&events[2], PollEvent::Status(job) if job.status == ImportStatus::Completed));

        thread::sleep(Duration::from_millis(50));
        assert!(poller.drain().is_empty(), "poller must stop after a terminal status");
    }

    #[test]
    fn cancelled_poller_sends_nothing() {
        let transport = Scripted(Mutex::new(vec![Some(json!({"task_id": "imp", "status": "processing"}))]));
        let client = ApiClient::new(Arc::new(transport));
        let ctx = egui::Context::default();
        let poller = ImportPoller::start(client, "imp".into(), Duration::from_millis(200), &ctx).unwrap();
        poller.cancel();
        thread::sleep(Duration::from_millis(300));
        assert!(poller.drain().is_empty());
    }
}
