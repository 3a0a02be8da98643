use anyhow::Result;
use rtraj::{
    ApiClient, ApiError, ApiRequest, FetchRequest, FilterField, FilterValue, HttpTransport, ImportAction,
    ImportPhase, ImportTracker, JumpFilter, NumericFilter, QueryParams, SortField, TrajectoryListController,
    Transport,
};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// In-memory backend: records every request and answers by path.
struct FakeBackend {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<Vec<(String, Value)>>,
}

impl FakeBackend {
    fn new(replies: &[(&str, Value)]) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.iter().map(|(p, v)| (p.to_string(), v.clone())).collect()),
        })
    }

    fn paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.path.clone()).collect()
    }
}

impl Transport for FakeBackend {
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        // The first reply for a path is consumed unless it is the last one.
        let pos = replies
            .iter()
            .position(|(path, _)| *path == request.path)
            .ok_or_else(|| ApiError::Transport(format!("no reply for {}", request.path)))?;
        let remaining = replies.iter().filter(|(path, _)| *path == request.path).count();
        Ok(if remaining > 1 { replies.remove(pos).1 } else { replies[pos].1.clone() })
    }
}

fn param<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn run(client: &ApiClient, list: &mut TrajectoryListController, request: FetchRequest) -> bool {
    let result = client.list_trajectories(request.params);
    list.apply_response(request.seq, result)
}

#[test]
fn epoch_navigation_and_question_jump_build_distinct_queries() -> Result<()> {
    let mut list = TrajectoryListController::default();

    let (seeded, errors) = list.seed_filters([
        (FilterField::TrainingId, FilterValue::Text("train_7".into())),
        (FilterField::EpochId, FilterValue::Integer(3)),
    ]);
    assert!(errors.is_empty());
    assert_eq!(seeded.page, 1);
    assert_eq!(param(&seeded.params, "training_id"), Some("train_7"));
    assert_eq!(param(&seeded.params, "epoch_id"), Some("3"));
    assert_eq!(param(&seeded.params, "data_id"), None);

    let jumped = list.seed_jump(JumpFilter::Question("q_42".into()));
    assert_eq!(param(&jumped.params, "data_id"), Some("q_42"));
    assert_eq!(param(&jumped.params, "training_id"), None, "a jump replaces earlier filters");
    assert!(!list.filter_panel_enabled());
    Ok(())
}

#[test]
fn equality_replaces_range_in_the_emitted_query() -> Result<()> {
    let mut list = TrajectoryListController::default();
    list.apply_filter(
        FilterField::Reward,
        FilterValue::Numeric(NumericFilter::range(Some(1.0), Some(3.0))),
    )?;
    let request = list.apply_filter(FilterField::Reward, FilterValue::Numeric(NumericFilter::equals(2.0)))?;

    let reward_params: Vec<_> = request.params.iter().filter(|(k, _)| k.starts_with("reward")).collect();
    assert_eq!(reward_params, vec![&("reward_exact".to_string(), "2.0".to_string())]);
    Ok(())
}

#[test]
fn server_error_yields_an_empty_page() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let server = thread::spawn(move || -> std::io::Result<()> {
        let (mut stream, _) = listener.accept()?;
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf)?;
        let body = r#"{"detail":"database unavailable"}"#;
        write!(
            stream,
            "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )?;
        stream.flush()
    });

    let transport = HttpTransport::new(
        &format!("http://{addr}/api"),
        &format!("http://{addr}"),
        Duration::from_secs(5),
    )?;
    let client = ApiClient::new(Arc::new(transport));
    let mut list = TrajectoryListController::default();
    let request = list.fetch_page(1);

    let outcome = client.list_trajectories(request.params.clone());
    assert!(matches!(&outcome, Err(err) if err.user_message().contains("database unavailable")));
    assert!(list.apply_response(request.seq, outcome));
    assert!(list.result().loaded);
    assert!(list.result().trajectories.is_empty());
    assert_eq!(list.result().total, 0);
    assert!(!list.is_loading());

    server.join().expect("server thread panicked")?;
    Ok(())
}

#[test]
fn typing_issues_one_fetch_per_quiet_window() -> Result<()> {
    let backend = FakeBackend::new(&[("/trajectories", json!({"data": [], "total": 0}))]);
    let client = ApiClient::new(backend.clone());
    let mut list = TrajectoryListController::new(20, Duration::from_millis(300));
    let start = Instant::now();

    for (i, term) in ["t", "ti", "tim", "time"].iter().enumerate() {
        let now = start + Duration::from_millis(100 * i as u64);
        list.set_search(*term, now);
        assert!(list.poll_search(now).is_none());
    }
    assert!(list.poll_search(start + Duration::from_millis(500)).is_none());

    let request = list
        .poll_search(start + Duration::from_millis(600))
        .expect("debounced search should fire once the input is quiet");
    assert_eq!(param(&request.params, "search"), Some("time"));
    assert!(run(&client, &mut list, request));
    assert!(list.poll_search(start + Duration::from_millis(2000)).is_none());

    assert_eq!(backend.paths(), vec!["/trajectories".to_string()]);
    Ok(())
}

#[test]
fn slow_stale_page_never_overwrites_newer_results() -> Result<()> {
    let mut list = TrajectoryListController::default();
    let first = list.fetch_page(1);
    let sorted = list.set_sort(SortField::Reward);

    let newer = rtraj::Page {
        data: vec![rtraj::Trajectory {
            trajectory_id: "best".into(),
            ..Default::default()
        }],
        total: 1,
        page: Some(1),
        page_size: Some(20),
    };
    assert!(list.apply_response(sorted.seq, Ok(newer)));
    assert!(!list.apply_response(first.seq, Ok(rtraj::Page::empty())));
    assert_eq!(list.result().trajectories[0].trajectory_id, "best");
    Ok(())
}

#[test]
fn clearing_everything_restores_the_initial_query() -> Result<()> {
    let mut list = TrajectoryListController::default();
    let initial = list.fetch_page(1).params;

    list.apply_filter(FilterField::AgentName, FilterValue::Text("planner".into()))?;
    list.apply_filter(FilterField::IsSuccess, FilterValue::Bool(false))?;
    list.set_sort(SortField::StepCount);
    list.change_page(3);

    let cleared = list.clear_all();
    assert_eq!(cleared.page, 1);
    assert_eq!(cleared.params, initial);
    assert!(list.sort().is_none());
    assert!(!list.has_constraints());

    let refetched = list.fetch_page(1);
    assert_eq!(refetched.params, initial);
    Ok(())
}

#[test]
fn editing_a_numeric_row_sends_exactly_what_the_row_holds() -> Result<()> {
    let mut list = TrajectoryListController::default();
    let reward = |params: &QueryParams| -> Vec<(String, String)> {
        params.iter().filter(|(k, _)| k.starts_with("reward")).cloned().collect()
    };

    list.apply_filter(FilterField::Reward, FilterValue::Numeric(NumericFilter::equals(2.0)))?;
    let request = list.apply_filter(
        FilterField::Reward,
        FilterValue::Numeric(NumericFilter::range(Some(1.0), Some(3.0))),
    )?;
    assert_eq!(
        reward(&request.params),
        vec![
            ("reward_min".to_string(), "1.0".to_string()),
            ("reward_max".to_string(), "3.0".to_string()),
        ]
    );

    let request = list.apply_filter(
        FilterField::Reward,
        FilterValue::Numeric(NumericFilter::range(Some(5.0), None)),
    )?;
    assert_eq!(reward(&request.params), vec![("reward_min".to_string(), "5.0".to_string())]);
    Ok(())
}

#[test]
fn import_job_is_polled_until_it_completes() -> Result<()> {
    let backend = FakeBackend::new(&[
        ("/import/from-path", json!({"task_id": "imp_9", "status": "pending", "progress": 0})),
        ("/import/status/imp_9", json!({"task_id": "imp_9", "status": "processing", "progress": 40})),
        (
            "/import/status/imp_9",
            json!({"task_id": "imp_9", "status": "completed", "progress": 100, "imported_count": 12}),
        ),
        ("/import/logs/imp_9", json!(["read 12 rows", "imported 12 trajectories"])),
    ]);
    let client = ApiClient::new(backend.clone());
    let mut tracker = ImportTracker::new();

    assert!(tracker.begin_submit());
    let action = tracker.on_submitted(client.import_from_path("/data/run.jsonl", rtraj::ImportFileType::Jsonl));
    assert_eq!(action, ImportAction::StartPolling("imp_9".into()));

    let mut polls = 0;
    let task_id = loop {
        polls += 1;
        match tracker.on_status(client.import_status("imp_9")?) {
            ImportAction::ContinuePolling | ImportAction::Nothing => assert!(polls < 10),
            ImportAction::FinishAndFetchLogs(task_id) => break task_id,
            other => panic!("unexpected action {other:?}"),
        }
    };
    tracker.on_logs(&task_id, client.import_logs(&task_id));

    assert_eq!(polls, 2);
    assert!(matches!(tracker.phase(), ImportPhase::Completed { task_id } if task_id == "imp_9"));
    assert_eq!(tracker.progress(), 1.0);
    assert_eq!(tracker.logs().len(), 2);
    assert_eq!(tracker.job().map(|job| job.imported_count), Some(12));
    assert!(tracker.can_submit());
    Ok(())
}
