//! Bounded-concurrency batch execution
//!
//! The executor runs one operation over a set of resource tasks on tokio
//! workers, at most `max_workers` at a time. Failures are captured per task
//! and reported once the whole batch has finished; tasks that succeeded stay
//! provisioned.
//!
//! A batch that outlives its timeout returns [`CloudError::BatchTimeout`].
//! Workers still in flight are left running in the background and finish on
//! their own; the caller just stops waiting for them.

use crate::error::{CloudError, Result};
use crate::task::{Operation, ResourceTask, TaskState};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_MAX_WORKERS: usize = 30;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Longest wait the executor schedules; larger settings mean "no limit".
const MAX_WAIT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Executor tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on concurrently running tasks
    pub max_workers: usize,

    /// How often progress is checked while waiting
    #[serde(rename = "poll_interval_secs", with = "duration_secs")]
    pub poll_interval: Duration,

    /// How long to wait for the whole batch
    #[serde(rename = "timeout_secs", with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ExecutorConfig {
    /// Defaults overridden by `TERRAFLOW_MAX_WORKERS`,
    /// `TERRAFLOW_POLL_INTERVAL_SECS` and `TERRAFLOW_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(workers) = env_number("TERRAFLOW_MAX_WORKERS")? {
            config.max_workers = workers as usize;
        }
        if let Some(secs) = env_number("TERRAFLOW_POLL_INTERVAL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_number("TERRAFLOW_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(CloudError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(CloudError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(CloudError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn env_number(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CloudError::InvalidConfig(format!("{} must be a number, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Terminal outcome of one task in a batch
#[derive(Debug)]
pub struct TaskOutcome {
    /// Position of the task in the submitted batch
    pub index: usize,
    pub task: String,
    pub result: std::result::Result<(), anyhow::Error>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    pub fn state(&self) -> TaskState {
        if self.is_success() {
            TaskState::Completed
        } else {
            TaskState::Failed
        }
    }
}

/// Per-task outcomes of one finished batch, in submission order
#[derive(Debug)]
pub struct BatchReport {
    operation: Operation,
    outcomes: Vec<TaskOutcome>,
    elapsed: Duration,
}

impl BatchReport {
    fn empty(operation: Operation) -> Self {
        Self {
            operation,
            outcomes: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TaskOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// The failure of the earliest submitted task that failed
    pub fn first_failure(&self) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.is_failure())
    }

    /// `Ok(self)` when every task succeeded, otherwise the first failure
    /// as [`CloudError::TaskExecution`].
    pub fn into_result(mut self) -> Result<Self> {
        let Some(pos) = self.outcomes.iter().position(TaskOutcome::is_failure) else {
            return Ok(self);
        };

        let outcome = self.outcomes.swap_remove(pos);
        match outcome.result {
            Err(source) => Err(CloudError::TaskExecution {
                task: outcome.task,
                index: outcome.index,
                operation: self.operation,
                source,
            }),
            Ok(()) => Ok(self),
        }
    }
}

/// Runs batches of resource task operations
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `operation` over `tasks` and fail with the first task error.
    pub async fn run<S>(
        &self,
        tasks: &[Arc<dyn ResourceTask<S>>],
        operation: Operation,
        session: Arc<S>,
    ) -> Result<BatchReport>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        self.execute(tasks, operation, session).await?.into_result()
    }

    /// Run `operation` over `tasks` and report every outcome.
    ///
    /// Only a timeout is returned as an error; task failures are part of
    /// the report.
    pub async fn execute<S>(
        &self,
        tasks: &[Arc<dyn ResourceTask<S>>],
        operation: Operation,
        session: Arc<S>,
    ) -> Result<BatchReport>
    where
        S: Send + Sync + ?Sized + 'static,
    {
        if tasks.is_empty() {
            tracing::debug!("No resource tasks to {}", operation);
            return Ok(BatchReport::empty(operation));
        }

        let total = tasks.len();
        let workers = self.config.max_workers.clamp(1, total);
        let started = Instant::now();
        let deadline = started
            .checked_add(self.config.timeout.min(MAX_WAIT))
            .unwrap_or_else(|| started + Duration::from_secs(24 * 60 * 60));

        tracing::info!(%operation, tasks = total, workers, "Starting batch");

        let semaphore = Arc::new(Semaphore::new(workers));
        let states = Arc::new(Mutex::new(vec![TaskState::Unstarted; total]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (index, task) in tasks.iter().enumerate() {
            let task = Arc::clone(task);
            let session = Arc::clone(&session);
            let semaphore = Arc::clone(&semaphore);
            let states = Arc::clone(&states);
            let tx = tx.clone();

            tokio::spawn(async move {
                // The semaphore is never closed.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                set_state(&states, index, TaskState::InProgress);
                tracing::debug!(task = task.name(), %operation, "Task started");

                let result = AssertUnwindSafe(perform(task.as_ref(), operation, session.as_ref()))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(anyhow::anyhow!(
                            "resource task panicked: {}",
                            panic_message(panic.as_ref())
                        ))
                    });

                let state = if result.is_ok() {
                    TaskState::Completed
                } else {
                    TaskState::Failed
                };
                set_state(&states, index, state);

                // Nobody is listening any more once the batch timed out.
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut results: Vec<Option<std::result::Result<(), anyhow::Error>>> =
            (0..total).map(|_| None).collect();
        let mut remaining = total;

        let mut ticker = tokio::time::interval(self.config.poll_interval.min(MAX_WAIT));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        while remaining > 0 {
            tokio::select! {
                received = rx.recv() => match received {
                    Some((index, result)) => {
                        if let Err(e) = &result {
                            tracing::error!(task = tasks[index].name(), %operation, "Exception caught: {:#}", e);
                        }
                        results[index] = Some(result);
                        remaining -= 1;
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    tracing::debug!(
                        %operation,
                        finished = total - remaining,
                        total,
                        elapsed = ?started.elapsed(),
                        "Waiting for tasks to finish"
                    );
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let pending: Vec<String> = results
                        .iter()
                        .enumerate()
                        .filter(|(_, r)| r.is_none())
                        .map(|(i, _)| tasks[i].name().to_string())
                        .collect();
                    let unstarted: Vec<String> = states
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| **s == TaskState::Unstarted)
                        .map(|(i, _)| tasks[i].name().to_string())
                        .collect();
                    tracing::warn!(
                        %operation,
                        pending = pending.len(),
                        unstarted = unstarted.len(),
                        "Timeout waiting for tasks to finish; they keep running in the background"
                    );
                    return Err(CloudError::BatchTimeout {
                        operation,
                        timeout: self.config.timeout,
                        pending,
                        unstarted,
                    });
                }
            }
        }

        let outcomes: Vec<TaskOutcome> = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| TaskOutcome {
                index,
                task: tasks[index].name().to_string(),
                result: result
                    .unwrap_or_else(|| Err(anyhow::anyhow!("worker exited without reporting"))),
            })
            .collect();

        let report = BatchReport {
            operation,
            outcomes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            %operation,
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            elapsed = ?report.elapsed,
            "Batch finished"
        );
        Ok(report)
    }
}

async fn perform<S>(task: &dyn ResourceTask<S>, operation: Operation, session: &S) -> anyhow::Result<()>
where
    S: Send + Sync + ?Sized,
{
    match operation {
        Operation::Create => task.create(session).await,
        Operation::Destroy => task.destroy(session).await,
        Operation::Restore => task.restore(session).await,
    }
}

fn set_state(states: &Mutex<Vec<TaskState>>, index: usize, state: TaskState) {
    let mut states = states.lock().unwrap_or_else(PoisonError::into_inner);
    states[index] = state;
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    struct TimedTask {
        name: String,
        delay: Duration,
        fail: bool,
        done: AtomicBool,
        gauge: Arc<Gauge>,
    }

    impl TimedTask {
        fn new(name: &str, delay_ms: u64, fail: bool, gauge: &Arc<Gauge>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                delay: Duration::from_millis(delay_ms),
                fail,
                done: AtomicBool::new(false),
                gauge: Arc::clone(gauge),
            })
        }

        async fn work(&self) -> anyhow::Result<()> {
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.gauge.current.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("{} blew up", self.name);
            }
            self.done.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl ResourceTask<()> for TimedTask {
        fn name(&self) -> &str {
            &self.name
        }

        async fn create(&self, _session: &()) -> anyhow::Result<()> {
            self.work().await
        }

        async fn destroy(&self, _session: &()) -> anyhow::Result<()> {
            self.work().await
        }
    }

    struct PanickingTask;

    #[async_trait]
    impl ResourceTask<()> for PanickingTask {
        fn name(&self) -> &str {
            "panicky"
        }

        async fn create(&self, _session: &()) -> anyhow::Result<()> {
            panic!("kaboom");
        }

        async fn destroy(&self, _session: &()) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn as_tasks(timed: &[Arc<TimedTask>]) -> Vec<Arc<dyn ResourceTask<()>>> {
        timed
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn ResourceTask<()>>)
            .collect()
    }

    fn quick_config() -> ExecutorConfig {
        ExecutorConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tasks_complete_under_worker_cap() {
        let gauge = Arc::new(Gauge::default());
        let timed: Vec<_> = (1..=5)
            .map(|i| TimedTask::new(&format!("task-{}", i), 100, false, &gauge))
            .collect();
        let executor = Executor::new(quick_config().with_max_workers(2));

        let report = executor
            .run(&as_tasks(&timed), Operation::Create, Arc::new(()))
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.outcomes().len(), 5);
        assert!(report.outcomes().iter().all(|o| o.state() == TaskState::Completed));
        assert!(timed.iter().all(|p| p.done.load(Ordering::SeqCst)));
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported_after_batch_finishes() {
        let gauge = Arc::new(Gauge::default());
        let timed: Vec<_> = (1..=5)
            .map(|i| TimedTask::new(&format!("task-{}", i), 50 * i as u64, i == 3, &gauge))
            .collect();
        let executor = Executor::new(quick_config().with_max_workers(5));

        let err = executor
            .run(&as_tasks(&timed), Operation::Create, Arc::new(()))
            .await
            .unwrap_err();

        match &err {
            CloudError::TaskExecution {
                task,
                index,
                operation,
                source,
            } => {
                assert_eq!(task, "task-3");
                assert_eq!(*index, 2);
                assert_eq!(*operation, Operation::Create);
                assert_eq!(source.to_string(), "task-3 blew up");
            }
            other => panic!("unexpected error: {other}"),
        }

        // no rollback: the others stay created, including the slower ones
        for (i, task) in timed.iter().enumerate() {
            assert_eq!(task.done.load(Ordering::SeqCst), i != 2, "{}", task.name);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_follows_submission_order() {
        let gauge = Arc::new(Gauge::default());
        let timed = vec![
            TimedTask::new("a", 10, false, &gauge),
            TimedTask::new("b", 300, true, &gauge),
            TimedTask::new("c", 10, false, &gauge),
            TimedTask::new("d", 20, true, &gauge),
        ];
        let executor = Executor::new(quick_config());

        let report = executor
            .execute(&as_tasks(&timed), Operation::Destroy, Arc::new(()))
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed().count(), 2);
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.first_failure().map(|o| o.task.as_str()), Some("b"));
        assert_eq!(report.operation(), Operation::Destroy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_leaves_slow_task_running() {
        let gauge = Arc::new(Gauge::default());
        let timed = vec![
            TimedTask::new("fast", 10, false, &gauge),
            TimedTask::new("slow", 60 * 60 * 1000, false, &gauge),
        ];
        let executor = Executor::new(
            quick_config()
                .with_poll_interval(Duration::from_millis(20))
                .with_timeout(Duration::from_millis(200)),
        );

        let err = executor
            .run(&as_tasks(&timed), Operation::Create, Arc::new(()))
            .await
            .unwrap_err();

        match &err {
            CloudError::BatchTimeout {
                operation,
                timeout,
                pending,
                unstarted,
            } => {
                assert_eq!(*operation, Operation::Create);
                assert_eq!(*timeout, Duration::from_millis(200));
                assert_eq!(pending, &vec!["slow".to_string()]);
                assert!(unstarted.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(timed[0].done.load(Ordering::SeqCst));
        assert!(!timed[1].done.load(Ordering::SeqCst));

        // not cancelled: the slow worker still finishes in the background
        tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
        assert!(timed[1].done.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_tasks_that_never_started() {
        let gauge = Arc::new(Gauge::default());
        let timed = vec![
            TimedTask::new("first", 1000, false, &gauge),
            TimedTask::new("second", 1000, false, &gauge),
            TimedTask::new("third", 1000, false, &gauge),
        ];
        let executor = Executor::new(
            quick_config()
                .with_max_workers(1)
                .with_timeout(Duration::from_millis(1500)),
        );

        let err = executor
            .run(&as_tasks(&timed), Operation::Create, Arc::new(()))
            .await
            .unwrap_err();

        match &err {
            CloudError::BatchTimeout {
                pending, unstarted, ..
            } => {
                assert_eq!(pending, &vec!["second".to_string(), "third".to_string()]);
                assert_eq!(unstarted, &vec!["third".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("2 unfinished, 1 never started"), "{err}");
    }

    #[tokio::test]
    async fn test_huge_timeout_and_poll_interval_do_not_overflow() {
        let gauge = Arc::new(Gauge::default());
        let timed = vec![TimedTask::new("a", 10, false, &gauge)];
        let config = ExecutorConfig::default()
            .with_poll_interval(Duration::from_secs(u64::MAX))
            .with_timeout(Duration::from_secs(u64::MAX));
        assert!(config.validate().is_ok());

        let report = Executor::new(config)
            .run(&as_tasks(&timed), Operation::Create, Arc::new(()))
            .await
            .unwrap();
        assert!(report.is_success());
    }

    #[test]
    fn test_from_env_accepts_max_timeout() {
        temp_env::with_var("TERRAFLOW_TIMEOUT_SECS", Some(u64::MAX.to_string()), || {
            let config = ExecutorConfig::from_env().unwrap();
            assert_eq!(config.timeout, Duration::from_secs(u64::MAX));
        });
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let executor = Executor::default();
        let report = executor
            .run::<()>(&[], Operation::Create, Arc::new(()))
            .await
            .unwrap();
        assert!(report.is_success());
        assert!(report.outcomes().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_task_is_captured() {
        let tasks: Vec<Arc<dyn ResourceTask<()>>> = vec![Arc::new(PanickingTask)];
        let executor = Executor::new(quick_config());

        let report = executor
            .execute(&tasks, Operation::Create, Arc::new(()))
            .await
            .unwrap();

        let failure = report.first_failure().unwrap();
        assert_eq!(failure.state(), TaskState::Failed);
        let message = failure.result.as_ref().unwrap_err().to_string();
        assert!(message.contains("kaboom"), "{message}");
    }

    #[tokio::test]
    async fn test_restore_defaults_to_noop() {
        let gauge = Arc::new(Gauge::default());
        let timed = vec![TimedTask::new("r", 0, true, &gauge)];
        let executor = Executor::new(quick_config());

        let report = executor
            .run(&as_tasks(&timed), Operation::Restore, Arc::new(()))
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_config_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_workers, 30);
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: ExecutorConfig = serde_json::from_str(r#"{"max_workers": 4}"#).unwrap();
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        let config: ExecutorConfig =
            serde_json::from_str(r#"{"poll_interval_secs": 1, "timeout_secs": 90}"#).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_config_validate_rejects_zero() {
        assert!(ExecutorConfig::default().with_max_workers(0).validate().is_err());
        assert!(
            ExecutorConfig::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("TERRAFLOW_MAX_WORKERS", Some("8")),
                ("TERRAFLOW_POLL_INTERVAL_SECS", None),
                ("TERRAFLOW_TIMEOUT_SECS", Some("120")),
            ],
            || {
                let config = ExecutorConfig::from_env().unwrap();
                assert_eq!(config.max_workers, 8);
                assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
                assert_eq!(config.timeout, Duration::from_secs(120));
            },
        );
    }

    #[test]
    fn test_config_from_env_rejects_garbage() {
        temp_env::with_var("TERRAFLOW_MAX_WORKERS", Some("lots"), || {
            let err = ExecutorConfig::from_env().unwrap_err();
            assert!(matches!(err, CloudError::InvalidConfig(_)));
        });
        temp_env::with_var("TERRAFLOW_MAX_WORKERS", Some("0"), || {
            assert!(ExecutorConfig::from_env().is_err());
        });
    }
}
