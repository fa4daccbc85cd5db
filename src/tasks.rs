//! Deferred teardown tasks
//!
//! Tasks are queued while a scenario winds down and run later as helper tasks.
//! A task that touches shared session state holds the scenario lock while it
//! does so.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use pagefactory_page_context::ScenarioState;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Upper bound on alerts dismissed by one [`KillAlertTask`] run.
const MAX_ALERTS: usize = 32;

#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> Result<()>;
}

/// Outcome of one task run.
#[derive(Debug)]
pub struct TaskOutcome {
    pub name: String,
    pub result: Result<()>,
}

#[derive(Default)]
pub struct TaskHandler {
    queue: Mutex<Vec<Box<dyn Task>>>,
}

impl TaskHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&self, task: Box<dyn Task>) {
        debug!(task = task.name(), "task queued");
        self.queue.lock().push(task);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Drain the queue and run every task on its own tokio task.
    pub async fn run_tasks(&self) -> Vec<TaskOutcome> {
        let tasks: Vec<Box<dyn Task>> = std::mem::take(&mut *self.queue.lock());
        let mut set = JoinSet::new();
        for (idx, task) in tasks.into_iter().enumerate() {
            set.spawn(async move {
                let name = task.name().to_string();
                let result = task.run().await;
                (idx, TaskOutcome { name, result })
            });
        }

        let mut outcomes = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => {
                    if let Err(err) = &outcome.result {
                        warn!(task = %outcome.name, "task failed: {:#}", err);
                    }
                    outcomes.push((idx, outcome));
                }
                Err(err) => warn!(?err, "task panicked or was aborted"),
            }
        }
        outcomes.sort_by_key(|(idx, _)| *idx);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

/// Dismisses every open alert on the scenario's driver session.
pub struct KillAlertTask {
    scenario: Arc<ScenarioState>,
}

impl KillAlertTask {
    pub fn new(scenario: Arc<ScenarioState>) -> Self {
        Self { scenario }
    }
}

#[async_trait]
impl Task for KillAlertTask {
    fn name(&self) -> &str {
        "kill-alert"
    }

    async fn run(&self) -> Result<()> {
        let _guard = self.scenario.lock().await;
        if self.scenario.session().is_session_empty() {
            return Ok(());
        }
        let facade = self.scenario.facade()?;
        let mut dismissed = 0;
        while dismissed < MAX_ALERTS && facade.dismiss_alert().await? {
            dismissed += 1;
        }
        if dismissed > 0 {
            info!(scenario = %self.scenario.id(), dismissed, "alerts dismissed");
        }
        Ok(())
    }
}
