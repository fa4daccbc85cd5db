//! Web setup and teardown hooks run around every scenario.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use page_actions::PageDriver;
use pagefactory_page_context::{PageManager, ScenarioState};
use tracing::{debug, info};

use crate::tasks::{KillAlertTask, TaskHandler};

/// Creates a driver session; receives the configured driver timeout.
pub type DriverFactory = Arc<dyn Fn(Duration) -> Arc<dyn PageDriver> + Send + Sync>;

pub struct WebSetup {
    manager: PageManager,
    factory: DriverFactory,
    timeout: Duration,
    dismiss_alerts: bool,
    tasks: Arc<TaskHandler>,
    cached: OnceCell<Vec<String>>,
}

impl WebSetup {
    pub fn new(
        manager: PageManager,
        factory: DriverFactory,
        timeout: Duration,
        dismiss_alerts: bool,
        tasks: Arc<TaskHandler>,
    ) -> Self {
        Self {
            manager,
            factory,
            timeout,
            dismiss_alerts,
            tasks,
            cached: OnceCell::new(),
        }
    }

    pub fn tasks(&self) -> &Arc<TaskHandler> {
        &self.tasks
    }

    /// Cache page titles once per process and install a driver session when
    /// the scenario's slot is empty.
    pub fn init_web(&self, scenario: &ScenarioState) {
        self.cached.get_or_init(|| self.manager.cache_pages());
        if scenario.session().is_session_empty() {
            scenario.session().set_session((self.factory)(self.timeout));
            info!(scenario = %scenario.id(), "driver session started");
        } else {
            debug!(scenario = %scenario.id(), "reusing driver session");
        }
    }

    /// Queue alert cleanup for the scenario's session.
    pub fn dispose_web(&self, scenario: Arc<ScenarioState>) {
        if self.dismiss_alerts {
            self.tasks.add_task(Box::new(KillAlertTask::new(scenario)));
        }
    }
}
