use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use pagefactory_core_types::{PageInstanceId, ScenarioId};
use pagefactory_registry::PageDescriptor;
use tracing::debug;

use crate::errors::ContextError;

/// A page that has been opened on the driver.
#[derive(Debug)]
pub struct PageInstance {
    pub id: PageInstanceId,
    pub descriptor: Arc<PageDescriptor>,
    pub opened_at: Instant,
}

impl PageInstance {
    pub fn new(descriptor: Arc<PageDescriptor>) -> Self {
        Self {
            id: PageInstanceId::new(),
            descriptor,
            opened_at: Instant::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }
}

/// Holds exactly one current page reference for one scenario. Not a stack.
#[derive(Debug)]
pub struct PageContext {
    scenario: ScenarioId,
    current: RwLock<Option<Arc<PageInstance>>>,
}

impl PageContext {
    pub fn new(scenario: ScenarioId) -> Self {
        Self {
            scenario,
            current: RwLock::new(None),
        }
    }

    pub fn scenario(&self) -> &ScenarioId {
        &self.scenario
    }

    pub fn get_current_page(&self) -> Result<Arc<PageInstance>, ContextError> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| ContextError::Uninitialized {
                scenario: self.scenario.to_string(),
            })
    }

    pub fn set_current_page(&self, page: Arc<PageInstance>) {
        debug!(scenario = %self.scenario, page = %page.title(), "current page set");
        *self.current.write() = Some(page);
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_none()
    }

    pub fn clear(&self) {
        self.current.write().take();
    }
}
