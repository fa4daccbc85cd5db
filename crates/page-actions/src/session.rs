use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::driver::PageDriver;
use crate::errors::InteractionError;
use crate::facade::PageFacade;

/// Holds the driver session a scenario talks to.
#[derive(Default)]
pub struct SessionSlot {
    driver: RwLock<Option<Arc<dyn PageDriver>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_session_empty(&self) -> bool {
        self.driver.read().is_none()
    }

    pub fn set_session(&self, driver: Arc<dyn PageDriver>) {
        *self.driver.write() = Some(driver);
        info!("driver session installed");
    }

    pub fn take_session(&self) -> Option<Arc<dyn PageDriver>> {
        self.driver.write().take()
    }

    pub fn session(&self) -> Result<Arc<dyn PageDriver>, InteractionError> {
        self.driver.read().clone().ok_or(InteractionError::NoSession)
    }

    pub fn facade(&self) -> Result<PageFacade, InteractionError> {
        self.session().map(PageFacade::new)
    }
}
