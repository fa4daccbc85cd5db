use std::sync::Arc;

use page_actions::{PageFacade, SessionSlot};
use pagefactory_core_types::ScenarioId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::cache::PageCache;
use crate::context::PageContext;
use crate::errors::ContextError;

/// Lock serialising mutations of one driver session.
pub type ScenarioLock = Arc<Mutex<()>>;

/// Everything one running scenario owns.
///
/// The page cache, session slot and lock are `Arc`s so a preserved session can
/// be handed to the next scenario; the page context never is.
pub struct ScenarioState {
    id: ScenarioId,
    name: String,
    context: PageContext,
    cache: Arc<PageCache>,
    session: Arc<SessionSlot>,
    lock: ScenarioLock,
}

impl ScenarioState {
    /// A scenario with its own cache and an empty session slot.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_shared(
            name,
            Arc::new(PageCache::new()),
            Arc::new(SessionSlot::new()),
            Arc::new(Mutex::new(())),
        )
    }

    /// Scenarios sharing `session` must share `lock` as well.
    pub fn with_shared(
        name: impl Into<String>,
        cache: Arc<PageCache>,
        session: Arc<SessionSlot>,
        lock: ScenarioLock,
    ) -> Self {
        let id = ScenarioId::new();
        let name = name.into();
        debug!(scenario = %id, name = %name, "scenario state created");
        Self {
            context: PageContext::new(id.clone()),
            id,
            name,
            cache,
            session,
            lock,
        }
    }

    pub fn id(&self) -> &ScenarioId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    pub fn session(&self) -> &Arc<SessionSlot> {
        &self.session
    }

    pub fn facade(&self) -> Result<PageFacade, ContextError> {
        Ok(self.session.facade()?)
    }

    /// Scenario-level lock. Hold it for the duration of any mutation of
    /// shared session state made from a helper task.
    pub async fn lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.lock).lock_owned().await
    }

    /// Ends the scenario: drops the current page reference.
    pub fn finish(&self) {
        self.context.clear();
        debug!(scenario = %self.id, "scenario state cleared");
    }
}
