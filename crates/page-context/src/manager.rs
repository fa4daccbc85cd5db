use std::sync::Arc;

use pagefactory_registry::RegistryIndex;
use tracing::{debug, info, warn};

use crate::context::PageInstance;
use crate::errors::ContextError;
use crate::scenario::ScenarioState;

/// Opens pages by title against a shared registry.
#[derive(Clone)]
pub struct PageManager {
    registry: Arc<RegistryIndex>,
}

impl PageManager {
    pub fn new(registry: Arc<RegistryIndex>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RegistryIndex> {
        &self.registry
    }

    /// Resolve `title`, reuse the cached instance or initialize a new one, and
    /// make it the scenario's current page.
    ///
    /// The current page only changes once the instance is fully initialized.
    pub async fn open_page(
        &self,
        scenario: &ScenarioState,
        title: &str,
    ) -> Result<Arc<PageInstance>, ContextError> {
        let descriptor = self.registry.resolve_page(title)?;

        if let Some(cached) = scenario.cache().get(title) {
            debug!(scenario = %scenario.id(), page = %title, "reusing cached page");
            scenario.context().set_current_page(Arc::clone(&cached));
            return Ok(cached);
        }

        let facade = scenario.facade()?;
        let _guard = scenario.lock().await;
        descriptor
            .page_type
            .initialize(&facade)
            .await
            .map_err(|source| {
                warn!(
                    scenario = %scenario.id(),
                    page = %title,
                    "page initialization failed: {:#}",
                    source
                );
                ContextError::PageInitialization {
                    title: title.to_string(),
                    source,
                }
            })?;

        let instance = Arc::new(PageInstance::new(descriptor));
        scenario.cache().insert(Arc::clone(&instance));
        scenario.context().set_current_page(Arc::clone(&instance));
        info!(scenario = %scenario.id(), page = %title, "page opened");
        Ok(instance)
    }

    /// Titles of every page that can be opened lazily; logs the set once.
    pub fn cache_pages(&self) -> Vec<String> {
        let titles: Vec<String> = self
            .registry
            .page_titles()
            .into_iter()
            .map(str::to_string)
            .collect();
        info!(pages = titles.len(), "pages available for caching");
        titles
    }
}
