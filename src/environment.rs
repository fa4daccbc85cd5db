//! Process-wide engine wiring: registry, step router, fragment redirector and
//! web setup, built once from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use page_actions::{PageDriver, RecordingDriver, SessionSlot};
use pagefactory_page_context::{PageCache, PageManager, ScenarioLock};
use pagefactory_registry::{PageSource, RegistryIndex};
use step_fragments::{FragmentLibrary, FragmentRedirector};
use tracing::info;

use crate::config::PageFactoryConfig;
use crate::pages::YamlPages;
use crate::setup::{DriverFactory, WebSetup};
use crate::steps::{GenericSteps, StepRouter};
use crate::tasks::TaskHandler;

/// Cache, session and session lock handed to every scenario when sessions
/// are preserved.
pub struct SharedSession {
    pub cache: Arc<PageCache>,
    pub session: Arc<SessionSlot>,
    pub lock: ScenarioLock,
}

pub struct Environment {
    registry: Arc<RegistryIndex>,
    router: StepRouter,
    redirector: FragmentRedirector,
    setup: WebSetup,
    shared: Option<SharedSession>,
}

impl Environment {
    pub fn new(
        registry: Arc<RegistryIndex>,
        fragments: FragmentLibrary,
        config: &PageFactoryConfig,
        factory: DriverFactory,
    ) -> Result<Self> {
        let redirector = FragmentRedirector::new(Arc::new(fragments))
            .with_max_depth(config.fragments.max_depth);
        let setup = WebSetup::new(
            PageManager::new(Arc::clone(&registry)),
            factory,
            config.driver.timeout()?,
            config.session.dismiss_alerts_on_dispose,
            Arc::new(TaskHandler::new()),
        );
        let shared = config.session.preserve.then(|| SharedSession {
            cache: Arc::new(PageCache::new()),
            session: Arc::new(SessionSlot::new()),
            lock: Arc::new(tokio::sync::Mutex::new(())),
        });

        Ok(Self {
            router: StepRouter::new(GenericSteps::new(Arc::clone(&registry)))
                .with_marker(redirector.marker().clone()),
            registry,
            redirector,
            setup,
            shared,
        })
    }

    /// Load pages and fragments named by `config`.
    pub fn from_config(config: &PageFactoryConfig, factory: DriverFactory) -> Result<Self> {
        let pages_path = config
            .pages
            .as_ref()
            .context("No pages file configured (set `pages` or pass --pages)")?;
        let pages = YamlPages::load(pages_path)?;
        let registry = Arc::new(
            RegistryIndex::from_sources(&[&pages as &dyn PageSource])
                .context("Failed to build page registry")?,
        );

        let fragments = match &config.fragments.path {
            Some(path) => FragmentLibrary::load(path)
                .with_context(|| format!("Failed to load fragments from {}", path.display()))?,
            None => FragmentLibrary::new(),
        };

        info!(
            pages = registry.len(),
            fragments = fragments.len(),
            "environment ready"
        );
        Self::new(registry, fragments, config, factory)
    }

    pub fn registry(&self) -> &Arc<RegistryIndex> {
        &self.registry
    }

    pub fn router(&self) -> &StepRouter {
        &self.router
    }

    pub fn redirector(&self) -> &FragmentRedirector {
        &self.redirector
    }

    pub fn setup(&self) -> &WebSetup {
        &self.setup
    }

    pub fn shared(&self) -> Option<&SharedSession> {
        self.shared.as_ref()
    }
}

/// Factory producing a fresh in-memory driver per session.
pub fn recording_factory() -> DriverFactory {
    Arc::new(|_timeout: Duration| Arc::new(RecordingDriver::new()) as Arc<dyn PageDriver>)
}
