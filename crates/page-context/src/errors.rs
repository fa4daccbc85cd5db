use page_actions::InteractionError;
use pagefactory_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    /// The current page was read before any page was opened in this scenario
    #[error("current page is not initialized in scenario {scenario}")]
    Uninitialized { scenario: String },

    /// Construction or navigation of the page failed
    #[error("page '{title}' failed to initialize: {source}")]
    PageInitialization {
        title: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),
}
