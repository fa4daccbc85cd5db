//! Dispatch error types

use pagefactory_core_types::{format_signature, ArgKind};
use pagefactory_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No overload of the title accepts the supplied arguments
    #[error(
        "action '{title}' taking {} not found on page '{page}'{}",
        format_signature(.supplied),
        declared_hint(.declared)
    )]
    ActionNotFound {
        page: String,
        title: String,
        supplied: Vec<ArgKind>,
        declared: Vec<String>,
    },

    /// More than one overload accepts the supplied arguments
    #[error(
        "action '{title}' taking {} is ambiguous on page '{page}': {matches} overloads match",
        format_signature(.supplied)
    )]
    AmbiguousAction {
        page: String,
        title: String,
        supplied: Vec<ArgKind>,
        matches: usize,
    },

    /// The resolved action raised during execution
    #[error("action '{title}' on page '{page}' failed: {source}")]
    ActionInvocation {
        page: String,
        title: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DispatchError {
    /// Title that failed to resolve or run.
    pub fn title(&self) -> &str {
        match self {
            DispatchError::ActionNotFound { title, .. }
            | DispatchError::AmbiguousAction { title, .. }
            | DispatchError::ActionInvocation { title, .. } => title,
            DispatchError::Registry(err) => err.title(),
        }
    }
}

fn declared_hint(declared: &[String]) -> String {
    if declared.is_empty() {
        String::new()
    } else {
        format!(" (declared: {})", declared.join(", "))
    }
}
