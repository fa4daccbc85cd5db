//! Step-level errors
//!
//! Every failure a step can raise, flattened into one type the runner and the
//! CLI can report by `kind()` and failing title.

use page_actions::InteractionError;
use pagefactory_core_types::ArgError;
use pagefactory_page_context::ContextError;
use pagefactory_registry::RegistryError;
use step_dispatch::DispatchError;
use step_fragments::FragmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Dispatch(DispatchError),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    /// An action got an argument of the right kind but the wrong shape
    #[error("invalid argument for '{title}': {source}")]
    Argument {
        title: String,
        #[source]
        source: ArgError,
    },

    /// A check step whose predicate did not hold
    #[error("{message}")]
    Assertion { title: String, message: String },

    /// Step text no step definition matches
    #[error("no step definition matches '{0}'")]
    UndefinedStep(String),
}

impl StepError {
    pub fn assertion(title: &str, message: impl Into<String>) -> Self {
        StepError::Assertion {
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// Stable label for the failure mode.
    pub fn kind(&self) -> &'static str {
        match self {
            StepError::Registry(err) => registry_kind(err),
            StepError::Context(err) => match err {
                ContextError::Uninitialized { .. } => "uninitialized_page",
                ContextError::PageInitialization { .. } => "page_initialization",
                ContextError::Registry(err) => registry_kind(err),
                ContextError::Interaction(_) => "page_interaction",
            },
            StepError::Dispatch(err) => match err {
                DispatchError::ActionNotFound { .. } => "action_not_found",
                DispatchError::AmbiguousAction { .. } => "ambiguous_action",
                DispatchError::ActionInvocation { .. } => "action_invocation",
                DispatchError::Registry(err) => registry_kind(err),
            },
            StepError::Fragment(err) => match err {
                FragmentError::NotFound { .. } => "fragment_not_found",
                FragmentError::NotExpanded { .. } => "fragment_not_expanded",
                FragmentError::Cycle { .. } => "fragment_cycle",
                FragmentError::Duplicate { .. }
                | FragmentError::Invalid(_)
                | FragmentError::Io(_) => "fragment_source",
            },
            StepError::Interaction(_) => "page_interaction",
            StepError::Argument { .. } => "argument",
            StepError::Assertion { .. } => "assertion",
            StepError::UndefinedStep(_) => "undefined_step",
        }
    }

    /// The title (page, element, action or fragment name) that failed.
    pub fn title(&self) -> &str {
        match self {
            StepError::Registry(err) => err.title(),
            StepError::Context(err) => match err {
                ContextError::Uninitialized { .. } => "",
                ContextError::PageInitialization { title, .. } => title,
                ContextError::Registry(err) => err.title(),
                ContextError::Interaction(err) => interaction_target(err),
            },
            StepError::Dispatch(err) => err.title(),
            StepError::Fragment(err) => err.name(),
            StepError::Interaction(err) => interaction_target(err),
            StepError::Argument { title, .. } => title,
            StepError::Assertion { title, .. } => title,
            StepError::UndefinedStep(step) => step,
        }
    }
}

impl From<DispatchError> for StepError {
    /// Argument errors raised inside an action body keep their own kind.
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::ActionInvocation {
                page,
                title,
                source,
            } => match source.downcast::<ArgError>() {
                Ok(source) => StepError::Argument { title, source },
                Err(source) => StepError::Dispatch(DispatchError::ActionInvocation {
                    page,
                    title,
                    source,
                }),
            },
            other => StepError::Dispatch(other),
        }
    }
}

fn registry_kind(err: &RegistryError) -> &'static str {
    match err {
        RegistryError::NotFound { .. } => "not_found",
        RegistryError::AmbiguousTitle { .. } => "ambiguous_title",
    }
}

fn interaction_target(err: &InteractionError) -> &str {
    match err {
        InteractionError::PageInteraction { element, .. } => element,
        InteractionError::NoSession => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefactory_registry::EntityKind;

    #[test]
    fn nested_registry_errors_keep_their_kind() {
        let missing = RegistryError::NotFound {
            kind: EntityKind::Element,
            title: "Password".into(),
            page: Some("Login".into()),
        };
        let err = StepError::from(DispatchError::from(missing));
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.title(), "Password");
    }

    #[test]
    fn assertion_carries_the_original_message() {
        let err = StepError::assertion("Username", "'Username' value is not equal with 'admin'");
        assert_eq!(err.kind(), "assertion");
        assert_eq!(err.title(), "Username");
        assert_eq!(err.to_string(), "'Username' value is not equal with 'admin'");
    }

    #[test]
    fn fragment_errors_map_to_fragment_kinds() {
        let err = StepError::from(FragmentError::NotExpanded {
            name: "login".into(),
        });
        assert_eq!(err.kind(), "fragment_not_expanded");
        assert_eq!(err.title(), "login");
    }

    #[test]
    fn argument_errors_inside_actions_keep_their_kind() {
        let shape = DispatchError::ActionInvocation {
            page: "Login".into(),
            title: "fill form".into(),
            source: ArgError::MissingHeader.into(),
        };
        let err = StepError::from(shape);
        assert_eq!(err.kind(), "argument");
        assert_eq!(err.title(), "fill form");

        let other = DispatchError::ActionInvocation {
            page: "Login".into(),
            title: "submit".into(),
            source: anyhow::anyhow!("button disabled"),
        };
        let err = StepError::from(other);
        assert_eq!(err.kind(), "action_invocation");
        assert_eq!(err.title(), "submit");
    }
}
