//! Dispatch engine implementation

use std::sync::Arc;
use std::time::Instant;

use page_actions::{ElementRef, PageFacade};
use pagefactory_core_types::{arg_kinds, format_signature, StepArg};
use pagefactory_registry::{ActionDescriptor, ActionScope, PageDescriptor, RegistryIndex};
use tracing::{debug, info, warn};

use crate::errors::DispatchError;
use crate::metrics::{self, Outcome};

/// Pick the one overload whose declared parameter kinds equal the supplied ones.
///
/// Zero candidates, zero matches and several matches are all errors.
pub fn select_overload<'a>(
    page: &str,
    title: &str,
    candidates: &'a [Arc<ActionDescriptor>],
    args: &[StepArg],
) -> Result<&'a Arc<ActionDescriptor>, DispatchError> {
    let supplied = arg_kinds(args);
    let mut matching = candidates
        .iter()
        .filter(|candidate| candidate.arity() == args.len() && candidate.accepts(&supplied));

    let Some(first) = matching.next() else {
        return Err(DispatchError::ActionNotFound {
            page: page.to_string(),
            title: title.to_string(),
            supplied,
            declared: candidates.iter().map(|c| c.signature()).collect(),
        });
    };

    let extra = matching.count();
    if extra > 0 {
        return Err(DispatchError::AmbiguousAction {
            page: page.to_string(),
            title: title.to_string(),
            supplied,
            matches: extra + 1,
        });
    }

    Ok(first)
}

/// Title dispatcher over a shared, read-only registry.
#[derive(Clone)]
pub struct DispatchEngine {
    registry: Arc<RegistryIndex>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<RegistryIndex>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RegistryIndex> {
        &self.registry
    }

    /// Resolve `title` on `page` and invoke the matching overload with `args`.
    pub async fn invoke_action(
        &self,
        page: &PageDescriptor,
        title: &str,
        args: &[StepArg],
        facade: &PageFacade,
    ) -> Result<(), DispatchError> {
        let started = Instant::now();
        let candidates = self.registry.resolve_action_candidates(page, title);
        debug!(
            page = %page.title,
            action = %title,
            candidates = candidates.len(),
            supplied = %format_signature(&arg_kinds(args)),
            "resolving action"
        );

        let action = match select_overload(&page.title, title, candidates, args) {
            Ok(action) => action,
            Err(err) => {
                metrics::record(match err {
                    DispatchError::AmbiguousAction { .. } => Outcome::Ambiguous,
                    _ => Outcome::NotFound,
                });
                return Err(err);
            }
        };

        let scope = ActionScope { page, facade };
        match action.handler.invoke(scope, args).await {
            Ok(()) => {
                metrics::record(Outcome::Invoked);
                info!(
                    page = %page.title,
                    action = %action.signature(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    "action invoked"
                );
                Ok(())
            }
            Err(source) => {
                metrics::record(Outcome::Failed);
                warn!(
                    page = %page.title,
                    action = %action.signature(),
                    "action failed: {:#}",
                    source
                );
                Err(DispatchError::ActionInvocation {
                    page: page.title.clone(),
                    title: title.to_string(),
                    source,
                })
            }
        }
    }

    /// Element lookup by title; one title names one element within a page.
    pub fn resolve_element(
        &self,
        page: &PageDescriptor,
        title: &str,
    ) -> Result<ElementRef, DispatchError> {
        let element = self.registry.resolve_element(page, title)?;
        Ok(ElementRef::new(
            page.title.clone(),
            element.title.clone(),
            element.locator.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefactory_core_types::{ArgKind, DataTable};
    use pagefactory_registry::FnAction;

    fn overload(params: &[ArgKind]) -> Arc<ActionDescriptor> {
        Arc::new(ActionDescriptor {
            title: "submit".to_string(),
            params: params.to_vec(),
            handler: Arc::new(FnAction::new(|_args: &[StepArg]| Ok(()))),
        })
    }

    #[test]
    fn picks_overload_by_arity() {
        let candidates = vec![
            overload(&[]),
            overload(&[ArgKind::Scalar]),
            overload(&[ArgKind::Scalar, ArgKind::Scalar]),
            overload(&[ArgKind::Scalar, ArgKind::Scalar, ArgKind::Scalar]),
        ];
        for n in 0..=3 {
            let args: Vec<StepArg> = (0..n).map(|i| StepArg::scalar(i.to_string())).collect();
            let picked = select_overload("Login", "submit", &candidates, &args).unwrap();
            assert_eq!(picked.arity(), n);
        }
    }

    #[test]
    fn table_only_fills_a_table_slot() {
        let candidates = vec![overload(&[ArgKind::Scalar]), overload(&[ArgKind::Table])];
        let args = vec![StepArg::Table(DataTable::default())];
        let picked = select_overload("Login", "submit", &candidates, &args).unwrap();
        assert_eq!(picked.params, vec![ArgKind::Table]);

        let list = vec![StepArg::List(vec!["a".into()])];
        let err = select_overload("Login", "submit", &candidates, &list).unwrap_err();
        assert!(matches!(err, DispatchError::ActionNotFound { .. }));
    }

    #[test]
    fn empty_overload_set_is_not_found() {
        let err = select_overload("Login", "cancel", &[], &[]).unwrap_err();
        assert_eq!(err.title(), "cancel");
        assert_eq!(
            err.to_string(),
            "action 'cancel' taking () not found on page 'Login'"
        );
    }

    #[test]
    fn not_found_lists_declared_signatures() {
        let candidates = vec![overload(&[]), overload(&[ArgKind::Scalar])];
        let args = vec![StepArg::scalar("a"), StepArg::scalar("b")];
        let err = select_overload("Login", "submit", &candidates, &args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "action 'submit' taking (scalar, scalar) not found on page 'Login' \
             (declared: submit(), submit(scalar))"
        );
    }

    #[test]
    fn identical_signatures_are_ambiguous() {
        let candidates = vec![overload(&[ArgKind::Scalar]), overload(&[ArgKind::Scalar])];
        let err =
            select_overload("Login", "submit", &candidates, &[StepArg::scalar("x")]).unwrap_err();
        assert!(matches!(err, DispatchError::AmbiguousAction { matches: 2, .. }));
    }
}
