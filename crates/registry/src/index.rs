use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use pagefactory_core_types::ArgKind;
use tracing::{debug, info, warn};

use crate::{
    api::{PageDefinition, PageSource},
    errors::{EntityKind, RegistryError},
    metrics,
    model::{ActionDescriptor, ElementDescriptor, PageDescriptor},
};

/// Two or more overloads on one page sharing title and parameter kinds.
/// Dispatching to them always fails as ambiguous.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverloadConflict {
    pub page: String,
    pub title: String,
    pub params: Vec<ArgKind>,
    pub count: usize,
}

/// Immutable title index over every registered page.
#[derive(Debug, Default)]
pub struct RegistryIndex {
    pages: HashMap<String, Arc<PageDescriptor>>,
    conflicts: Vec<OverloadConflict>,
}

impl RegistryIndex {
    /// Index every page the sources enumerate.
    pub fn from_sources(sources: &[&dyn PageSource]) -> Result<Self, RegistryError> {
        Self::build(sources.iter().flat_map(|source| source.pages()))
    }

    pub fn build<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = PageDefinition>,
    {
        let mut pages = HashMap::new();
        let mut conflicts = Vec::new();

        for definition in definitions {
            let title = definition.title.clone();
            let (descriptor, page_conflicts) = build_page(definition)?;
            match pages.entry(title) {
                Entry::Occupied(entry) => {
                    return Err(RegistryError::AmbiguousTitle {
                        kind: EntityKind::Page,
                        title: entry.key().clone(),
                        page: None,
                    });
                }
                Entry::Vacant(entry) => {
                    debug!(page = %entry.key(), "page indexed");
                    entry.insert(Arc::new(descriptor));
                }
            }
            conflicts.extend(page_conflicts);
        }

        for conflict in &conflicts {
            warn!(
                page = %conflict.page,
                action = %conflict.title,
                overloads = conflict.count,
                "action overloads share one signature; dispatch to them will be ambiguous"
            );
        }

        let index = Self { pages, conflicts };
        let (elements, actions) = index.totals();
        metrics::set_index_size(index.pages.len(), elements, actions);
        info!(
            pages = index.pages.len(),
            elements, actions, "registry index built"
        );
        Ok(index)
    }

    pub fn resolve_page(&self, title: &str) -> Result<Arc<PageDescriptor>, RegistryError> {
        self.pages.get(title).cloned().ok_or_else(|| {
            metrics::record_lookup_miss(EntityKind::Page);
            RegistryError::page_not_found(title)
        })
    }

    pub fn resolve_element(
        &self,
        page: &PageDescriptor,
        title: &str,
    ) -> Result<Arc<ElementDescriptor>, RegistryError> {
        page.element(title).cloned()
    }

    /// Every overload registered under `title` on `page`, possibly none.
    pub fn resolve_action_candidates<'p>(
        &self,
        page: &'p PageDescriptor,
        title: &str,
    ) -> &'p [Arc<ActionDescriptor>] {
        let candidates = page.actions(title);
        if candidates.is_empty() {
            metrics::record_lookup_miss(EntityKind::Action);
        }
        candidates
    }

    pub fn contains_page(&self, title: &str) -> bool {
        self.pages.contains_key(title)
    }

    pub fn page_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        titles.sort_unstable();
        titles
    }

    pub fn pages(&self) -> impl Iterator<Item = &Arc<PageDescriptor>> {
        self.pages.values()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn conflicting_overloads(&self) -> &[OverloadConflict] {
        &self.conflicts
    }

    fn totals(&self) -> (usize, usize) {
        self.pages.values().fold((0, 0), |(elements, actions), page| {
            (
                elements + page.element_count(),
                actions + page.action_count(),
            )
        })
    }
}

fn build_page(
    definition: PageDefinition,
) -> Result<(PageDescriptor, Vec<OverloadConflict>), RegistryError> {
    let PageDefinition {
        title,
        page_type,
        elements: element_defs,
        actions: action_defs,
    } = definition;

    let mut elements = HashMap::with_capacity(element_defs.len());
    for (element_title, locator) in element_defs {
        match elements.entry(element_title) {
            Entry::Occupied(entry) => {
                return Err(RegistryError::AmbiguousTitle {
                    kind: EntityKind::Element,
                    title: entry.key().clone(),
                    page: Some(title),
                });
            }
            Entry::Vacant(entry) => {
                let descriptor = ElementDescriptor {
                    title: entry.key().clone(),
                    locator,
                };
                entry.insert(Arc::new(descriptor));
            }
        }
    }

    let mut actions: HashMap<String, Vec<Arc<ActionDescriptor>>> = HashMap::new();
    for action in action_defs {
        actions
            .entry(action.title.clone())
            .or_default()
            .push(Arc::new(ActionDescriptor {
                title: action.title,
                params: action.params,
                handler: action.handler,
            }));
    }

    let mut conflicts = Vec::new();
    for (action_title, overloads) in &actions {
        let mut seen: Vec<(&[ArgKind], usize)> = Vec::new();
        for overload in overloads {
            match seen
                .iter_mut()
                .find(|(params, _)| *params == overload.params.as_slice())
            {
                Some((_, count)) => *count += 1,
                None => seen.push((overload.params.as_slice(), 1)),
            }
        }
        conflicts.extend(
            seen.into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(params, count)| OverloadConflict {
                    page: title.clone(),
                    title: action_title.clone(),
                    params: params.to_vec(),
                    count,
                }),
        );
    }

    let descriptor = PageDescriptor {
        title,
        page_type,
        elements,
        actions,
    };
    Ok((descriptor, conflicts))
}
