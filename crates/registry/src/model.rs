use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use page_actions::{ElementRef, Locator, PageFacade};
use pagefactory_core_types::{format_signature, ArgKind, StepArg};

use crate::errors::{EntityKind, RegistryError};
use crate::metrics;

/// Page implementation behind a page title: how to bring the page up on the driver.
#[async_trait]
pub trait PageType: Send + Sync {
    async fn initialize(&self, facade: &PageFacade) -> anyhow::Result<()>;
}

/// A page declared by data only. Navigates to `url` when one is set.
#[derive(Clone, Debug, Default)]
pub struct DeclaredPage {
    pub url: Option<String>,
}

impl DeclaredPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

#[async_trait]
impl PageType for DeclaredPage {
    async fn initialize(&self, facade: &PageFacade) -> anyhow::Result<()> {
        if let Some(url) = &self.url {
            facade.navigate(url).await?;
        }
        Ok(())
    }
}

/// What an action handler sees when invoked: its own page and the facade.
#[derive(Clone, Copy)]
pub struct ActionScope<'a> {
    pub page: &'a PageDescriptor,
    pub facade: &'a PageFacade,
}

impl<'a> ActionScope<'a> {
    pub fn element(&self, title: &str) -> Result<ElementRef, RegistryError> {
        self.page.element_ref(title)
    }
}

/// Callable behind an action title. Arguments arrive positionally in declared order.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn invoke(&self, scope: ActionScope<'_>, args: &[StepArg]) -> anyhow::Result<()>;
}

/// Handler backed by a synchronous closure that does not touch the UI.
pub struct FnAction<F>(F);

impl<F> FnAction<F>
where
    F: Fn(&[StepArg]) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> ActionHandler for FnAction<F>
where
    F: Fn(&[StepArg]) -> anyhow::Result<()> + Send + Sync,
{
    async fn invoke(&self, _scope: ActionScope<'_>, args: &[StepArg]) -> anyhow::Result<()> {
        (self.0)(args)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElementDescriptor {
    pub title: String,
    pub locator: Locator,
}

#[derive(Clone)]
pub struct ActionDescriptor {
    pub title: String,
    pub params: Vec<ArgKind>,
    pub handler: Arc<dyn ActionHandler>,
}

impl ActionDescriptor {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Arity and every slot must match exactly; a table only fills a table slot.
    pub fn accepts(&self, kinds: &[ArgKind]) -> bool {
        self.params.as_slice() == kinds
    }

    pub fn signature(&self) -> String {
        format!("{}{}", self.title, format_signature(&self.params))
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("title", &self.title)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub struct PageDescriptor {
    pub title: String,
    pub page_type: Arc<dyn PageType>,
    pub(crate) elements: HashMap<String, Arc<ElementDescriptor>>,
    pub(crate) actions: HashMap<String, Vec<Arc<ActionDescriptor>>>,
}

impl PageDescriptor {
    pub fn element(&self, title: &str) -> Result<&Arc<ElementDescriptor>, RegistryError> {
        self.elements.get(title).ok_or_else(|| {
            metrics::record_lookup_miss(EntityKind::Element);
            RegistryError::element_not_found(&self.title, title)
        })
    }

    pub fn element_ref(&self, title: &str) -> Result<ElementRef, RegistryError> {
        let element = self.element(title)?;
        Ok(ElementRef::new(
            self.title.clone(),
            element.title.clone(),
            element.locator.clone(),
        ))
    }

    /// Overload set for `title` in declaration order; empty when the title is unknown.
    pub fn actions(&self, title: &str) -> &[Arc<ActionDescriptor>] {
        self.actions.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn element_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        titles.sort_unstable();
        titles
    }

    pub fn action_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        titles.sort_unstable();
        titles
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for PageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDescriptor")
            .field("title", &self.title)
            .field("elements", &self.element_titles())
            .field("actions", &self.action_titles())
            .finish_non_exhaustive()
    }
}
