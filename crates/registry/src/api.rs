//! Descriptor-table input
//!
//! A [`PageDefinition`] is the `(title, kind, handle, arity, parameter kinds)`
//! metadata for one page, however the surrounding page-object layer produced
//! it. [`PageSource`] lets that layer hand over any number of them.

use std::sync::Arc;

use page_actions::Locator;
use pagefactory_core_types::ArgKind;

use crate::model::{ActionHandler, PageType};

#[derive(Clone)]
pub struct ActionDefinition {
    pub title: String,
    pub params: Vec<ArgKind>,
    pub handler: Arc<dyn ActionHandler>,
}

#[derive(Clone)]
pub struct PageDefinition {
    pub title: String,
    pub page_type: Arc<dyn PageType>,
    pub elements: Vec<(String, Locator)>,
    pub actions: Vec<ActionDefinition>,
}

impl PageDefinition {
    pub fn new(title: impl Into<String>, page_type: Arc<dyn PageType>) -> Self {
        Self {
            title: title.into(),
            page_type,
            elements: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn element(mut self, title: impl Into<String>, locator: Locator) -> Self {
        self.elements.push((title.into(), locator));
        self
    }

    pub fn action(
        mut self,
        title: impl Into<String>,
        params: &[ArgKind],
        handler: Arc<dyn ActionHandler>,
    ) -> Self {
        self.actions.push(ActionDefinition {
            title: title.into(),
            params: params.to_vec(),
            handler,
        });
        self
    }
}

/// Anything that can enumerate page definitions.
pub trait PageSource: Send + Sync {
    fn pages(&self) -> Vec<PageDefinition>;
}

impl PageSource for Vec<PageDefinition> {
    fn pages(&self) -> Vec<PageDefinition> {
        self.clone()
    }
}
