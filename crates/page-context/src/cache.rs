use std::sync::Arc;

use dashmap::DashMap;

use crate::context::PageInstance;

/// Opened page instances keyed by page title, reused across steps.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: DashMap<String, Arc<PageInstance>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, title: &str) -> Option<Arc<PageInstance>> {
        self.pages.get(title).map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, page: Arc<PageInstance>) {
        self.pages.insert(page.title().to_string(), page);
    }

    pub fn clear(&self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
