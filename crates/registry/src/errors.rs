use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Page,
    Element,
    Action,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Page => "page",
            EntityKind::Element => "element",
            EntityKind::Action => "action",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} '{title}' not found{}", on_page(.page))]
    NotFound {
        kind: EntityKind,
        title: String,
        page: Option<String>,
    },
    #[error("ambiguous {kind} title '{title}'{}", on_page(.page))]
    AmbiguousTitle {
        kind: EntityKind,
        title: String,
        page: Option<String>,
    },
}

impl RegistryError {
    pub fn title(&self) -> &str {
        match self {
            RegistryError::NotFound { title, .. } | RegistryError::AmbiguousTitle { title, .. } => {
                title
            }
        }
    }

    pub(crate) fn page_not_found(title: &str) -> Self {
        RegistryError::NotFound {
            kind: EntityKind::Page,
            title: title.to_string(),
            page: None,
        }
    }

    pub(crate) fn element_not_found(page: &str, title: &str) -> Self {
        RegistryError::NotFound {
            kind: EntityKind::Element,
            title: title.to_string(),
            page: Some(page.to_string()),
        }
    }
}

fn on_page(page: &Option<String>) -> String {
    match page {
        Some(page) => format!(" on page '{}'", page),
        None => String::new(),
    }
}
