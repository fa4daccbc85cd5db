//! Element handles passed to the facade

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access handle used by the driver to fetch the live UI element.
///
/// The textual form is `<strategy>:<value>` (`css:#login`, `xpath://form/input`,
/// `id:username`, `text:Submit`). A value without a known prefix is a CSS selector.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
    Text(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some(("css", value)) => Locator::Css(value.to_string()),
            Some(("xpath", value)) => Locator::XPath(value.to_string()),
            Some(("id", value)) => Locator::Id(value.to_string()),
            Some(("text", value)) => Locator::Text(value.to_string()),
            _ => Locator::Css(raw.to_string()),
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Id(_) => "id",
            Locator::Text(_) => "text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v) | Locator::XPath(v) | Locator::Id(v) | Locator::Text(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy(), self.value())
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Locator::parse(&raw)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_string()
    }
}

/// A resolved element: which page it belongs to, its title and how to reach it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct ElementRef {
    pub page: String,
    pub title: String,
    pub locator: Locator,
}

impl ElementRef {
    pub fn new(page: impl Into<String>, title: impl Into<String>, locator: Locator) -> Self {
        Self {
            page: page.into(),
            title: title.into(),
            locator,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' on page '{}'", self.title, self.page)
    }
}

/// Facade operation, used in logs and interaction errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Navigate,
    Fill,
    Click,
    Press,
    Select,
    SetCheckbox,
    ReadValue,
    DismissAlert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Navigate => "navigate",
            Operation::Fill => "fill",
            Operation::Click => "click",
            Operation::Press => "press",
            Operation::Select => "select",
            Operation::SetCheckbox => "set checkbox",
            Operation::ReadValue => "read value",
            Operation::DismissAlert => "dismiss alert",
        };
        f.write_str(label)
    }
}
