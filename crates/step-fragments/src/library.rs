use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FragmentError;

/// A named, ordered sequence of step texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentDefinition {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl FragmentDefinition {
    pub fn new<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Supplies fragment definitions by name.
pub trait FragmentSource: Send + Sync {
    fn fragment(&self, name: &str) -> Option<&FragmentDefinition>;
}

#[derive(Debug, Default, Deserialize)]
struct FragmentFile {
    #[serde(default)]
    fragments: Vec<FragmentDefinition>,
}

/// In-memory fragment store.
#[derive(Debug, Default, Clone)]
pub struct FragmentLibrary {
    fragments: HashMap<String, FragmentDefinition>,
}

impl FragmentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = FragmentDefinition>,
    ) -> Result<Self, FragmentError> {
        let mut library = Self::new();
        for definition in definitions {
            library.insert(definition)?;
        }
        Ok(library)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, FragmentError> {
        let file: FragmentFile = serde_yaml::from_str(content)
            .map_err(|err| FragmentError::Invalid(format!("{}", err)))?;
        Self::from_definitions(file.fragments)
    }

    pub fn load(path: &Path) -> Result<Self, FragmentError> {
        let content = fs::read_to_string(path)
            .map_err(|err| FragmentError::Io(format!("{}: {}", path.display(), err)))?;
        let library = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), fragments = library.len(), "loaded fragments");
        Ok(library)
    }

    pub fn insert(&mut self, definition: FragmentDefinition) -> Result<(), FragmentError> {
        if self.fragments.contains_key(&definition.name) {
            return Err(FragmentError::Duplicate {
                name: definition.name,
            });
        }
        self.fragments.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fragments.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FragmentSource for FragmentLibrary {
    fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments.get(name)
    }
}
