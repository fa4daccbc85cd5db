use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::FragmentError;
use crate::library::FragmentSource;
use crate::marker::{FragmentMarker, StepRef};

pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Result of expanding one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    NotAFragment,
    /// Fully expanded steps; none of them is a fragment reference.
    Steps(Vec<String>),
}

/// Replaces fragment steps by the steps of the named fragment, recursively.
#[derive(Clone)]
pub struct FragmentRedirector {
    source: Arc<dyn FragmentSource>,
    marker: FragmentMarker,
    max_depth: usize,
}

impl FragmentRedirector {
    pub fn new(source: Arc<dyn FragmentSource>) -> Self {
        Self {
            source,
            marker: FragmentMarker::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_marker(mut self, marker: FragmentMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Nesting levels allowed before expansion is treated as non-terminating.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn marker(&self) -> &FragmentMarker {
        &self.marker
    }

    pub fn expand(&self, step: &str) -> Result<Expansion, FragmentError> {
        match self.marker.classify(step) {
            StepRef::Step(_) => Ok(Expansion::NotAFragment),
            StepRef::Fragment(name) => {
                let mut chain = Vec::new();
                let steps = self.expand_named(&name, &mut chain)?;
                debug!(fragment = %name, steps = steps.len(), "fragment expanded");
                Ok(Expansion::Steps(steps))
            }
        }
    }

    /// Expand every fragment step of a scenario, keeping ordinary steps in place.
    pub fn expand_all<S: AsRef<str>>(&self, steps: &[S]) -> Result<Vec<String>, FragmentError> {
        let mut expanded = Vec::with_capacity(steps.len());
        for step in steps {
            let step = step.as_ref();
            match self.expand(step)? {
                Expansion::NotAFragment => expanded.push(step.to_string()),
                Expansion::Steps(steps) => expanded.extend(steps),
            }
        }
        Ok(expanded)
    }

    fn expand_named(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<Vec<String>, FragmentError> {
        if chain.iter().any(|active| active == name) || chain.len() >= self.max_depth {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            warn!(
                fragment = %name,
                chain = %cycle.join(" -> "),
                "fragment expansion does not terminate"
            );
            return Err(FragmentError::Cycle {
                name: name.to_string(),
                depth: chain.len(),
                chain: cycle,
            });
        }

        let definition = self
            .source
            .fragment(name)
            .ok_or_else(|| FragmentError::NotFound {
                name: name.to_string(),
            })?;

        chain.push(name.to_string());
        let mut steps = Vec::with_capacity(definition.steps.len());
        for step in &definition.steps {
            match self.marker.classify(step) {
                StepRef::Fragment(inner) => steps.extend(self.expand_named(&inner, chain)?),
                StepRef::Step(text) => steps.push(text),
            }
        }
        chain.pop();
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{FragmentDefinition, FragmentLibrary};

    fn redirector(defs: Vec<FragmentDefinition>) -> FragmentRedirector {
        FragmentRedirector::new(Arc::new(FragmentLibrary::from_definitions(defs).unwrap()))
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let r = redirector(vec![FragmentDefinition::new(
            "loop",
            [r#"user inserts fragment "loop""#],
        )]);
        let err = r.expand(r#"user inserts fragment "loop""#).unwrap_err();
        assert_eq!(
            err,
            FragmentError::Cycle {
                name: "loop".into(),
                depth: 1,
                chain: vec!["loop".into(), "loop".into()],
            }
        );
    }

    #[test]
    fn depth_bound_applies_without_a_repeat() {
        let defs = (0..4)
            .map(|i| {
                FragmentDefinition::new(
                    format!("f{i}"),
                    [format!(r#"user inserts fragment "f{}""#, i + 1)],
                )
            })
            .chain(std::iter::once(FragmentDefinition::new("f4", ["done"])))
            .collect();
        let r = redirector(defs);

        assert_eq!(
            r.expand(r#"user inserts fragment "f0""#).unwrap(),
            Expansion::Steps(vec!["done".into()])
        );
        let shallow = r.clone().with_max_depth(3);
        assert!(matches!(
            shallow.expand(r#"user inserts fragment "f0""#),
            Err(FragmentError::Cycle { depth: 3, .. })
        ));
    }
}
