use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_PATTERN: &str =
    r#"^\s*(?:(?i:user|he)\s+)?(?:\(\s*)?inserts fragment\s+"(?P<name>[^"]+)"(?:\s*\))?\s*$"#;

static DEFAULT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_PATTERN).unwrap());

/// Step text classified as either a fragment reference or an ordinary step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRef {
    Fragment(String),
    Step(String),
}

impl StepRef {
    pub fn is_fragment(&self) -> bool {
        matches!(self, StepRef::Fragment(_))
    }
}

/// Recognises fragment steps. Custom patterns must capture the fragment
/// name in a group called `name`.
#[derive(Debug, Clone)]
pub struct FragmentMarker {
    pattern: Regex,
}

impl FragmentMarker {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        if !pattern.capture_names().any(|n| n == Some("name")) {
            return Err(regex::Error::Syntax(
                "fragment marker needs a `name` capture group".to_string(),
            ));
        }
        Ok(Self { pattern })
    }

    pub fn classify(&self, step: &str) -> StepRef {
        match self.fragment_name(step) {
            Some(name) => StepRef::Fragment(name),
            None => StepRef::Step(step.to_string()),
        }
    }

    pub fn fragment_name(&self, step: &str) -> Option<String> {
        self.pattern
            .captures(step)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str().trim().to_string())
    }
}

impl Default for FragmentMarker {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_MARKER.clone(),
        }
    }
}
