use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("fragment '{name}' not found")]
    NotFound { name: String },

    /// A fragment step reached execution without being replaced.
    #[error("fragment step '{name}' must be replaced before execution, but it was not")]
    NotExpanded { name: String },

    #[error("fragment '{name}' does not terminate after {depth} levels: {}", chain.join(" -> "))]
    Cycle {
        name: String,
        depth: usize,
        chain: Vec<String>,
    },

    #[error("duplicate fragment '{name}'")]
    Duplicate { name: String },

    #[error("invalid fragment file: {0}")]
    Invalid(String),

    #[error("io error: {0}")]
    Io(String),
}

impl FragmentError {
    pub fn name(&self) -> &str {
        match self {
            FragmentError::NotFound { name }
            | FragmentError::NotExpanded { name }
            | FragmentError::Cycle { name, .. }
            | FragmentError::Duplicate { name } => name,
            FragmentError::Invalid(_) | FragmentError::Io(_) => "",
        }
    }
}
