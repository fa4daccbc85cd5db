//! Fragment steps: named step sequences substituted into a scenario before it runs.

pub mod errors;
pub mod library;
pub mod marker;
pub mod redirector;

pub use errors::FragmentError;
pub use library::{FragmentDefinition, FragmentLibrary, FragmentSource};
pub use marker::{FragmentMarker, StepRef};
pub use redirector::{Expansion, FragmentRedirector, DEFAULT_MAX_DEPTH};
