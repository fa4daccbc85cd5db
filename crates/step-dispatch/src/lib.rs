//! Dispatch engine
//!
//! Resolves an action title against the current page's overload set, keeps the
//! overloads whose arity and parameter kinds match the supplied arguments, and
//! invokes the single survivor. No match and several matches are both errors;
//! the engine never guesses.

pub mod engine;
pub mod errors;
pub mod metrics;

pub use engine::{select_overload, DispatchEngine};
pub use errors::DispatchError;
