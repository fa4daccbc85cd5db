//! Entity registry
//!
//! Indexes pages by title, and within each page its elements and action
//! overload sets. Built once from [`PageDefinition`]s and read-only afterwards,
//! so one [`RegistryIndex`] is shared by every concurrently running scenario.

pub mod api;
pub mod errors;
pub mod index;
pub mod metrics;
pub mod model;

pub use api::{ActionDefinition, PageDefinition, PageSource};
pub use errors::{EntityKind, RegistryError};
pub use index::{OverloadConflict, RegistryIndex};
pub use model::{
    ActionDescriptor, ActionHandler, ActionScope, DeclaredPage, ElementDescriptor, FnAction,
    PageDescriptor, PageType,
};
