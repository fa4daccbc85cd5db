//! Page context
//!
//! Tracks the single "current page" of each running scenario and opens pages
//! by title. Nothing here is process-global: every scenario owns a
//! [`ScenarioState`], and the page cache and driver session are shared between
//! scenarios only when the caller hands the same instances to both.

mod cache;
mod context;
pub mod errors;
mod manager;
mod scenario;

pub use cache::PageCache;
pub use context::{PageContext, PageInstance};
pub use errors::ContextError;
pub use manager::PageManager;
pub use scenario::{ScenarioLock, ScenarioState};
