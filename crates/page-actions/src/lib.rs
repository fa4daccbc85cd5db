//! Action/Check facade
//!
//! Thin pass-through surface the dispatch layer calls once an element has been
//! resolved:
//! - fill, click, press, select, set-checkbox effects
//! - equality and emptiness checks
//! - session slot holding the external driver adapter
//!
//! The facade performs no title resolution of its own.

pub mod driver;
pub mod errors;
mod facade;
pub mod recording;
mod session;
pub mod types;

pub use driver::PageDriver;
pub use errors::*;
pub use facade::PageFacade;
pub use recording::{DriverCall, RecordingDriver};
pub use session::SessionSlot;
pub use types::*;
