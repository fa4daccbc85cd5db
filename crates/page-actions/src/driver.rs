//! Driver adapter interface
//!
//! The concrete UI driver (browser, mobile, desktop) lives outside this
//! workspace. Adapters implement [`PageDriver`] and own their retry and
//! explicit-wait policy; every failure surfaces as a [`DriverError`].

use async_trait::async_trait;

use crate::errors::DriverError;
use crate::types::ElementRef;

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Replace the element's value with `text`
    async fn fill(&self, element: &ElementRef, text: &str) -> Result<(), DriverError>;

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError>;

    /// Press a named key, focused on `element` when given
    async fn press(&self, element: Option<&ElementRef>, key: &str) -> Result<(), DriverError>;

    async fn select(&self, element: &ElementRef, option: &str) -> Result<(), DriverError>;

    async fn set_checkbox(&self, element: &ElementRef, checked: bool) -> Result<(), DriverError>;

    /// Current value (or visible text) of the element
    async fn read_value(&self, element: &ElementRef) -> Result<String, DriverError>;

    /// Dismiss an open alert dialog. Returns whether one was open.
    async fn dismiss_alert(&self) -> Result<bool, DriverError>;
}
