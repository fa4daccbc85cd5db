//! In-memory driver
//!
//! Records every call and keeps element values keyed by locator, so scenarios
//! can be dry-run and asserted on without a real UI. Failures can be scripted
//! per locator or per URL.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

use crate::driver::PageDriver;
use crate::errors::{DriverError, DriverErrorKind};
use crate::types::{ElementRef, Locator};

/// One recorded driver call. Elements are identified by title.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverCall {
    Navigate { url: String },
    Fill { element: String, text: String },
    Click { element: String },
    Press { element: Option<String>, key: String },
    Select { element: String, option: String },
    SetCheckbox { element: String, checked: bool },
    ReadValue { element: String },
    DismissAlert { open: bool },
}

#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<DriverCall>>,
    values: DashMap<Locator, String>,
    failures: DashMap<Locator, DriverErrorKind>,
    navigation_failures: DashMap<String, String>,
    pending_alerts: AtomicUsize,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an element value.
    pub fn with_value(self, locator: Locator, value: impl Into<String>) -> Self {
        self.values.insert(locator, value.into());
        self
    }

    /// Make every operation on `locator` fail with `kind`.
    pub fn fail_on(&self, locator: Locator, kind: DriverErrorKind) {
        self.failures.insert(locator, kind);
    }

    pub fn fail_navigation(&self, url: impl Into<String>, reason: impl Into<String>) {
        self.navigation_failures.insert(url.into(), reason.into());
    }

    pub fn open_alert(&self) {
        self.pending_alerts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn pending_alerts(&self) -> usize {
        self.pending_alerts.load(Ordering::SeqCst)
    }

    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.values.get(locator).map(|entry| entry.value().clone())
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().push(call);
    }

    fn guard(&self, element: &ElementRef) -> Result<(), DriverError> {
        match self.failures.get(&element.locator) {
            Some(kind) => Err(DriverError::new(
                *kind.value(),
                format!("scripted failure for {}", element.locator),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PageDriver for RecordingDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.record(DriverCall::Navigate {
            url: url.to_string(),
        });
        match self.navigation_failures.get(url) {
            Some(reason) => Err(DriverError::io(reason.value().clone())),
            None => Ok(()),
        }
    }

    async fn fill(&self, element: &ElementRef, text: &str) -> Result<(), DriverError> {
        self.record(DriverCall::Fill {
            element: element.title.clone(),
            text: text.to_string(),
        });
        self.guard(element)?;
        self.values.insert(element.locator.clone(), text.to_string());
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        self.record(DriverCall::Click {
            element: element.title.clone(),
        });
        self.guard(element)
    }

    async fn press(&self, element: Option<&ElementRef>, key: &str) -> Result<(), DriverError> {
        self.record(DriverCall::Press {
            element: element.map(|e| e.title.clone()),
            key: key.to_string(),
        });
        match element {
            Some(element) => self.guard(element),
            None => Ok(()),
        }
    }

    async fn select(&self, element: &ElementRef, option: &str) -> Result<(), DriverError> {
        self.record(DriverCall::Select {
            element: element.title.clone(),
            option: option.to_string(),
        });
        self.guard(element)?;
        self.values.insert(element.locator.clone(), option.to_string());
        Ok(())
    }

    async fn set_checkbox(&self, element: &ElementRef, checked: bool) -> Result<(), DriverError> {
        self.record(DriverCall::SetCheckbox {
            element: element.title.clone(),
            checked,
        });
        self.guard(element)?;
        self.values
            .insert(element.locator.clone(), checked.to_string());
        Ok(())
    }

    async fn read_value(&self, element: &ElementRef) -> Result<String, DriverError> {
        self.record(DriverCall::ReadValue {
            element: element.title.clone(),
        });
        self.guard(element)?;
        Ok(self.value_of(&element.locator).unwrap_or_default())
    }

    async fn dismiss_alert(&self) -> Result<bool, DriverError> {
        let open = self
            .pending_alerts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        self.record(DriverCall::DismissAlert { open });
        Ok(open)
    }
}
