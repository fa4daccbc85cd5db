//! Error types for driver adapters and the facade

use crate::types::Operation;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure category reported by a driver adapter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverErrorKind {
    /// Element could not be found on the page
    Missing,
    /// Element was found earlier but is no longer attached
    Stale,
    /// Element is present but hidden, disabled or obscured
    NotInteractable,
    /// The driver's own explicit wait ran out
    Timeout,
    /// Transport or protocol failure talking to the driver
    Io,
}

impl DriverErrorKind {
    /// Whether a driver-side retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverErrorKind::Stale | DriverErrorKind::Timeout)
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DriverErrorKind::Missing => "element missing",
            DriverErrorKind::Stale => "element stale",
            DriverErrorKind::NotInteractable => "element not interactable",
            DriverErrorKind::Timeout => "timed out",
            DriverErrorKind::Io => "driver i/o",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone)]
#[error("{kind}: {message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Missing, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Io, message)
    }
}

/// Facade-level interaction failure
#[derive(Debug, Error, Clone)]
pub enum InteractionError {
    /// The driver could not perform the operation on the element
    #[error("cannot {operation} {element}: {kind} ({reason})")]
    PageInteraction {
        element: String,
        operation: Operation,
        kind: DriverErrorKind,
        reason: String,
    },

    /// No driver session has been installed for this scenario
    #[error("no driver session is active")]
    NoSession,
}

impl InteractionError {
    pub(crate) fn from_driver(element: String, operation: Operation, err: DriverError) -> Self {
        InteractionError::PageInteraction {
            element,
            operation,
            kind: err.kind,
            reason: err.message,
        }
    }
}
