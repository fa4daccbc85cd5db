//! Facade implementation
//!
//! Every operation takes an already-resolved [`ElementRef`], forwards it to the
//! driver and translates driver failures into [`InteractionError`]. Nothing is
//! retried here.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::driver::PageDriver;
use crate::errors::{DriverError, InteractionError};
use crate::types::{ElementRef, Operation};

#[derive(Clone)]
pub struct PageFacade {
    driver: Arc<dyn PageDriver>,
}

impl PageFacade {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    pub async fn navigate(&self, url: &str) -> Result<(), InteractionError> {
        run(Operation::Navigate, url.to_string(), self.driver.navigate(url)).await
    }

    pub async fn fill(&self, element: &ElementRef, text: &str) -> Result<(), InteractionError> {
        run(
            Operation::Fill,
            element.to_string(),
            self.driver.fill(element, text),
        )
        .await
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), InteractionError> {
        run(Operation::Click, element.to_string(), self.driver.click(element)).await
    }

    /// Press `key` with focus on `element`, or on whatever holds focus when `None`.
    pub async fn press(
        &self,
        element: Option<&ElementRef>,
        key: &str,
    ) -> Result<(), InteractionError> {
        let label = element
            .map(ElementRef::to_string)
            .unwrap_or_else(|| "focused element".to_string());
        run(Operation::Press, label, self.driver.press(element, key)).await
    }

    pub async fn select(&self, element: &ElementRef, option: &str) -> Result<(), InteractionError> {
        run(
            Operation::Select,
            element.to_string(),
            self.driver.select(element, option),
        )
        .await
    }

    pub async fn set_checkbox(
        &self,
        element: &ElementRef,
        checked: bool,
    ) -> Result<(), InteractionError> {
        run(
            Operation::SetCheckbox,
            element.to_string(),
            self.driver.set_checkbox(element, checked),
        )
        .await
    }

    pub async fn check_equality(
        &self,
        element: &ElementRef,
        text: &str,
    ) -> Result<bool, InteractionError> {
        let value = self.read_value(element).await?;
        Ok(value == text)
    }

    /// Whitespace-only values count as empty.
    pub async fn check_emptiness(&self, element: &ElementRef) -> Result<bool, InteractionError> {
        let value = self.read_value(element).await?;
        Ok(value.trim().is_empty())
    }

    pub async fn dismiss_alert(&self) -> Result<bool, InteractionError> {
        run(
            Operation::DismissAlert,
            "alert".to_string(),
            self.driver.dismiss_alert(),
        )
        .await
    }

    async fn read_value(&self, element: &ElementRef) -> Result<String, InteractionError> {
        run(
            Operation::ReadValue,
            element.to_string(),
            self.driver.read_value(element),
        )
        .await
    }
}

async fn run<T, F>(operation: Operation, target: String, fut: F) -> Result<T, InteractionError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    let started = Instant::now();
    match fut.await {
        Ok(value) => {
            debug!(
                operation = %operation,
                target = %target,
                latency_ms = started.elapsed().as_millis() as u64,
                "facade operation completed"
            );
            Ok(value)
        }
        Err(err) => {
            warn!(
                operation = %operation,
                target = %target,
                transient = err.kind.is_transient(),
                "facade operation failed: {}",
                err
            );
            Err(InteractionError::from_driver(target, operation, err))
        }
    }
}
