//! Step glue shared by every project
//!
//! Each step resolves titles against the scenario's current page and hands
//! resolved elements to the facade. Check steps turn a false predicate into
//! [`StepError::Assertion`].

use std::sync::Arc;

use page_actions::{ElementRef, PageFacade};
use pagefactory_core_types::StepArg;
use pagefactory_page_context::{PageInstance, PageManager, ScenarioState};
use pagefactory_registry::RegistryIndex;
use step_dispatch::DispatchEngine;
use step_fragments::FragmentError;
use tracing::{debug, warn};

use crate::errors::StepError;

#[derive(Clone)]
pub struct GenericSteps {
    manager: PageManager,
    engine: DispatchEngine,
}

impl GenericSteps {
    pub fn new(registry: Arc<RegistryIndex>) -> Self {
        Self {
            manager: PageManager::new(Arc::clone(&registry)),
            engine: DispatchEngine::new(registry),
        }
    }

    pub fn manager(&self) -> &PageManager {
        &self.manager
    }

    pub async fn open_page(&self, scenario: &ScenarioState, title: &str) -> Result<(), StepError> {
        self.manager.open_page(scenario, title).await?;
        Ok(())
    }

    /// Invoke an action of the current page. Covers every supported shape:
    /// no arguments, up to three scalars, a table, a scalar and a table, a list.
    pub async fn user_action(
        &self,
        scenario: &ScenarioState,
        action: &str,
        args: &[StepArg],
    ) -> Result<(), StepError> {
        let page = current(scenario)?;
        let facade = scenario.facade()?;
        self.engine
            .invoke_action(&page.descriptor, action, args, &facade)
            .await?;
        Ok(())
    }

    pub async fn fill(
        &self,
        scenario: &ScenarioState,
        element: &str,
        text: &str,
    ) -> Result<(), StepError> {
        let (element, facade) = self.target(scenario, element)?;
        facade.fill(&element, text).await?;
        Ok(())
    }

    pub async fn click(&self, scenario: &ScenarioState, element: &str) -> Result<(), StepError> {
        let (element, facade) = self.target(scenario, element)?;
        facade.click(&element).await?;
        Ok(())
    }

    /// Press a key with no particular element in focus.
    pub async fn press_key(&self, scenario: &ScenarioState, key: &str) -> Result<(), StepError> {
        scenario.facade()?.press(None, key).await?;
        Ok(())
    }

    pub async fn press_key_on(
        &self,
        scenario: &ScenarioState,
        key: &str,
        element: &str,
    ) -> Result<(), StepError> {
        let (element, facade) = self.target(scenario, element)?;
        facade.press(Some(&element), key).await?;
        Ok(())
    }

    pub async fn select(
        &self,
        scenario: &ScenarioState,
        element: &str,
        option: &str,
    ) -> Result<(), StepError> {
        let (element, facade) = self.target(scenario, element)?;
        facade.select(&element, option).await?;
        Ok(())
    }

    pub async fn set_checkbox(
        &self,
        scenario: &ScenarioState,
        element: &str,
    ) -> Result<(), StepError> {
        let (element, facade) = self.target(scenario, element)?;
        facade.set_checkbox(&element, true).await?;
        Ok(())
    }

    pub async fn check_value_is_equal(
        &self,
        scenario: &ScenarioState,
        element: &str,
        text: &str,
    ) -> Result<(), StepError> {
        let (target, facade) = self.target(scenario, element)?;
        if !facade.check_equality(&target, text).await? {
            return Err(StepError::assertion(
                element,
                format!("'{}' value is not equal with '{}'", element, text),
            ));
        }
        Ok(())
    }

    pub async fn check_value_is_not_equal(
        &self,
        scenario: &ScenarioState,
        element: &str,
        text: &str,
    ) -> Result<(), StepError> {
        let (target, facade) = self.target(scenario, element)?;
        if facade.check_equality(&target, text).await? {
            return Err(StepError::assertion(
                element,
                format!("'{}' value is equal with '{}'", element, text),
            ));
        }
        Ok(())
    }

    pub async fn check_not_empty(
        &self,
        scenario: &ScenarioState,
        element: &str,
    ) -> Result<(), StepError> {
        let (target, facade) = self.target(scenario, element)?;
        if facade.check_emptiness(&target).await? {
            return Err(StepError::assertion(
                element,
                format!("'{}' value is empty", element),
            ));
        }
        Ok(())
    }

    pub async fn check_empty(
        &self,
        scenario: &ScenarioState,
        element: &str,
    ) -> Result<(), StepError> {
        let (target, facade) = self.target(scenario, element)?;
        if !facade.check_emptiness(&target).await? {
            return Err(StepError::assertion(
                element,
                format!("'{}' value is not empty", element),
            ));
        }
        Ok(())
    }

    pub fn is_element_focused(&self, element: &str) -> Result<(), StepError> {
        warn!(element = %element, "focus check is not implemented; step passes without checking");
        Ok(())
    }

    /// Fragment steps are replaced before execution; reaching this is always an error.
    pub fn user_inserts_fragment(&self, fragment: &str) -> Result<(), StepError> {
        Err(FragmentError::NotExpanded {
            name: fragment.to_string(),
        }
        .into())
    }

    fn target(
        &self,
        scenario: &ScenarioState,
        element: &str,
    ) -> Result<(ElementRef, PageFacade), StepError> {
        let page = current(scenario)?;
        let element = self.engine.resolve_element(&page.descriptor, element)?;
        debug!(scenario = %scenario.id(), element = %element, "element resolved");
        Ok((element, scenario.facade()?))
    }
}

fn current(scenario: &ScenarioState) -> Result<Arc<PageInstance>, StepError> {
    Ok(scenario.context().get_current_page()?)
}
