//! Maps free step text to generic steps.
//!
//! Every pattern accepts an optional leading `user`/`he` keyword. Quoted
//! values are captured verbatim. Fragment steps are recognised by the same
//! marker the redirector uses, ahead of every other pattern.

use once_cell::sync::Lazy;
use pagefactory_core_types::StepArg;
use pagefactory_page_context::ScenarioState;
use regex::Regex;
use step_fragments::FragmentMarker;
use tracing::debug;

use super::generic::GenericSteps;
use crate::errors::StepError;

const KEYWORD: &str = r"^\s*(?:(?i:user|he)\s+)?";
const QUOTED: &str = r#""([^"]*)""#;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    OpenPage,
    Action,
    Fill,
    Click,
    PressKey,
    PressKeyOn,
    Select,
    SetCheckbox,
    CheckEqual,
    CheckNotEqual,
    CheckNotEmpty,
    CheckEmpty,
    ElementFocused,
    InsertFragment,
}

static ROUTES: Lazy<Vec<(Route, Regex)>> = Lazy::new(|| {
    let q = QUOTED;
    [
        (Route::OpenPage, format!(r"is on the page {q}")),
        (
            Route::Action,
            format!(r#"\(([^)]+)\)((?:\s+"[^"]*"){{0,3}})"#),
        ),
        (Route::Fill, format!(r"fills the field {q} (?:with )?{q}")),
        (Route::Click, format!(r"clicks the (?:button|link|element) {q}")),
        (Route::PressKeyOn, format!(r"presses the key {q} on the element {q}")),
        (Route::PressKey, format!(r"presses the key {q}")),
        (Route::Select, format!(r"selects in {q} the value {q}")),
        (Route::SetCheckbox, format!(r"selects the checkbox {q}")),
        (
            Route::CheckNotEqual,
            format!(r"checks value of the element {q} is not equal to {q}"),
        ),
        (
            Route::CheckEqual,
            format!(r"checks value of the element {q} is equal to {q}"),
        ),
        (Route::CheckNotEmpty, format!(r"checks that the field {q} is not empty")),
        (Route::CheckEmpty, format!(r"checks that the field {q} is empty")),
        (Route::ElementFocused, format!(r"checks that the element {q} is focused")),
        (Route::InsertFragment, format!(r"inserts fragment {q}")),
    ]
    .into_iter()
    .map(|(route, body)| (route, Regex::new(&format!(r"{KEYWORD}{body}\s*$")).unwrap()))
    .collect()
});

static QUOTED_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(QUOTED).unwrap());

/// A step text matched to a route, with its captured values in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutedStep {
    pub route: Route,
    pub values: Vec<String>,
}

#[derive(Clone)]
pub struct StepRouter {
    steps: GenericSteps,
    marker: FragmentMarker,
}

impl StepRouter {
    pub fn new(steps: GenericSteps) -> Self {
        Self {
            steps,
            marker: FragmentMarker::default(),
        }
    }

    /// Use the fragment marker of the redirector that expands scenarios.
    pub fn with_marker(mut self, marker: FragmentMarker) -> Self {
        self.marker = marker;
        self
    }

    pub fn steps(&self) -> &GenericSteps {
        &self.steps
    }

    pub fn route(&self, text: &str) -> Result<RoutedStep, StepError> {
        Self::classify(&self.marker, text)
    }

    /// Match step text against `marker`, then the known patterns.
    pub fn classify(marker: &FragmentMarker, text: &str) -> Result<RoutedStep, StepError> {
        if let Some(name) = marker.fragment_name(text) {
            return Ok(RoutedStep {
                route: Route::InsertFragment,
                values: vec![name],
            });
        }
        for (route, pattern) in ROUTES.iter() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let values = if *route == Route::Action {
                let mut values = vec![caps[1].trim().to_string()];
                values.extend(
                    QUOTED_VALUE
                        .captures_iter(&caps[2])
                        .map(|param| param[1].to_string()),
                );
                values
            } else {
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect()
            };
            return Ok(RoutedStep {
                route: *route,
                values,
            });
        }
        Err(StepError::UndefinedStep(text.to_string()))
    }

    /// Run one step. A list or table `attachment` is only accepted by action steps,
    /// where it follows the quoted scalars.
    pub async fn execute(
        &self,
        scenario: &ScenarioState,
        text: &str,
        attachment: Option<StepArg>,
    ) -> Result<(), StepError> {
        let RoutedStep { route, values } = self.route(text)?;
        debug!(scenario = %scenario.id(), ?route, "executing step");
        if attachment.is_some() && !matches!(route, Route::Action | Route::InsertFragment) {
            return Err(StepError::UndefinedStep(text.to_string()));
        }

        let steps = &self.steps;
        let v = |idx: usize| values[idx].as_str();
        match route {
            Route::OpenPage => steps.open_page(scenario, v(0)).await,
            Route::Action => {
                let mut args: Vec<StepArg> =
                    values[1..].iter().cloned().map(StepArg::Scalar).collect();
                args.extend(attachment);
                steps.user_action(scenario, v(0), &args).await
            }
            Route::Fill => steps.fill(scenario, v(0), v(1)).await,
            Route::Click => steps.click(scenario, v(0)).await,
            Route::PressKey => steps.press_key(scenario, v(0)).await,
            Route::PressKeyOn => steps.press_key_on(scenario, v(0), v(1)).await,
            Route::Select => steps.select(scenario, v(0), v(1)).await,
            Route::SetCheckbox => steps.set_checkbox(scenario, v(0)).await,
            Route::CheckEqual => steps.check_value_is_equal(scenario, v(0), v(1)).await,
            Route::CheckNotEqual => steps.check_value_is_not_equal(scenario, v(0), v(1)).await,
            Route::CheckNotEmpty => steps.check_not_empty(scenario, v(0)).await,
            Route::CheckEmpty => steps.check_empty(scenario, v(0)).await,
            Route::ElementFocused => steps.is_element_focused(v(0)),
            Route::InsertFragment => steps.user_inserts_fragment(v(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed(text: &str) -> RoutedStep {
        StepRouter::classify(&FragmentMarker::default(), text).unwrap()
    }

    #[test]
    fn keyword_is_optional() {
        for text in [
            r#"user is on the page "Login""#,
            r#"He is on the page "Login""#,
            r#"is on the page "Login""#,
        ] {
            assert_eq!(
                routed(text),
                RoutedStep {
                    route: Route::OpenPage,
                    values: vec!["Login".into()]
                }
            );
        }
    }

    #[test]
    fn action_captures_title_and_up_to_three_scalars() {
        assert_eq!(routed("user (submit)").values, vec!["submit"]);
        assert_eq!(
            routed(r#"user (log in as) "admin" "secret""#).values,
            vec!["log in as", "admin", "secret"]
        );
        let marker = FragmentMarker::default();
        assert!(StepRouter::classify(&marker, r#"user (x) "1" "2" "3" "4""#).is_err());
    }

    #[test]
    fn negated_checks_are_not_swallowed() {
        assert_eq!(
            routed(r#"user checks value of the element "Username" is not equal to "x""#).route,
            Route::CheckNotEqual
        );
        assert_eq!(
            routed(r#"user checks that the field "Username" is not empty"#).route,
            Route::CheckNotEmpty
        );
        assert_eq!(
            routed(r#"user presses the key "Enter" on the element "Username""#).values,
            vec!["Enter", "Username"]
        );
    }

    #[test]
    fn unknown_text_is_undefined() {
        let err = StepRouter::classify(&FragmentMarker::default(), "user dances").unwrap_err();
        assert_eq!(err.kind(), "undefined_step");
    }

    #[test]
    fn fragment_forms_win_over_action_pattern() {
        for text in [
            r#"user inserts fragment "login as admin""#,
            r#"user (inserts fragment "login as admin")"#,
        ] {
            assert_eq!(
                routed(text),
                RoutedStep {
                    route: Route::InsertFragment,
                    values: vec!["login as admin".into()]
                },
                "{text}"
            );
        }
    }
}
