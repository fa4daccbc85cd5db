//! Scenario runner
//!
//! Loads scenarios from YAML, replaces fragment steps before anything runs,
//! then executes each scenario's steps in order. Scenarios run concurrently,
//! each with its own [`ScenarioState`].

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use pagefactory_core_types::{DataTable, StepArg};
use pagefactory_page_context::ScenarioState;
use serde::{Deserialize, Serialize};
use step_fragments::Expansion;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::environment::Environment;
use crate::errors::StepError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A step as written: bare text, or text with a list or table attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StepSpec {
    Text(String),
    Detailed {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<Vec<Vec<String>>>,
    },
}

impl StepSpec {
    pub fn text(&self) -> &str {
        match self {
            StepSpec::Text(text) | StepSpec::Detailed { text, .. } => text,
        }
    }

    /// A table wins over a list when both are given.
    pub fn attachment(&self) -> Option<StepArg> {
        match self {
            StepSpec::Text(_) => None,
            StepSpec::Detailed { table: Some(rows), .. } => {
                Some(StepArg::Table(DataTable::new(rows.clone())))
            }
            StepSpec::Detailed { list: Some(items), .. } => Some(StepArg::List(items.clone())),
            StepSpec::Detailed { .. } => None,
        }
    }
}

impl ScenarioFile {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse scenario file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub kind: String,
    pub title: String,
    pub message: String,
}

impl From<&StepError> for StepFailure {
    fn from(err: &StepError) -> Self {
        Self {
            kind: err.kind().to_string(),
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub text: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepFailure>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn failure(&self) -> Option<&StepFailure> {
        self.steps.iter().find_map(|step| step.error.as_ref())
    }
}

struct PlannedStep {
    text: String,
    attachment: Option<StepArg>,
}

/// Replace fragment steps by their expansion. Fails on the first step that
/// cannot be expanded, returning its index.
fn plan(env: &Environment, spec: &ScenarioSpec) -> Result<Vec<PlannedStep>, (usize, StepError)> {
    let mut planned = Vec::with_capacity(spec.steps.len());
    for (idx, step) in spec.steps.iter().enumerate() {
        match env.redirector().expand(step.text()) {
            Ok(Expansion::NotAFragment) => planned.push(PlannedStep {
                text: step.text().to_string(),
                attachment: step.attachment(),
            }),
            Ok(Expansion::Steps(steps)) => {
                if step.attachment().is_some() {
                    warn!(step = %step.text(), "attachment on a fragment step is ignored");
                }
                planned.extend(steps.into_iter().map(|text| PlannedStep {
                    text,
                    attachment: None,
                }));
            }
            Err(err) => return Err((idx, err.into())),
        }
    }
    Ok(planned)
}

fn skipped(text: &str) -> StepReport {
    StepReport {
        text: text.to_string(),
        status: StepStatus::Skipped,
        error: None,
        duration_ms: 0,
    }
}

pub async fn run_scenario(env: Arc<Environment>, spec: ScenarioSpec) -> ScenarioReport {
    let planned = match plan(&env, &spec) {
        Ok(planned) => planned,
        Err((failed_at, err)) => {
            warn!(scenario = %spec.name, "fragment expansion failed: {}", err);
            let steps = spec
                .steps
                .iter()
                .enumerate()
                .map(|(idx, step)| {
                    if idx == failed_at {
                        StepReport {
                            text: step.text().to_string(),
                            status: StepStatus::Failed,
                            error: Some(StepFailure::from(&err)),
                            duration_ms: 0,
                        }
                    } else {
                        skipped(step.text())
                    }
                })
                .collect();
            return ScenarioReport {
                name: spec.name,
                passed: false,
                steps,
            };
        }
    };

    let scenario = Arc::new(match env.shared() {
        Some(shared) => ScenarioState::with_shared(
            spec.name.clone(),
            Arc::clone(&shared.cache),
            Arc::clone(&shared.session),
            Arc::clone(&shared.lock),
        ),
        None => ScenarioState::new(spec.name.clone()),
    });
    env.setup().init_web(&scenario);
    info!(scenario = %scenario.id(), name = %spec.name, steps = planned.len(), "scenario started");

    let mut reports = Vec::with_capacity(planned.len());
    let mut failed = false;
    for step in planned {
        if failed {
            reports.push(skipped(&step.text));
            continue;
        }
        let started = Instant::now();
        let result = env
            .router()
            .execute(&scenario, &step.text, step.attachment)
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => {
                debug!(scenario = %scenario.id(), step = %step.text, "step passed");
                reports.push(StepReport {
                    text: step.text,
                    status: StepStatus::Passed,
                    error: None,
                    duration_ms,
                });
            }
            Err(err) => {
                warn!(
                    scenario = %scenario.id(),
                    step = %step.text,
                    kind = err.kind(),
                    "step failed: {}",
                    err
                );
                failed = true;
                reports.push(StepReport {
                    text: step.text,
                    status: StepStatus::Failed,
                    error: Some(StepFailure::from(&err)),
                    duration_ms,
                });
            }
        }
    }

    env.setup().dispose_web(Arc::clone(&scenario));
    env.setup().tasks().run_tasks().await;
    scenario.finish();
    info!(scenario = %scenario.id(), passed = !failed, "scenario finished");

    ScenarioReport {
        name: spec.name,
        passed: !failed,
        steps: reports,
    }
}

/// Run every scenario concurrently; reports come back in input order.
pub async fn run_all(
    env: Arc<Environment>,
    scenarios: Vec<ScenarioSpec>,
) -> Result<Vec<ScenarioReport>> {
    let mut set = JoinSet::new();
    for (idx, spec) in scenarios.into_iter().enumerate() {
        let env = Arc::clone(&env);
        set.spawn(async move { (idx, run_scenario(env, spec).await) });
    }

    let mut reports = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        reports.push(joined.context("scenario task failed")?);
    }
    reports.sort_by_key(|(idx, _)| *idx);
    Ok(reports.into_iter().map(|(_, report)| report).collect())
}
