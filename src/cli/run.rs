use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use super::output::{print_structured, OutputFormat};
use pagefactory::runner::StepStatus;
use pagefactory::{
    metrics, recording_factory, run_all, Environment, PageFactoryConfig, ScenarioFile,
};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Scenario file (YAML)
    pub scenarios: PathBuf,

    /// Pages file (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub pages: Option<PathBuf>,

    /// Fragments file (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub fragments: Option<PathBuf>,

    /// Only run scenarios whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub metrics: bool,
}

pub async fn cmd_run(
    args: RunArgs,
    mut config: PageFactoryConfig,
    output: OutputFormat,
) -> Result<()> {
    if args.pages.is_some() {
        config.pages = args.pages;
    }
    if args.fragments.is_some() {
        config.fragments.path = args.fragments;
    }
    metrics::register_metrics();

    let mut scenarios = ScenarioFile::load(&args.scenarios)?.scenarios;
    if let Some(filter) = &args.filter {
        scenarios.retain(|scenario| scenario.name.contains(filter.as_str()));
    }

    let env = Arc::new(Environment::from_config(&config, recording_factory())?);
    let reports = run_all(env, scenarios).await?;

    if !print_structured(output, &reports)? {
        for report in &reports {
            let mark = if report.passed { "PASS" } else { "FAIL" };
            println!("{} {}", mark, report.name);
            for step in &report.steps {
                let status = match step.status {
                    StepStatus::Passed => "ok",
                    StepStatus::Failed => "failed",
                    StepStatus::Skipped => "skipped",
                };
                println!("  [{:<7}] {}", status, step.text);
                if let Some(error) = &step.error {
                    println!("            {}: {}", error.kind, error.message);
                }
            }
        }
    }
    if args.metrics {
        print!("{}", metrics::render()?);
    }

    let failed = reports.iter().filter(|report| !report.passed).count();
    if failed > 0 {
        bail!("{} of {} scenario(s) failed", failed, reports.len());
    }
    Ok(())
}
