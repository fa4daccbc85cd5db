use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use step_fragments::{Expansion, FragmentLibrary, FragmentRedirector};

use super::output::{print_structured, OutputFormat};
use pagefactory::PageFactoryConfig;

#[derive(Args, Clone, Debug)]
pub struct ExpandArgs {
    /// Step text, e.g. `user inserts fragment "login as admin"`
    pub step: String,

    /// Fragments file (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub fragments: Option<PathBuf>,
}

#[derive(Serialize)]
struct ExpandOutput {
    step: String,
    fragment: bool,
    steps: Vec<String>,
}

pub fn cmd_expand(args: ExpandArgs, config: PageFactoryConfig, output: OutputFormat) -> Result<()> {
    let path = args
        .fragments
        .or(config.fragments.path)
        .context("No fragments file configured (set `fragments.path` or pass --fragments)")?;
    let library = FragmentLibrary::load(&path)?;
    let redirector = FragmentRedirector::new(std::sync::Arc::new(library))
        .with_max_depth(config.fragments.max_depth);

    let result = match redirector.expand(&args.step)? {
        Expansion::NotAFragment => ExpandOutput {
            fragment: false,
            steps: vec![args.step.clone()],
            step: args.step,
        },
        Expansion::Steps(steps) => ExpandOutput {
            fragment: true,
            steps,
            step: args.step,
        },
    };

    if !print_structured(output, &result)? {
        for step in &result.steps {
            println!("{}", step);
        }
    }
    Ok(())
}
