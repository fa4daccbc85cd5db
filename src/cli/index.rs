use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::output::{print_structured, OutputFormat};
use pagefactory::{recording_factory, Environment, PageFactoryConfig};
use pagefactory_core_types::format_signature;

#[derive(Args, Clone, Debug)]
pub struct IndexArgs {
    /// Pages file (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub pages: Option<PathBuf>,
}

#[derive(Serialize)]
struct PageSummary {
    title: String,
    elements: Vec<String>,
    actions: Vec<String>,
}

#[derive(Serialize)]
struct IndexSummary {
    pages: Vec<PageSummary>,
    conflicts: Vec<String>,
}

pub fn cmd_index(
    args: IndexArgs,
    mut config: PageFactoryConfig,
    output: OutputFormat,
) -> Result<()> {
    if args.pages.is_some() {
        config.pages = args.pages;
    }
    let env = Environment::from_config(&config, recording_factory())?;
    let registry = env.registry();

    let pages = registry
        .page_titles()
        .into_iter()
        .filter_map(|title| registry.resolve_page(title).ok())
        .map(|page| PageSummary {
            title: page.title.clone(),
            elements: page.element_titles().into_iter().map(str::to_string).collect(),
            actions: page
                .action_titles()
                .into_iter()
                .flat_map(|title| page.actions(title).iter().map(|action| action.signature()))
                .collect(),
        })
        .collect();
    let conflicts = registry
        .conflicting_overloads()
        .iter()
        .map(|conflict| {
            format!(
                "{}: {} declared {} times on '{}'",
                conflict.title,
                format_signature(&conflict.params),
                conflict.count,
                conflict.page
            )
        })
        .collect();
    let summary = IndexSummary { pages, conflicts };

    if print_structured(output, &summary)? {
        return Ok(());
    }
    for page in &summary.pages {
        println!("{}", page.title);
        for element in &page.elements {
            println!("  element  {}", element);
        }
        for action in &page.actions {
            println!("  action   {}", action);
        }
    }
    for conflict in &summary.conflicts {
        println!("warning: {}", conflict);
    }
    Ok(())
}
