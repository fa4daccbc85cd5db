use clap::Subcommand;

use super::expand::ExpandArgs;
use super::index::IndexArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Build the page registry and list every page, element and action
    Index(IndexArgs),

    /// Show the steps a fragment step expands to
    Expand(ExpandArgs),

    /// Dry-run scenarios against the in-memory driver
    Run(RunArgs),
}
