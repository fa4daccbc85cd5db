//! PageFactory
//!
//! Step glue, declarative pages, scenario runner and configuration around the
//! title dispatch engine crates.

pub mod config;
pub mod environment;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod pages;
pub mod runner;
pub mod setup;
pub mod steps;
pub mod tasks;

pub use config::{load_config, LoadedConfig, PageFactoryConfig};
pub use environment::{recording_factory, Environment};
pub use errors::StepError;
pub use runner::{run_all, run_scenario, ScenarioFile, ScenarioReport, ScenarioSpec, StepSpec};
pub use steps::{GenericSteps, StepRouter};
