pub mod app;
pub mod commands;
pub mod dispatch;
pub mod env;
pub mod expand;
pub mod index;
pub mod output;
pub mod run;
