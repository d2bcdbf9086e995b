//! CLI command handlers, one file per command.

mod config;
mod resolve;
mod run;

pub use config::run_config;
pub use resolve::run_resolve;
pub use run::{run_batch, RunArgs};
