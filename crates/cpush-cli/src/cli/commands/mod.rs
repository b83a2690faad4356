//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod man;
mod probe;
mod send;

pub use completions::run_completions;
pub use config::run_config;
pub use man::run_man;
pub use probe::run_probe;
pub use send::run_send;
