// tlapse-cli/src/lib.rs
//
// Library portion of the tlapse CLI application.
// Contains argument definitions, logging setup and command logic.

pub mod cli;
pub mod commands;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::create::{exit_status, run_create};
