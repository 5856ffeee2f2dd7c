//! Command implementations for the CLI.

/// Builds the timelapse for one date.
pub mod create;
