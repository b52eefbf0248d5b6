//! Command-line interface for the P-Code processor

pub mod args;
pub mod commands;

pub use args::Args;
