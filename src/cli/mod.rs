//! CLI module - command handlers for the `crashprobe` binary

pub mod commands;

pub use commands::{init_config, run_native_crash, show_config, summary};
