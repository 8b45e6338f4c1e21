//! Binary-side application wiring: config, terminal, progress UI, exit codes.

pub(crate) mod config;
pub(crate) mod exit_handler;
pub(crate) mod progress_manager;
pub(crate) mod runtime;
pub(crate) mod terminal;
