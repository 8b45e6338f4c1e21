//! Top-level flow of one CLI invocation.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use asset_preview::{PipelineConfig, RunProgress, RunReport, run_pipeline};
use clap::Parser;
use tracing::{debug, info};

use super::{config, exit_handler, progress_manager, terminal};
use crate::ProcessExit;
use crate::cli::Args;

pub(crate) async fn run_app() -> Result<ProcessExit> {
    // Parse before tracing so --help works without logs
    let args = Args::parse();

    let default_level = terminal::resolve_default_log_level(args.verbose, args.quiet);
    terminal::init_tracing(default_level, terminal::no_color_env_requested());
    debug!(?args, "CLI arguments parsed");

    let loaded = config::load_config(args.config.as_deref())?;
    match (&loaded.path, loaded.config.is_some()) {
        (Some(path), true) => debug!(path = %path.display(), "loaded config file"),
        (Some(path), false) => debug!(path = %path.display(), "no config file found"),
        (None, _) => debug!("no config path could be resolved"),
    }

    let config = config::resolve_pipeline_config(&args, loaded.config.as_ref())?;
    info!(
        product_id = %config.product_id,
        extension = %config.extension,
        output_root = %config.output_root.display(),
        requests_per_second = config.requests_per_second,
        "asset-preview starting"
    );

    let progress = Arc::new(RunProgress::new());
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&progress));

    let result = run_pipeline(&config, Arc::clone(&progress)).await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let report = result.with_context(|| format!("Run for product {} failed", config.product_id))?;

    if !args.quiet {
        print_completion_summary(&config, &report);
    }

    Ok(exit_handler::determine_exit_outcome(
        report.completed(),
        report.failed(),
    ))
}

fn print_completion_summary(config: &PipelineConfig, report: &RunReport) {
    let product_dir = config.output_root.join(&config.product_id);
    println!(
        "{} of {} catalog entries matched *.{}",
        report.matched, report.catalog_entries, config.extension
    );
    println!(
        "Downloaded {} ({} bytes), skipped {} existing, {} failed -> {}",
        report.completed(),
        report.bytes_written(),
        report.skipped,
        report.failed(),
        product_dir.display()
    );
    for failure in &report.failures {
        println!("  failed {}: {}", failure.guid, failure.error);
    }
}
