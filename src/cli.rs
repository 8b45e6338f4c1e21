//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use asset_preview::TokenExtraction;
use clap::Parser;

/// Download the preview images of an asset store product.
///
/// Lists the product's assets, keeps the image files, resolves each one's
/// thumbnail and writes it to `<output-dir>/<product-id>/<guid>.<extension>`.
/// Files that already exist are skipped, so interrupted runs can be resumed.
///
/// Options left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "asset-preview")]
#[command(author, version, about)]
pub struct Args {
    /// Product whose preview images are downloaded (or `product_id` in the config file)
    pub product_id: Option<String>,

    /// Image extension to select, case-insensitive [default: png]
    #[arg(short = 'e', long)]
    pub extension: Option<String>,

    /// Directory under which `<product-id>/` is created [default: content]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum requests started per second across the whole run (0 to disable, max 10000) [default: 150]
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u32).range(0..=10_000))]
    pub rate_limit: Option<u32>,

    /// Site root for the bootstrap request and the API [default: https://assetstore.unity.com]
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scheme prefixed to scheme-relative thumbnail URLs [default: https]
    #[arg(long, value_parser = ["http", "https"])]
    pub thumbnail_scheme: Option<String>,

    /// How the anti-forgery token is read: `cookie`, `cookie:<name>` or `offset` [default: cookie]
    #[arg(long)]
    pub token_extraction: Option<TokenExtraction>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not show the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}
