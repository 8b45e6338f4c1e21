//! Config file loading and merging with CLI flags.
//!
//! Precedence, lowest to highest: built-in defaults, config file, CLI flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use asset_preview::TokenExtraction;
use asset_preview::download::{is_single_path_component, normalize_extension};
use asset_preview::pipeline::{Endpoints, PipelineConfig};

use crate::cli::Args;

/// Upper bound accepted for `requests_per_second`.
const MAX_REQUESTS_PER_SECOND: u32 = 10_000;

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    pub product_id: Option<String>,
    pub extension: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub requests_per_second: Option<u32>,
    pub base_url: Option<String>,
    pub thumbnail_scheme: Option<String>,
    pub token_extraction: Option<TokenExtraction>,
}

impl FileConfig {
    /// Validates config values against the same constraints as the CLI.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(rps) = self.requests_per_second
            && rps > MAX_REQUESTS_PER_SECOND
        {
            bail!(
                "Invalid config value for `requests_per_second`: {rps}. Expected range: 0..={MAX_REQUESTS_PER_SECOND}"
            );
        }

        if let Some(extension) = self.extension.as_deref() {
            normalize_extension(extension)
                .with_context(|| format!("Invalid config value for `extension`: '{extension}'"))?;
        }

        if let Some(scheme) = self.thumbnail_scheme.as_deref() {
            validate_scheme(scheme)?;
        }

        if let Some(base_url) = self.base_url.as_deref() {
            Endpoints::from_base_url(base_url)
                .with_context(|| format!("Invalid config value for `base_url`: '{base_url}'"))?;
        }

        if let Some(product_id) = self.product_id.as_deref() {
            if product_id.trim().is_empty() {
                bail!("Invalid config value for `product_id`: must not be empty");
            }
            if !is_single_path_component(product_id.trim()) {
                bail!(
                    "Invalid config value for `product_id`: '{product_id}' must be a single path component"
                );
            }
        }

        Ok(())
    }
}

fn validate_scheme(scheme: &str) -> Result<()> {
    if !matches!(scheme, "http" | "https") {
        bail!("Invalid config value for `thumbnail_scheme`: '{scheme}'. Expected one of: http, https");
    }
    Ok(())
}

/// Where the file config came from, if anywhere.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    /// Path that was consulted, if one could be resolved.
    pub path: Option<PathBuf>,
    /// Parsed config when a file was found.
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/asset-preview/config.toml`
/// 2. `$HOME/.config/asset-preview/config.toml`
#[must_use]
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("asset-preview")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("asset-preview")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "product_id" => {
                cfg.product_id = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "extension" => {
                cfg.extension = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "requests_per_second" => {
                cfg.requests_per_second = Some(parse_integer_u32(value).with_context(invalid)?);
            }
            "base_url" => {
                cfg.base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "thumbnail_scheme" => {
                cfg.thumbnail_scheme = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "token_extraction" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                let extraction = parsed
                    .parse::<TokenExtraction>()
                    .map_err(anyhow::Error::msg)
                    .with_context(invalid)?;
                cfg.token_extraction = Some(extraction);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u32(raw_value: &str) -> Result<u32> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i64>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u32::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u32"))
}

/// Merges CLI flags over the file config over built-in defaults.
///
/// # Errors
///
/// Fails when no product id is given anywhere, when the product id is not a
/// single path component, or when the extension is not a bare extension.
pub(crate) fn resolve_pipeline_config(
    args: &Args,
    file: Option<&FileConfig>,
) -> Result<PipelineConfig> {
    let file = file.cloned().unwrap_or_default();

    let Some(product_id) = args
        .product_id
        .clone()
        .or(file.product_id)
        .filter(|id| !id.trim().is_empty())
    else {
        bail!(
            "No product id given\n  Suggestion: pass it as the first argument or set `product_id` in the config file"
        );
    };

    let product_id = product_id.trim();
    if !is_single_path_component(product_id) {
        bail!(
            "Invalid product id '{product_id}': must be a single path component\n  Suggestion: pass the numeric id from the product page URL"
        );
    }

    let mut config = PipelineConfig::new(product_id);
    if let Some(extension) = args.extension.clone().or(file.extension) {
        config.extension = normalize_extension(&extension)
            .with_context(|| format!("Invalid extension '{extension}'"))?;
    }
    if let Some(output_root) = args.output_dir.clone().or(file.output_dir) {
        config.output_root = output_root;
    }
    if let Some(rps) = args.rate_limit.or(file.requests_per_second) {
        config.requests_per_second = rps;
    }
    if let Some(base_url) = args.base_url.clone().or(file.base_url) {
        config.base_url = base_url;
    }
    if let Some(scheme) = args.thumbnail_scheme.clone().or(file.thumbnail_scheme) {
        config.thumbnail_scheme = scheme;
    }
    if let Some(extraction) = args.token_extraction.clone().or(file.token_extraction) {
        config.token_extraction = extraction;
    }
    Ok(config)
}
