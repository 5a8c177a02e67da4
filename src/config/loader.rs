// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile, UNGROUPED};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Build the effective configuration for a CLI invocation.
///
/// Starts from `--config` (or built-in defaults when absent), layers the
/// command-line overrides on top, then validates the result.
pub fn load_with_overrides(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };
    apply_cli_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

/// Apply CLI flags to a raw config.
///
/// Flags only ever switch booleans on; positional files are appended to the
/// ungrouped group.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(bind) = &args.bind {
        raw.server.bind = bind.clone();
    }
    if let Some(root) = &args.relative_root {
        raw.server.relative_root = root.clone();
    }
    if args.allow_transfers {
        raw.server.allow_transfers = true;
    }
    if args.debug {
        raw.server.debug = true;
    }
    if !args.files.is_empty() {
        raw.files
            .entry(UNGROUPED.to_string())
            .or_default()
            .extend(args.files.iter().cloned());
    }
}
