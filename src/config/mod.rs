// src/config/mod.rs

//! Configuration loading and validation for tailrelay.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Hold the allow-list of files clients may touch (`allow_list.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate paths, executables and the listen address (`validate.rs`).

pub mod allow_list;
pub mod loader;
pub mod model;
pub mod validate;

pub use allow_list::AllowList;
pub use loader::{apply_cli_overrides, load_and_validate, load_from_path, load_with_overrides};
pub use model::{
    CommandPaths, ConfigFile, RawConfigFile, ServerSection, ServerSettings, UNGROUPED,
};
