#![allow(dead_code)]

use tailrelay::config::{ConfigFile, RawConfigFile, UNGROUPED};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults except for the listen address, which
/// is `127.0.0.1:0` so tests never fight over a port.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.server.bind = "127.0.0.1:0".to_string();
        Self { config }
    }

    /// Add `path` to the ungrouped group.
    pub fn with_file(self, path: impl Into<String>) -> Self {
        self.with_group_file(UNGROUPED, path)
    }

    pub fn with_group_file(mut self, group: &str, path: impl Into<String>) -> Self {
        self.config
            .files
            .entry(group.to_string())
            .or_default()
            .push(path.into());
        self
    }

    pub fn allow_transfers(mut self, val: bool) -> Self {
        self.config.server.allow_transfers = val;
        self
    }

    pub fn relative_root(mut self, root: &str) -> Self {
        self.config.server.relative_root = root.to_string();
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.server.bind = addr.to_string();
        self
    }

    pub fn awk_program(mut self, program: &str) -> Self {
        self.config.commands.awk = program.to_string();
        self
    }

    /// The unvalidated config, for tests that exercise validation.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
