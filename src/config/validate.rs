// src/config/validate.rs

use std::net::SocketAddr;
use std::path::Path;

use crate::config::allow_list::AllowList;
use crate::config::model::{CommandPaths, ConfigFile, RawConfigFile, ServerSettings};
use crate::errors::{Result, TailRelayError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TailRelayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_files(&raw)?;
        validate_commands(&raw.commands)?;
        let server = validate_server(&raw)?;
        Ok(ConfigFile::new_unchecked(
            server,
            raw.commands,
            AllowList::new(raw.files),
        ))
    }
}

fn validate_files(cfg: &RawConfigFile) -> Result<()> {
    if cfg.files.values().all(Vec::is_empty) {
        return Err(TailRelayError::ConfigError(
            "no files configured; list them under [files] or pass them as arguments"
                .to_string(),
        ));
    }

    for (group, files) in cfg.files.iter() {
        for file in files {
            if file.trim().is_empty() {
                return Err(TailRelayError::ConfigError(format!(
                    "group '{}' contains an empty file path",
                    group
                )));
            }
            if !Path::new(file).is_absolute() {
                return Err(TailRelayError::ConfigError(format!(
                    "file '{}' in group '{}' must be an absolute path",
                    file, group
                )));
            }
        }
    }

    Ok(())
}

fn validate_commands(commands: &CommandPaths) -> Result<()> {
    for (name, exe) in [
        ("tail", &commands.tail),
        ("grep", &commands.grep),
        ("awk", &commands.awk),
    ] {
        if exe.trim().is_empty() {
            return Err(TailRelayError::ConfigError(format!(
                "[commands].{} must not be empty",
                name
            )));
        }
    }
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<ServerSettings> {
    let bind: SocketAddr = cfg.server.bind.trim().parse().map_err(|e| {
        TailRelayError::ConfigError(format!(
            "[server].bind '{}' is not a socket address: {}",
            cfg.server.bind, e
        ))
    })?;

    let root = cfg.server.relative_root.trim();
    if !root.starts_with('/') {
        return Err(TailRelayError::ConfigError(format!(
            "[server].relative_root '{}' must start with '/'",
            root
        )));
    }
    let relative_root = match root.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    };

    Ok(ServerSettings {
        bind,
        relative_root,
        allow_transfers: cfg.server.allow_transfers,
        debug: cfg.server.debug,
    })
}
