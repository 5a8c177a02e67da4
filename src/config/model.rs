// src/config/model.rs

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::allow_list::AllowList;

/// Group name for files listed without a group (including files passed on
/// the command line).
pub const UNGROUPED: &str = "__ungrouped__";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// bind = "127.0.0.1:8084"
/// relative_root = "/"
/// allow_transfers = false
/// debug = false
///
/// [commands]
/// tail = "tail"
/// grep = "grep"
/// awk = "gawk"
///
/// [files]
/// "__ungrouped__" = ["/var/log/syslog"]
/// nginx = ["/var/log/nginx/access.log", "/var/log/nginx/error.log"]
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub commands: CommandPaths,

    /// Allow-listed files keyed by group name.
    #[serde(default)]
    pub files: BTreeMap<String, Vec<String>>,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Address the HTTP/WebSocket listener binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path prefix all routes are served under (e.g. `/logs`).
    #[serde(default = "default_relative_root")]
    pub relative_root: String,

    /// Whether `/fetch/<path>` may return raw file contents.
    #[serde(default)]
    pub allow_transfers: bool,

    /// Turns on debug logging when no explicit level is given.
    #[serde(default)]
    pub debug: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8084".to_string()
}

fn default_relative_root() -> String {
    "/".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            relative_root: default_relative_root(),
            allow_transfers: false,
            debug: false,
        }
    }
}

/// `[commands]` section: executables used for pipeline stages.
///
/// `awk` defaults to `gawk` because the filter stage relies on `--sandbox`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandPaths {
    #[serde(default = "default_tail")]
    pub tail: String,

    #[serde(default = "default_grep")]
    pub grep: String,

    #[serde(default = "default_awk")]
    pub awk: String,
}

fn default_tail() -> String {
    "tail".to_string()
}

fn default_grep() -> String {
    "grep".to_string()
}

fn default_awk() -> String {
    "gawk".to_string()
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            tail: default_tail(),
            grep: default_grep(),
            awk: default_awk(),
        }
    }
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Always starts with `/`, never ends with one unless it is exactly `/`.
    pub relative_root: String,
    pub allow_transfers: bool,
    pub debug: bool,
}

/// Validated configuration used by the rest of the application.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or [`ConfigFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub commands: CommandPaths,
    /// Shared read-only by every session and HTTP handler.
    pub allow_list: Arc<AllowList>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        server: ServerSettings,
        commands: CommandPaths,
        allow_list: AllowList,
    ) -> Self {
        Self {
            server,
            commands,
            allow_list: Arc::new(allow_list),
        }
    }
}
