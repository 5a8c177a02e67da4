// src/types.rs

//! Commands flowing in from clients and events flowing back out.

use std::fmt;

/// Number of lines `tail` prints before following when `last` is omitted.
pub const DEFAULT_LAST_LINES: u64 = 10;

/// Which line-processing tool sits behind `tail` in a filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Grep,
    Awk,
}

impl FilterKind {
    /// Script used when the client does not send one.
    ///
    /// Both defaults pass every line through unchanged.
    pub fn default_script(self) -> &'static str {
        match self {
            FilterKind::Grep => ".*",
            FilterKind::Awk => "{print $0}",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Grep => "grep",
            FilterKind::Awk => "awk",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Follow `file`, starting with its last `last` lines.
    Tail { file: String, last: u64 },
    /// Follow `file` and pipe the output through `kind` running `script`.
    Filter {
        kind: FilterKind,
        file: String,
        last: u64,
        script: String,
    },
}

impl Command {
    pub fn tail(file: impl Into<String>) -> Self {
        Command::Tail {
            file: file.into(),
            last: DEFAULT_LAST_LINES,
        }
    }

    pub fn filter(kind: FilterKind, file: impl Into<String>, script: impl Into<String>) -> Self {
        Command::Filter {
            kind,
            file: file.into(),
            last: DEFAULT_LAST_LINES,
            script: script.into(),
        }
    }

    /// The file this command wants to follow.
    pub fn file(&self) -> &str {
        match self {
            Command::Tail { file, .. } | Command::Filter { file, .. } => file,
        }
    }

    pub fn last(&self) -> u64 {
        match self {
            Command::Tail { last, .. } | Command::Filter { last, .. } => *last,
        }
    }

    /// Short name used in logs (`tail`, `grep`, `awk`).
    pub fn kind_str(&self) -> &'static str {
        match self {
            Command::Tail { .. } => "tail",
            Command::Filter { kind, .. } => kind.as_str(),
        }
    }
}

/// Output produced by a pipeline for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Lines from the terminal stage's stdout, line endings kept.
    Data { file: String, lines: Vec<String> },
    /// Lines written to stderr by any stage, line endings stripped.
    Error { file: String, lines: Vec<String> },
    /// `tail` noticed the file was truncated (log rotation).
    Truncated { file: String },
}

impl Event {
    pub fn file(&self) -> &str {
        match self {
            Event::Data { file, .. } | Event::Error { file, .. } | Event::Truncated { file } => {
                file
            }
        }
    }
}
