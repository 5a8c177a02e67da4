// src/protocol/decode.rs

use serde_json::{Map, Value};

use crate::errors::DecodeError;
use crate::types::{Command, DEFAULT_LAST_LINES, FilterKind};

/// Decode one inbound text frame.
///
/// The frame is a JSON object carrying one of `tail`, `grep` or `awk` bound
/// to the file path. When several are present the first in that order wins.
/// Returns `Ok(None)` when none of them is present: such a frame is not a
/// command and must not touch the running pipeline.
///
/// ```json
/// {"tail": "/var/log/app.log", "last": 5}
/// {"grep": "/var/log/app.log", "script": "ERROR"}
/// {"awk": "/var/log/app.log", "script": "{print $1}"}
/// ```
pub fn decode_command(text: &str) -> Result<Option<Command>, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(msg) = value else {
        return Err(DecodeError::NotAnObject);
    };

    if let Some(file) = msg.get("tail") {
        let file = file_field(file, "tail")?;
        let last = last_field(&msg)?;
        return Ok(Some(Command::Tail { file, last }));
    }

    for kind in [FilterKind::Grep, FilterKind::Awk] {
        let key = kind.as_str();
        if let Some(file) = msg.get(key) {
            let file = file_field(file, key)?;
            let last = last_field(&msg)?;
            let script = script_field(&msg, kind)?;
            return Ok(Some(Command::Filter {
                kind,
                file,
                last,
                script,
            }));
        }
    }

    Ok(None)
}

fn file_field(value: &Value, key: &'static str) -> Result<String, DecodeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(DecodeError::InvalidField {
            field: key,
            expected: "must be a file path string",
        })
}

fn last_field(msg: &Map<String, Value>) -> Result<u64, DecodeError> {
    match msg.get("last") {
        None | Some(Value::Null) => Ok(DEFAULT_LAST_LINES),
        // `tail -n -5` means the same as `tail -n 5`.
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_i64().map(i64::unsigned_abs))
            .ok_or(DecodeError::InvalidField {
                field: "last",
                expected: "must be an integer",
            }),
    }
}

fn script_field(msg: &Map<String, Value>, kind: FilterKind) -> Result<String, DecodeError> {
    match msg.get("script") {
        None | Some(Value::Null) => Ok(kind.default_script().to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::InvalidField {
            field: "script",
            expected: "must be a string",
        }),
    }
}
