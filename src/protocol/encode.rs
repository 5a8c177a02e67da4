// src/protocol/encode.rs

use std::io;

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;

use crate::types::Event;

/// Encode an event as the text frame existing clients expect.
///
/// - data:      `{"<file>": ["line\n", ...]}`
/// - error:     `{"fn": "<file>", "err": ["line", ...]}`
/// - truncated: `{"fn": "<file>", "err": "truncated"}`
///
/// Output is byte-for-byte what existing clients were written against:
/// [`ClassicFormatter`] layout, and `</` escaped as `<\/` so a frame can
/// never close a `<script>` element.
pub fn encode_event(event: &Event) -> Result<String, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, ClassicFormatter);
    WireEvent(event).serialize(&mut ser)?;

    let text = String::from_utf8(buf).map_err(serde_json::Error::custom)?;
    Ok(text.replace("</", "<\\/"))
}

struct WireEvent<'a>(&'a Event);

impl Serialize for WireEvent<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Event::Data { file, lines } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(file, lines)?;
                map.end()
            }
            Event::Error { file, lines } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("fn", file)?;
                map.serialize_entry("err", lines)?;
                map.end()
            }
            Event::Truncated { file } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("fn", file)?;
                map.serialize_entry("err", "truncated")?;
                map.end()
            }
        }
    }
}

/// `serde_json` formatter reproducing the classic `json.dumps` layout:
/// `", "` and `": "` separators, and every character outside printable
/// ASCII written as a lowercase `\uXXXX` escape (UTF-16 surrogate pairs
/// above the BMP).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicFormatter;

impl Formatter for ClassicFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}
