// src/relay/lines.rs

//! Turning raw pipe chunks into text.

/// Suffix `tail` writes to stderr when the followed file shrank.
pub const TRUNCATION_SUFFIX: &str = ": file truncated\n";

/// Decodes raw pipe chunks into text as they arrive.
///
/// Everything a read returns is handed on at once, partial lines included.
/// Only a multi-byte UTF-8 sequence cut off at the end of a read is held
/// back, so at most three bytes are ever carried to the next chunk. Bytes
/// that are not valid UTF-8 are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, prefixed by whatever the previous chunk left over.
    /// Returns `None` when nothing decodable is available yet.
    pub fn push(&mut self, chunk: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(chunk);
        let keep = incomplete_suffix_len(&self.pending);
        let rest = self.pending.split_off(self.pending.len() - keep);
        let ready = std::mem::replace(&mut self.pending, rest);
        if ready.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&ready).into_owned())
    }

    /// Flush a dangling partial sequence at end-of-stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Length of a trailing UTF-8 sequence that is still waiting for its
/// continuation bytes, or 0.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let b = bytes[bytes.len() - back];
        if b & 0xC0 == 0x80 {
            continue;
        }
        let width = match b {
            0xF0..=0xFF => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Split text into lines, keeping each line's `\n` (or `\r\n`).
pub fn split_keep_ends(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Split text into lines without their line endings.
pub fn split_strip_ends(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Whether a block of stderr text is `tail` reporting a truncated file.
pub fn is_truncation_notice(text: &str) -> bool {
    text.ends_with(TRUNCATION_SUFFIX)
}
