// src/protocol/mod.rs

//! Wire format spoken over the WebSocket.
//!
//! - [`decode`] turns inbound JSON text frames into [`Command`]s. Decoding
//!   happens exactly once, at the transport boundary; everything past this
//!   point works with the typed enum.
//! - [`encode`] turns [`Event`]s back into text frames, byte-compatible with
//!   the encoder existing clients were written against.
//!
//! [`Command`]: crate::types::Command
//! [`Event`]: crate::types::Event

pub mod decode;
pub mod encode;

pub use decode::decode_command;
pub use encode::{ClassicFormatter, encode_event};
