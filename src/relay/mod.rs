// src/relay/mod.rs

//! Stream relays: the tasks that turn a stage's stdout/stderr into events.
//!
//! - [`lines`] decodes raw chunks and recognises `tail`'s truncation notice.
//! - [`sink`] is the generation-tagged channel end relays write into.
//! - [`stream`] holds the read loop and attaches relays to a pipeline.
//!
//! Every relayed stream runs in its own task. Lines within one stream keep
//! their order; there is no ordering between streams.

pub mod lines;
pub mod sink;
pub mod stream;

pub use lines::{ChunkDecoder, TRUNCATION_SUFFIX};
pub use sink::{EventSink, PipelineOutput};
pub use stream::{READ_CHUNK, StreamKind, attach_relays, relay_stream};
