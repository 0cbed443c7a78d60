//! Input side of the pipeline.
//!
//! - serial line decoding (`decode`)
//! - port discovery/opening (`serial`)
//! - the simulated sensor (`simulate`)
//! - source selection (`source`)
//! - the background reader thread (`reader`)

pub mod decode;
pub mod reader;
pub mod serial;
pub mod simulate;
pub mod source;

pub use decode::{DecodeError, decode_line};
pub use reader::{ReaderHandle, spawn_reader};
pub use source::{Source, open_source};
