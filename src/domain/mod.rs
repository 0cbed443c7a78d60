//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - decoded sensor samples (`Sample`)
//! - scored readings handed to the front-ends (`Reading`)
//! - the events the reader worker emits (`LinkEvent`)

pub mod types;

pub use types::*;
