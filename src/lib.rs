//! `leaf-monitor` library crate.
//!
//! The binary (`leafmon`) is a thin wrapper around this library so that:
//!
//! - the decoder, scorer and reader loop are testable without hardware
//! - both front-ends (TUI and headless monitor) share one pipeline

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod growth;
pub mod io;
pub mod leaf;
pub mod logging;
pub mod report;
pub mod tui;
