//! Reporting utilities: log lines, JSON records and port listings.

pub mod format;

pub use format::*;
