//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed across the reader channel without borrowing
//! - printed as log lines or JSON objects by the headless front-end

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default line rate for the microcontroller link.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default bound of the reader -> presentation channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// One decoded `(temperature, light)` reading from the serial stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Arbitrary sensor unit; non-negative in practice.
    pub light: f64,
}

impl Sample {
    pub fn new(temperature: f64, light: f64) -> Self {
        Self { temperature, light }
    }
}

/// A scored sample, stamped with the local time it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(flatten)]
    pub sample: Sample,
    /// Growth index in `[0, 100]`, one decimal place.
    pub growth: f64,
    pub received_at: DateTime<Local>,
}

/// What the reader worker reports to the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Reading(Reading),
    /// The source failed or ended; no further events follow.
    Disconnected { reason: String },
}

/// Link settings resolved from flags and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Serial device identifier; `None` means "ask the user".
    pub port: Option<String>,
    pub baud: u32,
    /// Read from the simulated sensor instead of a serial port.
    pub simulate: bool,
    pub seed: u64,
    /// Delay between simulated lines.
    pub interval: Duration,
    pub channel_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD_RATE,
            simulate: false,
            seed: 0,
            interval: Duration::from_millis(500),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Settings for the terminal UI front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct TuiConfig {
    pub link: LinkConfig,
    /// Leaf image shown next to the log.
    pub leaf_path: PathBuf,
}

/// Settings for the headless front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub link: LinkConfig,
    pub format: OutputFormat,
}

/// Output format of the headless `monitor` front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per reading.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}
