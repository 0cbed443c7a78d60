//! Command-line parsing for the growth monitor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the reading/scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_BAUD_RATE, DEFAULT_CHANNEL_CAPACITY, OutputFormat};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "leafmon", version, about = "Plant growth monitor for a serial temperature/light sensor")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available serial ports.
    Ports,
    /// Print one line per reading to stdout until the link is lost.
    Monitor(MonitorArgs),
    /// Launch the interactive TUI (port picker, leaf, log, trend).
    Tui(TuiArgs),
}

/// Link options shared by both front-ends.
#[derive(Debug, Args, Clone)]
pub struct LinkArgs {
    /// Serial port to open (falls back to `LEAFMON_PORT`).
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate.
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Read from a simulated sensor instead of a serial port.
    #[arg(long)]
    pub simulate: bool,

    /// Random seed for the simulated sensor.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Milliseconds between simulated lines.
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,

    /// Readings buffered between the reader thread and the display;
    /// newer readings are dropped while it is full.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,
}

/// Options for the headless monitor.
#[derive(Debug, Args, Clone)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Options for the TUI.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Leaf image (PNG or PPM) to recolor (falls back to `LEAFMON_LEAF`, then `leaf.png`).
    #[arg(long, value_name = "IMAGE")]
    pub leaf: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_flags_parse() {
        let cli = Cli::try_parse_from([
            "leafmon", "monitor", "--port", "COM3", "--format", "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        assert_eq!(args.link.port.as_deref(), Some("COM3"));
        assert_eq!(args.link.baud, DEFAULT_BAUD_RATE);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn tui_defaults() {
        let cli = Cli::try_parse_from(["leafmon", "tui", "--simulate"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert!(args.link.simulate);
        assert_eq!(args.leaf, None);
        assert_eq!(args.link.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }
}
