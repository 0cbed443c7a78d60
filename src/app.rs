//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env`
//! - sets up logging
//! - resolves the line source (serial port or simulator)
//! - runs the chosen front-end

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, LinkArgs, MonitorArgs, TuiArgs};
use crate::domain::{LinkConfig, LinkEvent, MonitorConfig, OutputFormat, TuiConfig};
use crate::error::{AppError, EXIT_DISCONNECTED, EXIT_IO};
use crate::io::reader::{ReaderHandle, spawn_reader};
use crate::io::serial;
use crate::io::source::{Source, open_source};
use crate::leaf::DEFAULT_LEAF_PATH;
use crate::logging::LogTarget;

pub mod pipeline;

/// Environment fallback for `--port`.
pub const ENV_PORT: &str = "LEAFMON_PORT";
/// Environment fallback for `--leaf`.
pub const ENV_LEAF: &str = "LEAFMON_LEAF";

/// Entry point for the `leafmon` binary.
pub fn run() -> Result<(), AppError> {
    // We want `leafmon` and `leafmon --port X` to behave like `leafmon tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    dotenvy::dotenv().ok();

    let log_target = match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, Command::Tui(_)) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    crate::logging::init(cli.verbose, log_target)?;

    match cli.command {
        Command::Ports => handle_ports(),
        Command::Monitor(args) => handle_monitor(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_ports() -> Result<(), AppError> {
    let ports = serial::available_ports()?;
    println!("{}", crate::report::format_port_list(&ports).trim_end());
    Ok(())
}

fn handle_monitor(args: MonitorArgs) -> Result<(), AppError> {
    let config = MonitorConfig {
        link: link_config_from_args(&args.link, env_var(ENV_PORT)),
        format: args.format,
    };

    let source = match resolve_source(&config.link) {
        Some(source) => source,
        None => {
            let ports = serial::available_ports()?;
            Source::Serial(crate::cli::picker::prompt_for_port(&ports)?)
        }
    };

    let handle = connect(&source, &config.link)?;
    eprintln!("Connected to {source}.");

    let stdout = io::stdout();
    let summary = run_monitor(&handle, config.format, &mut stdout.lock())?;
    eprintln!(
        "{}",
        crate::report::format_session_summary(summary.readings, summary.dropped, &summary.reason)
    );
    Err(AppError::new(
        EXIT_DISCONNECTED,
        format!("Link to {source} lost: {}", summary.reason),
    ))
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = TuiConfig {
        link: link_config_from_args(&args.link, env_var(ENV_PORT)),
        leaf_path: leaf_path_from_args(args.leaf, env_var(ENV_LEAF)),
    };
    crate::tui::run(config)
}

/// Open `source` and hand it to a fresh reader thread.
pub fn connect(source: &Source, link: &LinkConfig) -> Result<ReaderHandle, AppError> {
    let handle = open_source(source, link)?;
    info!(%source, "link open, starting reader");
    spawn_reader(handle, link.channel_capacity)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to start reader thread: {e}")))
}

/// What a finished headless session saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSummary {
    pub readings: u64,
    pub dropped: u64,
    pub reason: String,
}

/// Print readings until the link goes away.
pub fn run_monitor<W: Write>(
    handle: &ReaderHandle,
    format: OutputFormat,
    out: &mut W,
) -> Result<MonitorSummary, AppError> {
    let mut readings = 0u64;
    let reason = loop {
        match handle.recv() {
            Some(LinkEvent::Reading(reading)) => {
                readings += 1;
                let line = crate::report::render_reading(&reading, format)?;
                writeln!(out, "{line}")
                    .and_then(|()| out.flush())
                    .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write output: {e}")))?;
            }
            Some(LinkEvent::Disconnected { reason }) => break reason,
            None => break "reader stopped".to_string(),
        }
    };
    warn!(%reason, readings, "monitor stopped");

    Ok(MonitorSummary {
        readings,
        dropped: handle.dropped(),
        reason,
    })
}

/// Merge CLI link flags with the environment fallback.
pub fn link_config_from_args(args: &LinkArgs, env_port: Option<String>) -> LinkConfig {
    LinkConfig {
        port: args.port.clone().or(env_port),
        baud: args.baud,
        simulate: args.simulate,
        seed: args.seed,
        interval: Duration::from_millis(args.interval_ms),
        channel_capacity: args.channel_capacity.max(1),
    }
}

/// `--leaf`, then `LEAFMON_LEAF`, then `leaf.png`.
pub fn leaf_path_from_args(flag: Option<PathBuf>, env_leaf: Option<String>) -> PathBuf {
    flag.or_else(|| env_leaf.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEAF_PATH))
}

/// The source implied by the flags, if no interactive choice is needed.
pub fn resolve_source(link: &LinkConfig) -> Option<Source> {
    if link.simulate {
        return Some(Source::Simulated);
    }
    link.port.clone().map(Source::Serial)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Rewrite argv so `leafmon` defaults to `leafmon tui`.
///
/// Rules:
/// - `leafmon`                      -> `leafmon tui`
/// - `leafmon --port COM3 ...`      -> `leafmon tui --port COM3 ...`
/// - `leafmon --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "ports" | "monitor" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["leafmon"])), argv(&["leafmon", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["leafmon", "--port", "COM3"])),
            argv(&["leafmon", "tui", "--port", "COM3"])
        );
        assert_eq!(rewrite_args(argv(&["leafmon", "--help"])), argv(&["leafmon", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["leafmon", "monitor", "--simulate"])),
            argv(&["leafmon", "monitor", "--simulate"])
        );
    }

    #[test]
    fn flag_port_wins_over_environment() {
        let cli = Cli::parse_from(argv(&["leafmon", "monitor", "--port", "/dev/ttyACM1"]));
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        let link = link_config_from_args(&args.link, Some("/dev/ttyACM0".to_string()));
        assert_eq!(link.port.as_deref(), Some("/dev/ttyACM1"));

        let cli = Cli::parse_from(argv(&["leafmon", "monitor"]));
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        let link = link_config_from_args(&args.link, Some("/dev/ttyACM0".to_string()));
        assert_eq!(link.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(resolve_source(&link), Some(Source::Serial("/dev/ttyACM0".to_string())));
    }

    #[test]
    fn simulate_overrides_port_and_missing_port_needs_picker() {
        let mut link = LinkConfig {
            port: Some("COM3".to_string()),
            simulate: true,
            ..LinkConfig::default()
        };
        assert_eq!(resolve_source(&link), Some(Source::Simulated));

        link.simulate = false;
        link.port = None;
        assert_eq!(resolve_source(&link), None);
    }

    #[test]
    fn leaf_path_precedence() {
        assert_eq!(
            leaf_path_from_args(Some(PathBuf::from("a.ppm")), Some("b.ppm".to_string())),
            PathBuf::from("a.ppm")
        );
        assert_eq!(leaf_path_from_args(None, Some("b.ppm".to_string())), PathBuf::from("b.ppm"));
        assert_eq!(leaf_path_from_args(None, None), PathBuf::from(DEFAULT_LEAF_PATH));
    }

    #[test]
    fn monitor_prints_each_reading_until_disconnect() {
        let input = "24.5,600\nnoise\n30,100\n";
        let handle = spawn_reader(Cursor::new(input.as_bytes().to_vec()), 8).unwrap();
        let mut out = Vec::new();
        let summary = run_monitor(&handle, OutputFormat::Text, &mut out).unwrap();

        assert_eq!(summary.readings, 2);
        assert_eq!(summary.reason, "end of stream");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("temp: 24.5°C, light: 600, growth: 97.5"));
        assert!(lines[1].ends_with("temp: 30.0°C, light: 100, growth: 50.0"));
    }

    #[test]
    fn monitor_json_lines_parse() {
        let handle = spawn_reader(Cursor::new(b"25,200\n".to_vec()), 8).unwrap();
        let mut out = Vec::new();
        run_monitor(&handle, OutputFormat::Json, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["growth"], 100.0);
    }
}
