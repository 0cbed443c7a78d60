//! Formatted terminal output.
//!
//! We keep formatting code in one place so both front-ends print the same
//! log line for the same reading.

use crate::domain::{OutputFormat, Reading};
use crate::error::{AppError, EXIT_IO};
use crate::io::serial::PortEntry;

/// `temp: 24.5°C, light: 600, growth: 97.5`
pub fn format_reading(reading: &Reading) -> String {
    format!(
        "temp: {:.1}°C, light: {:.0}, growth: {:.1}",
        reading.sample.temperature, reading.sample.light, reading.growth
    )
}

/// Log line with a local `HH:MM:SS` prefix.
pub fn format_log_entry(reading: &Reading) -> String {
    format!(
        "{}  {}",
        reading.received_at.format("%H:%M:%S"),
        format_reading(reading)
    )
}

/// One JSON object per reading.
pub fn format_reading_json(reading: &Reading) -> Result<String, AppError> {
    serde_json::to_string(reading)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to serialize reading: {e}")))
}

/// Render one reading in the requested output format.
pub fn render_reading(reading: &Reading, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Text => Ok(format_log_entry(reading)),
        OutputFormat::Json => format_reading_json(reading),
    }
}

/// Numbered list of ports, as printed by `leafmon ports` and the prompt.
pub fn format_port_list(ports: &[PortEntry]) -> String {
    if ports.is_empty() {
        return "No serial ports found.".to_string();
    }
    let mut out = format!("Found {} serial port(s):\n", ports.len());
    for (idx, port) in ports.iter().enumerate() {
        out.push_str(&format!("{:>3}) {}\n", idx + 1, port.label()));
    }
    out
}

/// Closing summary of a headless session.
pub fn format_session_summary(readings: u64, dropped: u64, reason: &str) -> String {
    format!("Link closed ({reason}). readings={readings} dropped={dropped}")
}
