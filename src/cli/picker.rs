//! Interactive serial port picker for the headless monitor.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `leafmon monitor` and choose a port" UX
//!
//! The TUI has its own list-based picker; both read the same port list.

use std::io::{self, BufRead, Write};

use crate::error::{AppError, EXIT_IO, EXIT_USAGE};
use crate::io::serial::{LinkError, PortEntry};
use crate::report::format_port_list;

/// Prompt on stdin/stdout for a port from `ports`.
///
/// Behavior:
/// - list discovered ports
/// - accept either a number (from the list) or an explicit port name
/// - `q` cancels
pub fn prompt_for_port(ports: &[PortEntry]) -> Result<String, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_port(ports, &mut stdin.lock(), &mut stdout.lock())
}

/// Picker loop over arbitrary input/output, so it can be driven by tests.
pub fn choose_port<R: BufRead, W: Write>(
    ports: &[PortEntry],
    input: &mut R,
    output: &mut W,
) -> Result<String, AppError> {
    if ports.is_empty() {
        return Err(LinkError::NoPortSelected.into());
    }

    write_out(output, &format_port_list(ports))?;

    loop {
        write_out(
            output,
            &format!("Select a port by number (1-{}) or type a name (q to quit): ", ports.len()),
        )?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(EXIT_IO, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(LinkError::NoPortSelected.into());
        }

        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Err(AppError::new(EXIT_USAGE, "Canceled."));
        }
        if choice.is_empty() {
            continue;
        }

        if let Ok(n) = choice.parse::<usize>() {
            if (1..=ports.len()).contains(&n) {
                return Ok(ports[n - 1].name.clone());
            }
            write_out(
                output,
                &format!("Invalid choice: {n}. Enter a number between 1 and {}.\n", ports.len()),
            )?;
            continue;
        }

        return Ok(choice.to_string());
    }
}

fn write_out<W: Write>(output: &mut W, text: &str) -> Result<(), AppError> {
    output
        .write_all(text.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to write prompt: {e}")))
}
