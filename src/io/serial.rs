//! Serial port discovery and connection.
//!
//! Port enumeration and opening are thin wrappers over `serialport`; the only
//! link settings are the port name and the baud rate.

use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use thiserror::Error;
use tracing::{debug, info};

/// Blocking reads return `TimedOut` after this long without data.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Failures to establish the link. None of them are retried.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no serial port selected")]
    NoPortSelected,
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
    #[error("cannot open {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
}

/// One entry of the port list shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub name: String,
    pub kind: &'static str,
    /// `manufacturer product (VID:PID)` for USB ports, empty otherwise.
    pub detail: String,
}

impl PortEntry {
    pub fn label(&self) -> String {
        if self.detail.is_empty() {
            format!("{} ({})", self.name, self.kind)
        } else {
            format!("{} ({}: {})", self.name, self.kind, self.detail)
        }
    }
}

/// List the serial ports the host OS currently reports.
pub fn available_ports() -> Result<Vec<PortEntry>, LinkError> {
    let ports = serialport::available_ports().map_err(LinkError::Enumerate)?;
    let mut entries: Vec<PortEntry> = ports
        .into_iter()
        .map(|p| PortEntry {
            kind: port_type_name(&p.port_type),
            detail: port_detail(&p.port_type),
            name: p.port_name,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = entries.len(), "enumerated serial ports");
    Ok(entries)
}

/// Open `port` for line reading at `baud`.
pub fn open(port: &str, baud: u32) -> Result<Box<dyn SerialPort>, LinkError> {
    let port = port.trim();
    if port.is_empty() {
        return Err(LinkError::NoPortSelected);
    }
    let name = platform_port_name(port);

    let handle = serialport::new(&name, baud)
        .timeout(READ_TIMEOUT)
        .flow_control(serialport::FlowControl::None)
        .open()
        .map_err(|source| LinkError::Open {
            port: port.to_string(),
            baud,
            source,
        })?;

    info!(port = %port, baud, "serial port opened");
    Ok(handle)
}

fn port_type_name(port_type: &SerialPortType) -> &'static str {
    match port_type {
        SerialPortType::UsbPort(_) => "USB",
        SerialPortType::BluetoothPort => "Bluetooth",
        SerialPortType::PciPort => "PCI",
        SerialPortType::Unknown => "Unknown",
    }
}

fn port_detail(port_type: &SerialPortType) -> String {
    let SerialPortType::UsbPort(info) = port_type else {
        return String::new();
    };
    let names: Vec<&str> = [info.manufacturer.as_deref(), info.product.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let ids = format!("{:04x}:{:04x}", info.vid, info.pid);
    if names.is_empty() {
        ids
    } else {
        format!("{} ({ids})", names.join(" "))
    }
}

// On Windows, COM ports >= 10 need the \\.\COMxx format.
#[cfg(target_os = "windows")]
fn platform_port_name(port: &str) -> String {
    if port.starts_with("COM") {
        format!(r"\\.\{port}")
    } else {
        port.to_string()
    }
}

#[cfg(not(target_os = "windows"))]
fn platform_port_name(port: &str) -> String {
    port.to_string()
}
