//! Where lines come from: a serial port or the simulated sensor.

use std::fmt;
use std::io::Read;

use crate::domain::LinkConfig;
use crate::error::AppError;
use crate::io::serial;
use crate::io::simulate::SimulatedSensor;

/// A resolved line source, ready to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Serial(String),
    Simulated,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Serial(port) => write!(f, "{port}"),
            Source::Simulated => write!(f, "simulated sensor"),
        }
    }
}

/// Open `source` for exclusive use by the reader worker.
pub fn open_source(source: &Source, config: &LinkConfig) -> Result<Box<dyn Read + Send>, AppError> {
    match source {
        Source::Serial(port) => {
            let handle = serial::open(port, config.baud)?;
            Ok(Box::new(handle))
        }
        Source::Simulated => {
            let sim = SimulatedSensor::new(config.seed, config.interval)?;
            Ok(Box::new(sim))
        }
    }
}
