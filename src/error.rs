//! Top-level application error.
//!
//! Domain modules return typed errors (`LinkError`, `AssetError`, ...); at the
//! front-end boundary they collapse into an `AppError` carrying the process
//! exit code:
//!
//! - 2: usage / configuration
//! - 3: cannot connect (serial port)
//! - 4: terminal or other I/O
//! - 5: leaf image missing or unreadable
//! - 6: link lost while monitoring

use crate::io::serial::LinkError;
use crate::leaf::AssetError;

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_CONNECTION: u8 = 3;
pub const EXIT_IO: u8 = 4;
pub const EXIT_ASSET: u8 = 5;
pub const EXIT_DISCONNECTED: u8 = 6;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        AppError::new(EXIT_CONNECTION, format!("Connection error: {err}"))
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        AppError::new(EXIT_ASSET, format!("Image error: {err}"))
    }
}
