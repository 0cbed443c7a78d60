//! Leaf image: loading the asset and recoloring it by growth index.
//!
//! The asset is loaded once at startup; every new reading re-derives the
//! displayed colors from the untouched base image.

pub mod asset;
pub mod enhance;

pub use asset::*;
pub use enhance::*;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
