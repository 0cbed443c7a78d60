//! Growth-driven recoloring.
//!
//! Two passes, both driven linearly by `factor = growth / 100`:
//!
//! 1. saturation: blend each pixel with its luma gray by `0.5 + 1.5 * factor`
//!    (below 1 washes the leaf out, above 1 makes the green more vivid)
//! 2. brightness: scale by `1 + 0.2 * factor`
//!
//! Blending extrapolates past the original color, so channels are clipped to
//! `0..=255` after each pass.

use super::{LeafImage, Rgb};
use crate::growth::growth_fraction;

/// Per-reading enhancement factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    pub saturation: f64,
    pub brightness: f64,
}

impl Enhancement {
    pub fn for_growth(growth: f64) -> Self {
        let factor = growth_fraction(growth);
        Self {
            saturation: 0.5 + 1.5 * factor,
            brightness: 1.0 + 0.2 * factor,
        }
    }

    pub fn apply(&self, px: Rgb) -> Rgb {
        let gray = luma(px) as f64;
        let saturate = |c: u8| clip8(gray + self.saturation * (c as f64 - gray));
        let px = Rgb::new(saturate(px.r), saturate(px.g), saturate(px.b));

        let brighten = |c: u8| clip8(c as f64 * self.brightness);
        Rgb::new(brighten(px.r), brighten(px.g), brighten(px.b))
    }

    /// Recolor every opaque pixel of `image`.
    pub fn apply_image(&self, image: &LeafImage) -> LeafImage {
        image.map_opaque(|px| self.apply(px))
    }
}

/// ITU-R 601-2 luma, fixed-point.
pub fn luma(px: Rgb) -> u8 {
    let l = (px.r as u32 * 19_595 + px.g as u32 * 38_470 + px.b as u32 * 7_471 + 0x8000) >> 16;
    l.min(255) as u8
}

fn clip8(v: f64) -> u8 {
    // Truncate like an integer pixel blend.
    (v as i64).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF_GREEN: Rgb = Rgb::new(60, 140, 40);

    #[test]
    fn factors_follow_growth() {
        assert_eq!(
            Enhancement::for_growth(0.0),
            Enhancement { saturation: 0.5, brightness: 1.0 }
        );
        let full = Enhancement::for_growth(100.0);
        assert!((full.saturation - 2.0).abs() < 1e-12);
        assert!((full.brightness - 1.2).abs() < 1e-12);
        // Out-of-range inputs are clamped.
        assert_eq!(Enhancement::for_growth(-20.0), Enhancement::for_growth(0.0));
        assert_eq!(Enhancement::for_growth(400.0), full);
    }

    #[test]
    fn gray_is_unchanged_by_saturation() {
        let gray = Rgb::new(128, 128, 128);
        assert_eq!(Enhancement::for_growth(0.0).apply(gray), gray);
    }

    #[test]
    fn low_growth_washes_out_high_growth_vivid() {
        let spread = |px: Rgb| px.r.max(px.g).max(px.b) - px.r.min(px.g).min(px.b);
        let dull = Enhancement::for_growth(0.0).apply(LEAF_GREEN);
        let vivid = Enhancement::for_growth(100.0).apply(LEAF_GREEN);
        assert!(spread(dull) < spread(LEAF_GREEN));
        assert!(spread(vivid) > spread(LEAF_GREEN));
        assert!(vivid.g > LEAF_GREEN.g);
    }

    #[test]
    fn channels_are_clipped() {
        let bright = Rgb::new(10, 250, 10);
        let out = Enhancement::for_growth(100.0).apply(bright);
        assert_eq!(out.g, 255);
        assert_eq!(out.r, 0);
    }

    #[test]
    fn transparent_pixels_stay_transparent() {
        let img = LeafImage::from_pixels(2, 1, vec![None, Some(LEAF_GREEN)]).unwrap();
        let out = Enhancement::for_growth(50.0).apply_image(&img);
        assert_eq!(out.pixel(0, 0), None);
        assert!(out.pixel(1, 0).is_some());
    }
}
