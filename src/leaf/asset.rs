//! Leaf image asset loading.
//!
//! The image is a PNG, or a portable pixmap (`P3` ASCII or `P6` binary,
//! maxval up to 255). Pure black pixels and PNG pixels with alpha below half
//! are the transparent background. Loading happens once at startup and a
//! missing file is fatal for the TUI.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::debug;

use super::Rgb;

/// Default asset location, relative to the working directory.
pub const DEFAULT_LEAF_PATH: &str = "leaf.png";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Largest accepted image side, in pixels.
const MAX_SIDE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("leaf image {} not found or unreadable ({reason}); place it in the working directory or pass --leaf", .path.display())]
    Missing { path: PathBuf, reason: String },
    #[error("leaf image {} is not a valid PNG or PPM: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Decoded leaf pixels; `None` is transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafImage {
    width: usize,
    height: usize,
    pixels: Vec<Option<Rgb>>,
}

impl LeafImage {
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Option<Rgb>>) -> Option<Self> {
        (width > 0 && height > 0 && pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[y * self.width + x]
    }

    /// Same image with `f` applied to every opaque pixel.
    pub fn map_opaque(&self, f: impl Fn(Rgb) -> Rgb) -> LeafImage {
        LeafImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|px| px.map(&f)).collect(),
        }
    }

    /// Largest `(width, height)` that fits in the box and keeps the aspect ratio.
    pub fn fit_within(&self, max_width: usize, max_height: usize) -> (usize, usize) {
        if max_width == 0 || max_height == 0 {
            return (0, 0);
        }
        let sx = max_width as f64 / self.width as f64;
        let sy = max_height as f64 / self.height as f64;
        let s = sx.min(sy);
        let w = ((self.width as f64 * s).floor() as usize).clamp(1, max_width);
        let h = ((self.height as f64 * s).floor() as usize).clamp(1, max_height);
        (w, h)
    }

    /// Nearest-neighbour resample to `width x height`.
    pub fn resized(&self, width: usize, height: usize) -> LeafImage {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let src_y = y * self.height / height;
            for x in 0..width {
                let src_x = x * self.width / width;
                pixels.push(self.pixels[src_y * self.width + src_x]);
            }
        }
        LeafImage {
            width,
            height,
            pixels,
        }
    }
}

/// Load the leaf asset from `path`.
pub fn load_leaf(path: &Path) -> Result<LeafImage, AssetError> {
    let bytes = fs::read(path).map_err(|e| AssetError::Missing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let parsed = if bytes.starts_with(PNG_SIGNATURE) {
        parse_png(&bytes)
    } else {
        parse_ppm(&bytes)
    };
    let image = parsed.map_err(|reason| AssetError::Malformed {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(path = %path.display(), width = image.width, height = image.height, "leaf image loaded");
    Ok(image)
}

/// Decode a PNG. Pixels with alpha below 128 are transparent.
pub fn parse_png(bytes: &[u8]) -> Result<LeafImage, String> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(format!("unsupported size {width}x{height}"));
    }

    let pixels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let px = Rgb::new(r, g, b);
            (a >= 128 && px != Rgb::BLACK).then_some(px)
        })
        .collect();
    LeafImage::from_pixels(width, height, pixels).ok_or_else(|| "empty image".to_string())
}

/// Parse a `P3`/`P6` pixmap.
pub fn parse_ppm(bytes: &[u8]) -> Result<LeafImage, String> {
    let mut pos = 0usize;
    let magic = next_token(bytes, &mut pos).ok_or("missing magic number")?;
    let binary = match magic {
        "P3" => false,
        "P6" => true,
        other => return Err(format!("unsupported magic {other:?} (expected P3 or P6)")),
    };

    let width = header_number(bytes, &mut pos, "width")?;
    let height = header_number(bytes, &mut pos, "height")?;
    let maxval = header_number(bytes, &mut pos, "maxval")?;
    if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
        return Err(format!("unsupported size {width}x{height}"));
    }
    if !(1..=255).contains(&maxval) {
        return Err(format!("unsupported maxval {maxval} (expected 1..=255)"));
    }

    let count = width * height * 3;
    let samples: Vec<usize> = if binary {
        // Exactly one whitespace byte separates the header from the raster.
        let start = pos + 1;
        let raster = bytes
            .get(start..start + count)
            .ok_or_else(|| format!("raster truncated (expected {count} bytes)"))?;
        raster.iter().map(|&b| b as usize).collect()
    } else {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(header_number(bytes, &mut pos, "sample")?);
        }
        out
    };

    let mut pixels = Vec::with_capacity(width * height);
    for chunk in samples.chunks_exact(3) {
        if chunk.iter().any(|&v| v > maxval) {
            return Err(format!("sample exceeds maxval {maxval}"));
        }
        let scale = |v: usize| (v * 255 / maxval) as u8;
        let px = Rgb::new(scale(chunk[0]), scale(chunk[1]), scale(chunk[2]));
        pixels.push((px != Rgb::BLACK).then_some(px));
    }

    Ok(LeafImage {
        width,
        height,
        pixels,
    })
}

fn header_number(bytes: &[u8], pos: &mut usize, what: &str) -> Result<usize, String> {
    let token = next_token(bytes, pos).ok_or_else(|| format!("missing {what}"))?;
    token
        .parse::<usize>()
        .map_err(|_| format!("invalid {what} {token:?}"))
}

/// Next whitespace-delimited token, skipping `#` comments.
fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a str> {
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < bytes.len() && bytes[*pos] == b'#' {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        return None;
    }
    std::str::from_utf8(&bytes[start..*pos]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascii_pixmap_with_comment() {
        let src = b"P3\n# leaf\n2 1\n255\n0 0 0  10 200 30\n";
        let img = parse_ppm(src).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.pixel(0, 0), None);
        assert_eq!(img.pixel(1, 0), Some(Rgb::new(10, 200, 30)));
    }

    #[test]
    fn parses_binary_pixmap_and_scales_maxval() {
        let mut src = b"P6 1 2 15\n".to_vec();
        src.extend_from_slice(&[15, 0, 5, 0, 15, 0]);
        let img = parse_ppm(&src).unwrap();
        assert_eq!(img.pixel(0, 0), Some(Rgb::new(255, 0, 85)));
        assert_eq!(img.pixel(0, 1), Some(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn rejects_bad_headers_and_truncation() {
        assert!(parse_ppm(b"").is_err());
        assert!(parse_ppm(b"P5 1 1 255\n\x00").is_err());
        assert!(parse_ppm(b"P3 0 1 255\n").is_err());
        assert!(parse_ppm(b"P3 1 1 65535\n1 2 3").is_err());
        assert!(parse_ppm(b"P6 2 2 255\n\x01\x02").is_err());
        assert!(parse_ppm(b"P3 1 1 10\n11 0 0").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_leaf(Path::new("definitely/not/here/leaf.png")).unwrap_err();
        assert!(matches!(err, AssetError::Missing { .. }));
    }

    #[test]
    fn bundled_leaf_assets_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let png = load_leaf(&dir.join("leaf.png")).unwrap();
        let ppm = load_leaf(&dir.join("leaf.ppm")).unwrap();
        assert_eq!((png.width(), png.height()), (32, 32));
        assert!(png.pixel(16, 16).is_some());
        assert_eq!(png.pixel(0, 0), None);
        assert_eq!(png, ppm);
    }

    #[test]
    fn png_alpha_marks_transparency() {
        let mut img = image::RgbaImage::new(3, 1);
        img.put_pixel(0, 0, image::Rgba([10, 200, 30, 255]));
        img.put_pixel(1, 0, image::Rgba([10, 200, 30, 20]));
        img.put_pixel(2, 0, image::Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let leaf = parse_png(&bytes).unwrap();
        assert_eq!((leaf.width(), leaf.height()), (3, 1));
        assert_eq!(leaf.pixel(0, 0), Some(Rgb::new(10, 200, 30)));
        assert_eq!(leaf.pixel(1, 0), None);
        assert_eq!(leaf.pixel(2, 0), None);
    }

    #[test]
    fn corrupt_png_is_malformed() {
        let path = std::env::temp_dir().join(format!("leafmon-corrupt-{}.png", std::process::id()));
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"not really a png");
        std::fs::write(&path, &bytes).unwrap();

        let err = load_leaf(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, AssetError::Malformed { .. }));
    }

    #[test]
    fn fit_within_keeps_aspect() {
        let img = LeafImage::from_pixels(4, 2, vec![None; 8]).unwrap();
        assert_eq!(img.fit_within(8, 8), (8, 4));
        assert_eq!(img.fit_within(2, 8), (2, 1));
        assert_eq!(img.fit_within(0, 8), (0, 0));
    }

    #[test]
    fn resized_samples_nearest_pixel() {
        let red = Some(Rgb::new(255, 0, 0));
        let green = Some(Rgb::new(0, 255, 0));
        let img = LeafImage::from_pixels(2, 1, vec![red, green]).unwrap();
        let big = img.resized(4, 2);
        assert_eq!(big.pixel(0, 0), red);
        assert_eq!(big.pixel(1, 1), red);
        assert_eq!(big.pixel(2, 0), green);
        assert_eq!(big.pixel(3, 1), green);
    }
}
