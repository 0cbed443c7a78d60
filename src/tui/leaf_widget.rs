//! Leaf image widget.
//!
//! Each terminal cell shows two vertically stacked pixels with the upper half
//! block: foreground is the top pixel, background the bottom one.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::leaf::{LeafImage, Rgb};

const UPPER_HALF_BLOCK: &str = "\u{2580}";

/// Draws an already recolored leaf, scaled to fit and centred.
pub struct LeafWidget<'a> {
    pub image: &'a LeafImage,
}

impl Widget for LeafWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (w, h) = self
            .image
            .fit_within(area.width as usize, area.height as usize * 2);
        if w == 0 || h == 0 {
            return;
        }
        let scaled = self.image.resized(w, h);

        let cols = w as u16;
        let rows = h.div_ceil(2) as u16;
        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let top = scaled.pixel(col as usize, row as usize * 2);
                let bottom = scaled.pixel(col as usize, row as usize * 2 + 1);
                if top.is_none() && bottom.is_none() {
                    continue;
                }
                let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) else {
                    continue;
                };
                cell.set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(to_color(top))
                    .set_bg(to_color(bottom));
            }
        }
    }
}

fn to_color(px: Option<Rgb>) -> Color {
    match px {
        Some(Rgb { r, g, b }) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_pixels_per_cell_centred() {
        let green = Some(Rgb::new(0, 200, 0));
        let brown = Some(Rgb::new(120, 80, 20));
        let image = LeafImage::from_pixels(1, 2, vec![green, brown]).unwrap();

        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        LeafWidget { image: &image }.render(area, &mut buf);

        let cell = buf.cell((1, 0)).unwrap();
        assert_eq!(cell.symbol(), UPPER_HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(0, 200, 0));
        assert_eq!(cell.bg, Color::Rgb(120, 80, 20));
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn fully_transparent_cells_are_left_alone() {
        let image = LeafImage::from_pixels(1, 2, vec![None, None]).unwrap();
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        LeafWidget { image: &image }.render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }
}
