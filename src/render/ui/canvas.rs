//! Drawing-surface to terminal-cell sampling.
//!
//! Each terminal cell shows two vertically stacked pixels using the upper half block: the
//! foreground paints the top pixel, the background the bottom one. The page is scaled to fit
//! the panel with its aspect ratio preserved and centered; cells outside it are letterbox.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

const UPPER_HALF: &str = "▀";

/// Sampled pixels for a `cols` x `rows` cell area; `None` marks letterbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    cols: u16,
    rows: u16,
    /// Row-major, `cols` wide and `rows * 2` tall
    pixels: Vec<Option<[u8; 3]>>,
}

impl CellGrid {
    pub fn empty(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            pixels: vec![None; cols as usize * rows as usize * 2],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// (top, bottom) pixel colors of one cell
    pub fn cell(&self, col: u16, row: u16) -> (Option<[u8; 3]>, Option<[u8; 3]>) {
        if col >= self.cols || row >= self.rows {
            return (None, None);
        }
        let width = self.cols as usize;
        let top = (row as usize * 2) * width + col as usize;
        (self.pixels[top], self.pixels[top + width])
    }

    /// Number of pixel slots covered by the page
    pub fn covered(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }
}

/// Scale `source` into a `cols` x `rows` cell grid.
pub fn sample_cells(source: &RgbaImage, cols: u16, rows: u16) -> CellGrid {
    let mut grid = CellGrid::empty(cols, rows);
    let (src_w, src_h) = source.dimensions();
    if cols == 0 || rows == 0 || src_w == 0 || src_h == 0 {
        return grid;
    }

    let target_w = f64::from(cols);
    let target_h = f64::from(rows) * 2.0;
    let scale = (target_w / f64::from(src_w)).min(target_h / f64::from(src_h));
    // Epsilon keeps exact fits from flooring one pixel short
    let fit = |len: u32| (f64::from(len) * scale + 1e-6).floor() as u32;
    let fit_w = fit(src_w).clamp(1, u32::from(cols));
    let fit_h = fit(src_h).clamp(1, u32::from(rows) * 2);

    let scaled = imageops::resize(source, fit_w, fit_h, FilterType::Triangle);
    let offset_x = (u32::from(cols) - fit_w) / 2;
    let offset_y = (u32::from(rows) * 2 - fit_h) / 2;
    let width = cols as usize;

    for (x, y, pixel) in scaled.enumerate_pixels() {
        let index = (y + offset_y) as usize * width + (x + offset_x) as usize;
        grid.pixels[index] = Some(over_white(pixel));
    }
    grid
}

fn over_white(pixel: &Rgba<u8>) -> [u8; 3] {
    let [r, g, b, a] = pixel.0;
    let blend = |c: u8| -> u8 {
        let alpha = u16::from(a);
        ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8
    };
    [blend(r), blend(g), blend(b)]
}

/// Widget painting a [`CellGrid`] into its area.
pub struct SlideCanvas<'a> {
    grid: &'a CellGrid,
    letterbox: Color,
}

impl<'a> SlideCanvas<'a> {
    pub fn new(grid: &'a CellGrid, letterbox: Color) -> Self {
        Self { grid, letterbox }
    }
}

impl Widget for SlideCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let to_color = |pixel: Option<[u8; 3]>| {
            pixel.map_or(self.letterbox, |[r, g, b]| Color::Rgb(r, g, b))
        };
        for row in 0..area.height.min(self.grid.rows()) {
            for col in 0..area.width.min(self.grid.cols()) {
                let (top, bottom) = self.grid.cell(col, row);
                buf.get_mut(area.x + col, area.y + row)
                    .set_symbol(UPPER_HALF)
                    .set_fg(to_color(top))
                    .set_bg(to_color(bottom));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn wide_pages_are_letterboxed_vertically() {
        // 4:3 page into 40 cols x 10 rows (40 x 20 pixels): height-bound at 26 x 20
        let grid = sample_cells(&solid(400, 300, [255, 0, 0, 255]), 40, 10);
        assert_eq!(grid.covered(), 26 * 20);
        assert_eq!(grid.cell(0, 0), (None, None));
        assert_eq!(grid.cell(20, 5), (Some([255, 0, 0]), Some([255, 0, 0])));
    }

    #[test]
    fn transparent_pixels_blend_to_white() {
        let grid = sample_cells(&solid(10, 20, [0, 0, 0, 0]), 10, 10);
        assert_eq!(grid.cell(5, 5).0, Some([255, 255, 255]));
    }

    #[test]
    fn empty_inputs_produce_empty_grids() {
        let grid = sample_cells(&RgbaImage::new(0, 0), 10, 10);
        assert_eq!(grid.covered(), 0);
        assert_eq!(sample_cells(&solid(4, 4, [1, 2, 3, 255]), 0, 5).covered(), 0);
    }

    #[test]
    fn canvas_paints_half_blocks() {
        let grid = sample_cells(&solid(1, 2, [10, 20, 30, 255]), 1, 1);
        let area = Rect::new(0, 0, 1, 1);
        let mut buffer = Buffer::empty(area);
        SlideCanvas::new(&grid, Color::Black).render(area, &mut buffer);

        let cell = buffer.get(0, 0);
        assert_eq!(cell.symbol(), UPPER_HALF);
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));
    }
}
