use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::app::CELL_DOTS;
use crate::surface::SurfaceAdapter;

const BRAILLE_BASE: u32 = 0x2800;

/// Bit for the dot at column `dx` (0..2), row `dy` (0..4) of a braille cell.
fn dot_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        (0, dy) => 1 << dy,
        (_, dy) => 1 << (dy + 3),
    }
}

/// Down-samples the surface bitmap onto braille cells, one dot per logical unit.
pub struct PadView<'a> {
    surface: &'a SurfaceAdapter,
}

impl<'a> PadView<'a> {
    pub fn new(surface: &'a SurfaceAdapter) -> Self {
        Self { surface }
    }

    /// Braille glyph for the cell at (`col`, `row`) of the pad, if any dot is inked.
    pub fn glyph(&self, col: u16, row: u16) -> Option<char> {
        let bitmap = self.surface.bitmap()?;
        let density = self.surface.pixel_density();
        let block = density.ceil().max(1.0) as u32;

        let mut bits = 0u8;
        for dy in 0..CELL_DOTS.1 as u32 {
            for dx in 0..CELL_DOTS.0 as u32 {
                let lx = f64::from(col) * CELL_DOTS.0 + f64::from(dx);
                let ly = f64::from(row) * CELL_DOTS.1 + f64::from(dy);
                let (px, py) = ((lx * density) as u32, (ly * density) as u32);
                if bitmap.any_in(px, py, block, block) {
                    bits |= dot_bit(dx, dy);
                }
            }
        }

        if bits == 0 {
            None
        } else {
            char::from_u32(BRAILLE_BASE + u32::from(bits))
        }
    }
}

impl Widget for PadView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (r, g, b) = self.surface.style().ink;
        let style = Style::default().fg(Color::Rgb(r, g, b));

        for row in 0..area.height {
            for col in 0..area.width {
                let Some(glyph) = self.glyph(col, row) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(glyph);
                    cell.set_style(style);
                }
            }
        }
    }
}
