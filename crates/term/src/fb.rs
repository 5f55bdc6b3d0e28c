//! Framebuffer and style types for terminal rendering.

use bombz_engine::Rgba;

/// Upper half block; foreground paints the top pixel of the cell.
pub const HALF_BLOCK: char = '\u{2580}';

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgba> for Rgb {
    fn from(c: Rgba) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

/// Per-cell colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// 2D framebuffer of styled character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize the framebuffer.
    ///
    /// This preserves the underlying allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.cells.resize(len, Cell::default());
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Fold a `width × height` pixel frame into half-block cells, resizing
    /// to `width × ceil(height / 2)`. A missing bottom row reads as black.
    pub fn fill_from_pixels(&mut self, pixels: &[Rgba], width: u32, height: u32) {
        let cols = width.min(u16::MAX as u32) as u16;
        let rows = height.div_ceil(2).min(u16::MAX as u32) as u16;
        self.resize(cols, rows);

        let pixel = |x: u32, y: u32| -> Rgb {
            if y >= height {
                return Rgb::default();
            }
            pixels
                .get((y * width + x) as usize)
                .map_or(Rgb::default(), |&p| p.into())
        };

        for cy in 0..rows {
            for cx in 0..cols {
                let (x, y) = (cx as u32, cy as u32 * 2);
                let style = CellStyle {
                    fg: pixel(x, y),
                    bg: pixel(x, y + 1),
                };
                self.set(cx, cy, Cell { ch: HALF_BLOCK, style });
            }
        }
    }
}
