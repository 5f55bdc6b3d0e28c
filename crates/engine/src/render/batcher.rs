//! Tile batching: a whole grid drawn from one atlas.
//!
//! Screen positions are computed once at construction. Updating a cell only
//! rewrites its texture coordinates, and rendering issues one draw call per
//! row.

use super::{AtlasId, Quad, RenderContext, TextureRegion};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TileBatcher {
    n_columns: u32,
    n_rows: u32,
    tile_w: u32,
    tile_h: u32,
    quads: Vec<Quad>,
    atlas: Option<AtlasId>,
}

impl TileBatcher {
    pub fn new(n_columns: u32, n_rows: u32, tile_w: u32, tile_h: u32) -> Self {
        let mut quads = Vec::with_capacity((n_columns * n_rows) as usize);
        for y in 0..n_rows {
            for x in 0..n_columns {
                let mut q = Quad::default();
                q.set_position(
                    (x * tile_w) as f32,
                    (y * tile_h) as f32,
                    tile_w as f32,
                    tile_h as f32,
                );
                quads.push(q);
            }
        }
        Self {
            n_columns,
            n_rows,
            tile_w,
            tile_h,
            quads,
            atlas: None,
        }
    }

    pub fn n_columns(&self) -> u32 {
        self.n_columns
    }

    pub fn n_rows(&self) -> u32 {
        self.n_rows
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_w, self.tile_h)
    }

    /// Quad for cell (x, y)
    pub fn quad_at(&self, x: u32, y: u32) -> Option<&Quad> {
        self.index(x, y).map(|i| &self.quads[i])
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.n_columns || y >= self.n_rows {
            return None;
        }
        Some((y * self.n_columns + x) as usize)
    }

    /// Point cell (x, y) at `region`. Out-of-range cells are ignored.
    ///
    /// Every region must come from the same atlas.
    #[inline]
    pub fn set_texture_at(&mut self, region: &TextureRegion, x: u32, y: u32) {
        debug_assert!(
            self.atlas.map_or(true, |a| a == region.atlas),
            "tile batcher mixes atlases"
        );
        self.atlas = Some(region.atlas);
        if let Some(i) = self.index(x, y) {
            self.quads[i].set_texture(region);
        }
    }

    /// Draw every row. Nothing is drawn until at least one cell has a texture.
    pub fn render(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let Some(atlas) = self.atlas else {
            return Ok(());
        };
        rc.bind_texture(atlas)?;
        for row in self.quads.chunks(self.n_columns.max(1) as usize) {
            rc.draw_quads(row)?;
        }
        Ok(())
    }
}
