//! Abstract rendering pipeline.
//!
//! A [`RenderContext`] owns the drawing surface and every texture uploaded to
//! it. Textures are referenced through lightweight handles
//! ([`TextureAtlas`], [`TextureRegion`]) that carry the context generation
//! they were created in, so a handle that outlives its context fails lookup
//! with [`EngineError::StaleTexture`] instead of dangling.
//!
//! | Type | Role |
//! |------|------|
//! | [`Image`] | RGBA8 pixels in system memory |
//! | [`TextureAtlas`] | one uploaded texture |
//! | [`TextureRegion`] | normalized sub-rectangle of an atlas, half-texel inset |
//! | [`Sprite`] | positioned quad drawing one region |
//! | [`TileBatcher`] | grid of quads from one atlas, one draw call per row |
//! | [`SoftwareCanvas`] | CPU rasterizer shared by the headless and terminal backends |
//!
//! Coordinates passed to drawing calls are pixels relative to the current
//! 2D viewport.
//!
//! [`EngineError::StaleTexture`]: crate::EngineError::StaleTexture

pub mod atlas;
pub mod batcher;
pub mod headless;
pub mod image;
pub mod software;
pub mod sprite;

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::Result;

pub use atlas::{AtlasId, TextureAtlas, TextureRegion};
pub use batcher::TileBatcher;
pub use headless::{HeadlessContext, HeadlessStats};
pub use image::{Image, Rgba};
pub use software::SoftwareCanvas;
pub use sprite::Sprite;

/// Identifies one instantiation of a render context.
///
/// Every context (and every recreation of one) takes a fresh index from a
/// process-wide counter, so cached resources can tell whether they belong to
/// the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextIndex(pub u32);

static NEXT_CONTEXT_INDEX: AtomicU32 = AtomicU32::new(1);

impl ContextIndex {
    pub fn next() -> Self {
        Self(NEXT_CONTEXT_INDEX.fetch_add(1, Ordering::Relaxed))
    }
}

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w && py < self.y + self.h
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// One textured quad: four corners of position then four of texcoords,
/// corner order top-left, top-right, bottom-left, bottom-right.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    pub pos: [f32; 8],
    pub tex: [f32; 8],
}

impl Quad {
    pub fn new(x: f32, y: f32, w: f32, h: f32, region: &TextureRegion) -> Self {
        let mut q = Self::default();
        q.set_position(x, y, w, h);
        q.set_texture(region);
        q
    }

    pub fn set_position(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (x1, y1) = (x + w, y + h);
        self.pos = [x, y, x1, y, x, y1, x1, y1];
    }

    pub fn set_texture(&mut self, region: &TextureRegion) {
        let (u0, v0, u1, v1) = (region.u0, region.v0, region.u1, region.v1);
        self.tex = [u0, v0, u1, v0, u0, v1, u1, v1];
    }

    /// Screen-space bounds as (x0, y0, x1, y1)
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (self.pos[0], self.pos[1], self.pos[6], self.pos[7])
    }

    /// Texture bounds as (u0, v0, u1, v1)
    pub fn tex_bounds(&self) -> (f32, f32, f32, f32) {
        (self.tex[0], self.tex[1], self.tex[6], self.tex[7])
    }
}

/// Backend drawing surface.
///
/// Only the render thread touches a context. Implementations must not hold
/// any application lock while drawing.
pub trait RenderContext: Send {
    /// Surface width in pixels
    fn width(&self) -> u32;

    /// Surface height in pixels
    fn height(&self) -> u32;

    fn index(&self) -> ContextIndex;

    /// Re-query the surface and start a new generation. All textures from
    /// the previous generation become stale.
    fn recreate(&mut self) -> Result<()>;

    fn upload_texture(&mut self, image: &Image) -> Result<TextureAtlas>;

    fn delete_texture(&mut self, atlas: &TextureAtlas);

    /// Make `atlas` the source for subsequent draws. Rebinding the current
    /// texture is free.
    fn bind_texture(&mut self, atlas: AtlasId) -> Result<()>;

    /// Set the drawing viewport; coordinates become relative to its origin.
    fn set_viewport_2d(&mut self, viewport: Rect);

    fn enable_blend(&mut self, enable: bool);

    /// Fill the current viewport with a solid colour.
    fn clear(&mut self, colour: Rgba);

    /// Draw quads from the bound texture in one call.
    fn draw_quads(&mut self, quads: &[Quad]) -> Result<()>;

    /// Present the finished frame.
    fn flip_buffers(&mut self) -> Result<()>;

    /// Largest whole tile size at which a `w` x `h` tile grid fits the surface.
    fn calculate_tile_size(&self, w: u32, h: u32) -> u32 {
        let (sw, sh) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return 0;
        }
        // Compare aspect ratios without division.
        if sw * h > sh * w {
            sh / h
        } else {
            sw / w
        }
    }

    fn create_sprite(&self, region: TextureRegion, w: u32, h: u32) -> Sprite {
        Sprite::new(region, w as f32, h as f32)
    }

    fn create_tile_batcher(&self, n_columns: u32, n_rows: u32, tile_w: u32, tile_h: u32) -> TileBatcher {
        TileBatcher::new(n_columns, n_rows, tile_w, tile_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_indices_are_unique() {
        let a = ContextIndex::next();
        let b = ContextIndex::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn tile_size_fits_the_narrower_axis() {
        // Wide surface: height limits.
        let rc = HeadlessContext::new(400, 150);
        assert_eq!(rc.calculate_tile_size(20, 15), 10);
        // Tall surface: width limits.
        let rc = HeadlessContext::new(200, 600);
        assert_eq!(rc.calculate_tile_size(20, 15), 10);
        assert_eq!(rc.calculate_tile_size(0, 15), 0);
    }

    #[test]
    fn rect_helpers() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        let i = r.intersect(&Rect::new(12, 0, 100, 11));
        assert_eq!(i, Rect::new(12, 10, 3, 1));
        assert!(r.intersect(&Rect::new(100, 100, 1, 1)).is_empty());
    }
}
