//! Texture atlas and region handles.

use super::ContextIndex;

/// Names one texture inside one render context generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasId {
    pub generation: ContextIndex,
    pub slot: u32,
}

/// An uploaded texture. Dropping the handle does not free the texture;
/// call [`RenderContext::delete_texture`](super::RenderContext::delete_texture)
/// or let the context generation end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAtlas {
    id: AtlasId,
    width: u32,
    height: u32,
}

impl TextureAtlas {
    pub fn new(id: AtlasId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> AtlasId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Region covering the pixel rectangle (x, y, w, h).
    ///
    /// Coordinates are inset by half a texel so filtering never samples
    /// the neighbouring cell.
    pub fn region(&self, x: u32, y: u32, w: u32, h: u32) -> TextureRegion {
        let aw = self.width as f32;
        let ah = self.height as f32;
        let u0 = (x as f32 + 0.5) / aw;
        let v0 = (y as f32 + 0.5) / ah;
        TextureRegion {
            atlas: self.id,
            u0,
            v0,
            u1: u0 + (w.saturating_sub(1)) as f32 / aw,
            v1: v0 + (h.saturating_sub(1)) as f32 / ah,
            width: w,
            height: h,
        }
    }
}

/// Normalized sub-rectangle of an atlas. Does not own the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRegion {
    pub atlas: AtlasId,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    /// Source size in texels
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas() -> TextureAtlas {
        let id = AtlasId {
            generation: ContextIndex(7),
            slot: 0,
        };
        TextureAtlas::new(id, 64, 32)
    }

    #[test]
    fn region_is_inset_by_half_a_texel() {
        let r = atlas().region(8, 4, 16, 8);
        assert!((r.u0 - 8.5 / 64.0).abs() < 1e-6);
        assert!((r.v0 - 4.5 / 32.0).abs() < 1e-6);
        assert!((r.u1 - 23.5 / 64.0).abs() < 1e-6);
        assert!((r.v1 - 11.5 / 32.0).abs() < 1e-6);
        assert_eq!((r.width, r.height), (16, 8));
        assert_eq!(r.atlas.generation, ContextIndex(7));
    }

    #[test]
    fn single_texel_region_has_zero_extent() {
        let r = atlas().region(0, 0, 1, 1);
        assert_eq!(r.u0, r.u1);
        assert_eq!(r.v0, r.v1);
    }
}
