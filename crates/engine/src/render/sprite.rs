//! A movable quad drawing one texture region.

use super::{Quad, RenderContext, TextureRegion};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Sprite {
    region: TextureRegion,
    quad: Quad,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Sprite {
    pub fn new(region: TextureRegion, w: f32, h: f32) -> Self {
        Self {
            region,
            quad: Quad::new(0.0, 0.0, w, h, &region),
            x: 0.0,
            y: 0.0,
            w,
            h,
        }
    }

    pub fn set_texture(&mut self, region: TextureRegion) {
        self.region = region;
        self.quad.set_texture(&region);
    }

    pub fn region(&self) -> &TextureRegion {
        &self.region
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x as f32;
        self.y = y as f32;
        self.quad.set_position(self.x, self.y, self.w, self.h);
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn render(&self, rc: &mut dyn RenderContext) -> Result<()> {
        rc.bind_texture(self.region.atlas)?;
        rc.draw_quads(std::slice::from_ref(&self.quad))
    }
}
