//! CPU rasterizer used by the headless and terminal backends.
//!
//! Draws axis-aligned textured quads with nearest-texel sampling into an
//! opaque RGBA frame. Textures live in a slot arena tagged with the canvas
//! generation; resizing starts a new generation and drops them all.

use log::debug;

use super::{AtlasId, ContextIndex, Image, Quad, Rect, Rgba, TextureAtlas};
use crate::error::{EngineError, Result};

pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    frame: Vec<Rgba>,
    generation: ContextIndex,
    textures: Vec<Option<Image>>,
    bound: Option<AtlasId>,
    viewport: Rect,
    blend: bool,
    draw_calls: u64,
    texture_binds: u64,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: vec![Rgba::BLACK; (width as usize) * (height as usize)],
            generation: ContextIndex::next(),
            textures: Vec::new(),
            bound: None,
            viewport: Rect::new(0, 0, width as i32, height as i32),
            blend: false,
            draw_calls: 0,
            texture_binds: 0,
        }
    }

    /// Start a new generation at the given size.
    pub fn reset(&mut self, width: u32, height: u32) {
        let live = self.textures.iter().filter(|t| t.is_some()).count();
        debug!(
            "canvas: new generation {}x{} (dropping {} textures of {:?})",
            width, height, live, self.generation
        );
        *self = Self {
            draw_calls: self.draw_calls,
            texture_binds: self.texture_binds,
            ..Self::new(width, height)
        };
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> ContextIndex {
        self.generation
    }

    pub fn frame(&self) -> &[Rgba] {
        &self.frame
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.frame[(y * self.width + x) as usize])
    }

    /// Draw calls issued since creation
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Texture binds that actually switched texture
    pub fn texture_binds(&self) -> u64 {
        self.texture_binds
    }

    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    pub fn upload_texture(&mut self, image: &Image) -> TextureAtlas {
        let slot = match self.textures.iter().position(Option::is_none) {
            Some(i) => {
                self.textures[i] = Some(image.clone());
                i
            }
            None => {
                self.textures.push(Some(image.clone()));
                self.textures.len() - 1
            }
        };
        let id = AtlasId {
            generation: self.generation,
            slot: slot as u32,
        };
        TextureAtlas::new(id, image.width(), image.height())
    }

    pub fn delete_texture(&mut self, atlas: &TextureAtlas) {
        let id = atlas.id();
        if id.generation != self.generation {
            return;
        }
        if let Some(t) = self.textures.get_mut(id.slot as usize) {
            *t = None;
        }
        if self.bound == Some(id) {
            self.bound = None;
        }
    }

    fn texture(&self, id: AtlasId) -> Result<&Image> {
        if id.generation != self.generation {
            return Err(EngineError::StaleTexture(id));
        }
        self.textures
            .get(id.slot as usize)
            .and_then(Option::as_ref)
            .ok_or(EngineError::StaleTexture(id))
    }

    pub fn bind_texture(&mut self, id: AtlasId) -> Result<()> {
        if self.bound == Some(id) {
            return Ok(());
        }
        self.texture(id)?;
        self.bound = Some(id);
        self.texture_binds += 1;
        Ok(())
    }

    /// Drawing coordinates become relative to the viewport origin; output is
    /// clipped to the viewport.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn enable_blend(&mut self, enable: bool) {
        self.blend = enable;
    }

    pub fn clear(&mut self, colour: Rgba) {
        let clip = self.clip_rect();
        let colour = Rgba::opaque(colour.r, colour.g, colour.b);
        for y in clip.y..clip.y + clip.h {
            let row = (y as u32 * self.width) as usize;
            for x in clip.x..clip.x + clip.w {
                self.frame[row + x as usize] = colour;
            }
        }
    }

    fn clip_rect(&self) -> Rect {
        let screen = Rect::new(0, 0, self.width as i32, self.height as i32);
        self.viewport.intersect(&screen)
    }

    pub fn draw_quads(&mut self, quads: &[Quad]) -> Result<()> {
        let id = self.bound.ok_or(EngineError::NoTexture)?;
        let clip = self.clip_rect();
        if id.generation != self.generation {
            return Err(EngineError::StaleTexture(id));
        }
        // Borrow the texture and the frame as separate fields.
        let tex = self
            .textures
            .get(id.slot as usize)
            .and_then(Option::as_ref)
            .ok_or(EngineError::StaleTexture(id))?;

        let (ox, oy) = (self.viewport.x as f32, self.viewport.y as f32);
        let (aw, ah) = (tex.width() as f32, tex.height() as f32);

        for q in quads {
            let (x0, y0, x1, y1) = q.bounds();
            let (u0, v0, u1, v1) = q.tex_bounds();
            let (w, h) = (x1 - x0, y1 - y0);
            if w <= 0.0 || h <= 0.0 {
                continue;
            }
            let px0 = ((x0 + ox).round() as i32).max(clip.x);
            let py0 = ((y0 + oy).round() as i32).max(clip.y);
            let px1 = ((x1 + ox).round() as i32).min(clip.x + clip.w);
            let py1 = ((y1 + oy).round() as i32).min(clip.y + clip.h);

            for py in py0..py1 {
                let fy = (py as f32 + 0.5 - oy - y0) / h;
                let ty = ((v0 + (v1 - v0) * fy) * ah).floor().clamp(0.0, ah - 1.0) as u32;
                let row = (py as u32 * self.width) as usize;
                for px in px0..px1 {
                    let fx = (px as f32 + 0.5 - ox - x0) / w;
                    let tx = ((u0 + (u1 - u0) * fx) * aw).floor().clamp(0.0, aw - 1.0) as u32;
                    let src = tex.get(tx, ty).unwrap_or(Rgba::TRANSPARENT);
                    let dst = &mut self.frame[row + px as usize];
                    *dst = if self.blend {
                        src.over(*dst)
                    } else {
                        Rgba::opaque(src.r, src.g, src.b)
                    };
                }
            }
        }
        self.draw_calls += 1;
        Ok(())
    }
}
