//! Headless render context for tests and benchmarks.
//!
//! Renders into a [`SoftwareCanvas`] and records what happened in a shared
//! [`HeadlessStats`] so a test can watch a context that has been moved into
//! the render thread.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{AtlasId, ContextIndex, Image, Quad, Rect, RenderContext, Rgba, SoftwareCanvas, TextureAtlas};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub flips: u64,
    pub draw_calls: u64,
    pub uploads: u64,
    pub deletes: u64,
    pub recreates: u64,
    /// Surface size to report on the next `recreate`
    pub pending_size: Option<(u32, u32)>,
    /// Make the next `flip_buffers` fail
    pub fail_next_flip: bool,
    /// Copy of the last presented frame
    pub last_frame: Vec<Rgba>,
}

pub struct HeadlessContext {
    canvas: SoftwareCanvas,
    stats: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: SoftwareCanvas::new(width, height),
            stats: Arc::new(Mutex::new(HeadlessStats::default())),
        }
    }

    /// Handle for observing (and poking) the context from another thread.
    pub fn stats(&self) -> Arc<Mutex<HeadlessStats>> {
        Arc::clone(&self.stats)
    }

    pub fn canvas(&self) -> &SoftwareCanvas {
        &self.canvas
    }
}

impl RenderContext for HeadlessContext {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn index(&self) -> ContextIndex {
        self.canvas.index()
    }

    fn recreate(&mut self) -> Result<()> {
        let (w, h) = {
            let mut s = self.stats.lock();
            s.recreates += 1;
            s.pending_size
                .take()
                .unwrap_or((self.canvas.width(), self.canvas.height()))
        };
        self.canvas.reset(w, h);
        Ok(())
    }

    fn upload_texture(&mut self, image: &Image) -> Result<TextureAtlas> {
        self.stats.lock().uploads += 1;
        Ok(self.canvas.upload_texture(image))
    }

    fn delete_texture(&mut self, atlas: &TextureAtlas) {
        self.stats.lock().deletes += 1;
        self.canvas.delete_texture(atlas);
    }

    fn bind_texture(&mut self, atlas: AtlasId) -> Result<()> {
        self.canvas.bind_texture(atlas)
    }

    fn set_viewport_2d(&mut self, viewport: Rect) {
        self.canvas.set_viewport(viewport);
    }

    fn enable_blend(&mut self, enable: bool) {
        self.canvas.enable_blend(enable);
    }

    fn clear(&mut self, colour: Rgba) {
        self.canvas.clear(colour);
    }

    fn draw_quads(&mut self, quads: &[Quad]) -> Result<()> {
        self.canvas.draw_quads(quads)?;
        self.stats.lock().draw_calls += 1;
        Ok(())
    }

    fn flip_buffers(&mut self) -> Result<()> {
        let mut s = self.stats.lock();
        if std::mem::take(&mut s.fail_next_flip) {
            return Err(EngineError::Backend("headless flip failed".to_string()));
        }
        s.flips += 1;
        s.last_frame.clear();
        s.last_frame.extend_from_slice(self.canvas.frame());
        Ok(())
    }
}
