//! [`RenderContext`] on a terminal.

use crossterm::terminal;
use log::{debug, info};

use bombz_engine::{
    AtlasId, ContextIndex, EngineError, Image, Quad, Rect, RenderContext, Result, Rgba,
    SoftwareCanvas, TextureAtlas,
};

use crate::fb::FrameBuffer;
use crate::renderer::TerminalRenderer;

/// Fallback when the terminal will not report a size.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

pub struct TermRenderContext {
    canvas: SoftwareCanvas,
    term: TerminalRenderer,
    fb: FrameBuffer,
}

fn terminal_pixels() -> (u32, u32) {
    let (cols, rows) = terminal::size().unwrap_or(DEFAULT_SIZE);
    (cols as u32, rows as u32 * 2)
}

impl TermRenderContext {
    /// Enter the alternate screen and size the surface to the terminal.
    pub fn new() -> Result<Self> {
        let mut term = TerminalRenderer::new();
        term.enter()?;
        let (w, h) = terminal_pixels();
        info!("term: {}x{} pixel surface", w, h);
        Ok(Self {
            canvas: SoftwareCanvas::new(w, h),
            term,
            fb: FrameBuffer::new(0, 0),
        })
    }

    /// Restore the terminal. Also happens on drop.
    pub fn shutdown(&mut self) -> Result<()> {
        self.term.exit().map_err(EngineError::from)
    }
}

impl RenderContext for TermRenderContext {
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
        let (w, h) = terminal_pixels();
        debug!("term: recreate at {}x{}", w, h);
        self.canvas.reset(w, h);
        self.term.invalidate();
        Ok(())
    }

    fn upload_texture(&mut self, image: &Image) -> Result<TextureAtlas> {
        Ok(self.canvas.upload_texture(image))
    }

    fn delete_texture(&mut self, atlas: &TextureAtlas) {
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
        self.canvas.draw_quads(quads)
    }

    fn flip_buffers(&mut self) -> Result<()> {
        self.fb
            .fill_from_pixels(self.canvas.frame(), self.canvas.width(), self.canvas.height());
        self.term.draw_swap(&mut self.fb)?;
        Ok(())
    }
}
