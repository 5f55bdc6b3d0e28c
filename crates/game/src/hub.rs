//! Resources and state shared by every screen.
//!
//! The hub owns the settings, the current level number and the render-side
//! resources all screens draw with. Render resources are rebuilt only when
//! the render context index changes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::{Mutex, MutexGuard};

use bombz_core::{Level, SimpleRng};
use bombz_engine::{
    resource_error, ContextIndex, EngineConfig, Platform, Rect, RenderContext, Result, Rgba,
    Settings, TextureAtlas, TextureRegion,
};

use crate::assets::{LOGO, LOGO_TILES_H, LOGO_TILES_W};
use crate::platform::level_resource;
use crate::stats;
use crate::tiles::Tiles;
use crate::types::{LEVEL_HEIGHT, LEVEL_WIDTH};

pub const BACKGROUND: Rgba = Rgba::opaque(10, 10, 16);

/// Render-thread half of the hub.
#[derive(Default)]
pub struct HubRender {
    rc_index: Option<ContextIndex>,
    tile_size: u32,
    viewport: Rect,
    tiles: Option<Tiles>,
    logo: Option<(TextureAtlas, TextureRegion)>,
}

impl HubRender {
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Screen area holding the 20x15 tile grid
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn tiles(&self) -> Option<&Tiles> {
        self.tiles.as_ref()
    }

    pub fn logo(&self) -> Option<TextureRegion> {
        self.logo.map(|(_, r)| r)
    }

    pub fn is_loaded_for(&self, rc: &dyn RenderContext) -> bool {
        self.rc_index == Some(rc.index()) && self.tiles.is_some()
    }
}

pub struct ScreenHub {
    platform: Arc<dyn Platform>,
    config: EngineConfig,
    n_levels: u32,
    settings: Mutex<Settings>,
    level: AtomicU32,
    attempts: AtomicU32,
    render: Mutex<HubRender>,
}

impl ScreenHub {
    pub fn new(
        platform: Arc<dyn Platform>,
        config: EngineConfig,
        settings: Settings,
        n_levels: u32,
    ) -> Arc<Self> {
        let n_levels = n_levels.max(1);
        let remembered: u32 = settings.get(stats::LAST_LEVEL, 1);
        let level = config.start_level.unwrap_or(remembered).clamp(1, n_levels);
        info!("hub: {} levels, starting at {}", n_levels, level);
        Arc::new(Self {
            platform,
            config,
            n_levels,
            settings: Mutex::new(settings),
            level: AtomicU32::new(level),
            attempts: AtomicU32::new(0),
            render: Mutex::new(HubRender::default()),
        })
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn n_levels(&self) -> u32 {
        self.n_levels
    }

    pub fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock()
    }

    /// Write the settings file if anything changed. Failures are logged.
    pub fn commit_settings(&self) {
        let mut settings = self.settings.lock();
        if !settings.is_dirty() {
            return;
        }
        if let Err(e) = settings.commit() {
            warn!("hub: could not save settings: {}", e);
        }
    }

    pub fn current_level(&self) -> u32 {
        self.level.load(Ordering::Relaxed)
    }

    /// Make `n` current, clamped to the available levels, and remember it.
    pub fn set_current_level(&self, n: u32) -> u32 {
        let n = n.clamp(1, self.n_levels);
        self.level.store(n, Ordering::Relaxed);
        self.settings.lock().set(stats::LAST_LEVEL, n);
        n
    }

    pub fn is_unlocked(&self, n: u32) -> bool {
        n <= self.n_levels && stats::is_unlocked(&self.settings.lock(), n)
    }

    /// Load and parse level `n`. Each attempt varies the bomb looks.
    pub fn load_level(&self, n: u32) -> Result<Level> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        self.parse_level(n, attempt)
    }

    /// Level `n` for display only. Does not count as an attempt.
    pub fn preview_level(&self, n: u32) -> Result<Level> {
        self.parse_level(n, 0)
    }

    fn parse_level(&self, n: u32, attempt: u32) -> Result<Level> {
        let name = level_resource(n);
        let text = self.platform.load_text(&name)?;
        let mut rng = SimpleRng::new(n.wrapping_mul(7919).wrapping_add(attempt));
        Level::parse(&text, &mut rng).map_err(|e| resource_error!(name, "{}", e))
    }

    /// Lock the render resources. Render thread only.
    pub fn render(&self) -> MutexGuard<'_, HubRender> {
        self.render.lock()
    }

    /// Make sure the shared resources match `rc`, reloading them if the
    /// context has been recreated.
    pub fn ensure(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let mut r = self.render.lock();
        if r.is_loaded_for(rc) {
            return Ok(());
        }
        // Handles from an older context died with it.
        if r.rc_index == Some(rc.index()) {
            release(&mut r, rc);
        } else {
            r.tiles = None;
            r.logo = None;
        }

        let (cols, rows) = (LEVEL_WIDTH as u32, LEVEL_HEIGHT as u32);
        let size = rc.calculate_tile_size(cols, rows).max(1);
        let (vw, vh) = ((cols * size) as i32, (rows * size) as i32);
        let (w, h) = (rc.width() as i32, rc.height() as i32);
        r.viewport = Rect::new((w - vw).max(0) / 2, (h - vh).max(0) / 2, vw, vh);
        r.tile_size = size;
        info!(
            "hub: context {:?} {}x{}, tile size {}",
            rc.index(),
            w,
            h,
            size
        );

        r.tiles = Some(Tiles::load(rc, self.platform.as_ref(), size)?);
        let logo = rc.upload_texture(&self.platform.load_image(LOGO, size)?)?;
        let region = logo.region(0, 0, LOGO_TILES_W * size, LOGO_TILES_H * size);
        r.logo = Some((logo, region));
        r.rc_index = Some(rc.index());
        Ok(())
    }

    /// Clear the whole surface, then draw relative to the grid viewport.
    pub fn begin_frame(&self, rc: &mut dyn RenderContext) {
        let viewport = self.render.lock().viewport;
        rc.set_viewport_2d(Rect::new(0, 0, rc.width() as i32, rc.height() as i32));
        rc.clear(BACKGROUND);
        rc.set_viewport_2d(viewport);
    }

    /// Release the shared resources.
    pub fn delete(&self, rc: &mut dyn RenderContext) {
        let mut r = self.render.lock();
        if r.rc_index == Some(rc.index()) {
            release(&mut r, rc);
        }
        *r = HubRender::default();
    }
}

fn release(r: &mut HubRender, rc: &mut dyn RenderContext) {
    if let Some(tiles) = r.tiles.take() {
        tiles.delete(rc);
    }
    if let Some((logo, _)) = r.logo.take() {
        rc.delete_texture(&logo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{BuiltinPlatform, N_LEVELS};
    use bombz_engine::HeadlessContext;

    fn hub(start: Option<u32>) -> Arc<ScreenHub> {
        let config = EngineConfig {
            start_level: start,
            ..EngineConfig::default()
        };
        ScreenHub::new(
            Arc::new(BuiltinPlatform::new("/tmp")),
            config,
            Settings::new("/nonexistent/settings.txt"),
            N_LEVELS,
        )
    }

    #[test_log::test]
    fn viewport_is_centred() {
        let hub = hub(None);
        let mut rc = HeadlessContext::new(100, 60);
        hub.ensure(&mut rc).unwrap();
        let r = hub.render();
        // 100/20 = 5, 60/15 = 4: the height decides.
        assert_eq!(r.tile_size(), 4);
        assert_eq!(r.viewport(), Rect::new(10, 0, 80, 60));
        assert!(r.tiles().is_some());
        assert!(r.logo().is_some());
    }

    #[test_log::test]
    fn resources_reload_only_for_a_new_context() {
        let hub = hub(None);
        let mut rc = HeadlessContext::new(40, 30);
        hub.ensure(&mut rc).unwrap();
        let live = rc.canvas().live_textures();
        hub.ensure(&mut rc).unwrap();
        assert_eq!(rc.canvas().live_textures(), live);

        rc.recreate().unwrap();
        assert!(!hub.render().is_loaded_for(&rc));
        hub.ensure(&mut rc).unwrap();
        assert!(hub.render().is_loaded_for(&rc));

        hub.delete(&mut rc);
        assert_eq!(rc.canvas().live_textures(), 0);
        assert!(hub.render().tiles().is_none());
    }

    #[test]
    fn level_selection_is_clamped_and_remembered() {
        let hub = hub(Some(99));
        assert_eq!(hub.current_level(), N_LEVELS);
        assert_eq!(hub.set_current_level(0), 1);
        assert_eq!(hub.settings().get::<u32>(stats::LAST_LEVEL, 0), 1);
        assert!(hub.is_unlocked(1));
        assert!(!hub.is_unlocked(2));
    }

    #[test]
    fn levels_load_through_the_platform() {
        let hub = hub(None);
        let level = hub.load_level(1).unwrap();
        assert!(level.n_bombs() > 0);
        assert!(hub.load_level(N_LEVELS + 1).is_err());
    }
}
