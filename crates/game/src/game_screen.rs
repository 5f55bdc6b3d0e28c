//! The screen where a level is played.
//!
//! The logic thread ticks the [`Playfield`] with the held controls and asks
//! for a render whenever something visible changed. Once an attempt is over
//! the result stays on screen for [`OUTCOME_TICKS`] before the next level (or
//! a retry) starts.

use std::sync::{Arc, Weak};

use log::{debug, info};
use parking_lot::Mutex;

use bombz_core::{Outcome, Playfield, Tile, LEVEL_SIZE};
use bombz_engine::{
    handle_context_event, Application, ContextIndex, RenderContext, Renderer, RendererWithState,
    Result, Screen, TileBatcher,
};

use crate::assets::{ALPHA_BOMB1, ALPHA_BOMB2, ALPHA_FLASH, ALPHA_MATCH};
use crate::hub::ScreenHub;
use crate::menu::MenuScreen;
use crate::stats;
use crate::text::TextSheet;
use crate::types::{Event, Keys, RenderState, LEVEL_HEIGHT, LEVEL_WIDTH};

/// Ticks the result of an attempt is shown for
pub const OUTCOME_TICKS: u32 = 50;

pub(crate) struct GameModel {
    level_no: u32,
    field: Playfield,
    over_ticks: u32,
}

/// What to do once a tick has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum After {
    Stay,
    Play(u32),
    Menu,
}

pub struct GameScreen {
    me: Weak<GameScreen>,
    hub: Arc<ScreenHub>,
    model: Arc<Mutex<GameModel>>,
    renderer: RendererWithState<GameRenderer>,
}

impl GameScreen {
    pub fn new(hub: Arc<ScreenHub>, level_no: u32) -> Result<Arc<Self>> {
        let level_no = hub.set_current_level(level_no);
        let field = Self::start_level(&hub, level_no)?;
        let model = Arc::new(Mutex::new(GameModel {
            level_no,
            field,
            over_ticks: 0,
        }));
        let renderer = GameRenderer::new(Arc::clone(&hub), Arc::clone(&model));
        Ok(Arc::new_cyclic(|me| Self {
            me: me.clone(),
            hub,
            model,
            renderer: RendererWithState::new("game", renderer),
        }))
    }

    fn start_level(hub: &ScreenHub, level_no: u32) -> Result<Playfield> {
        let level = hub.load_level(level_no)?;
        info!(
            "game: level {} with {} bombs, {}s",
            level_no,
            level.n_bombs(),
            level.time_limit()
        );
        stats::record_start(&mut hub.settings(), level_no, level.time_limit());
        Ok(Playfield::new(level).with_tick_ms(hub.config().tick_ms))
    }

    pub fn level_no(&self) -> u32 {
        self.model.lock().level_no
    }

    pub fn outcome(&self) -> Outcome {
        self.model.lock().field.outcome()
    }

    pub fn time_left(&self) -> u32 {
        self.model.lock().field.time_left()
    }

    fn restart(&self, level_no: u32) -> Result<()> {
        let level_no = self.hub.set_current_level(level_no);
        let field = Self::start_level(&self.hub, level_no)?;
        let mut m = self.model.lock();
        m.level_no = level_no;
        m.field = field;
        m.over_ticks = 0;
        Ok(())
    }

    /// Apply one tick. Returns whether the display changed and what comes
    /// next.
    fn tick(&self, keys: Keys) -> (bool, After) {
        let mut m = self.model.lock();
        if !m.field.outcome().is_over() {
            let update = m.field.tick(keys);
            let outcome = m.field.outcome();
            if outcome.is_over() {
                self.record(&m, outcome);
            }
            return (update, After::Stay);
        }

        m.over_ticks += 1;
        if m.over_ticks < OUTCOME_TICKS {
            return (false, After::Stay);
        }
        let after = match m.field.outcome() {
            Outcome::Won if m.level_no < self.hub.n_levels() => After::Play(m.level_no + 1),
            Outcome::Won => After::Menu,
            _ => After::Play(m.level_no),
        };
        (false, after)
    }

    fn record(&self, m: &GameModel, outcome: Outcome) {
        info!("game: level {} over, {:?}", m.level_no, outcome);
        {
            let mut settings = self.hub.settings();
            if outcome == Outcome::Won {
                stats::record_success(
                    &mut settings,
                    m.level_no,
                    m.field.time_left(),
                    m.field.pusher().moves(),
                    m.field.detonators_left(),
                );
            } else {
                stats::record_failure(&mut settings, m.level_no);
            }
        }
        self.hub.commit_settings();
    }
}

impl Screen for GameScreen {
    fn name(&self) -> &str {
        "game"
    }

    fn render_state(&self) -> RenderState {
        self.renderer.render_state()
    }

    fn request_render_state(&self, state: RenderState) {
        self.renderer.request_render_state(state);
    }

    fn service_render_request(&self, rc: &mut dyn RenderContext) -> Result<()> {
        self.renderer.service_render_request(rc)
    }

    fn teardown_rendering(&self, rc: &mut dyn RenderContext) -> Result<()> {
        self.renderer.teardown(rc)
    }

    fn run(&self, app: &Arc<Application>) -> Result<()> {
        app.enable_tap_events(false);
        self.renderer.request_render_state(RenderState::Rendering);
        app.request_render(false);
        let tick_ms = self.hub.config().tick_ms;

        loop {
            match app.get_next_event(tick_ms) {
                Event::Tick => {
                    let (update, after) = self.tick(app.controls_state());
                    match after {
                        After::Stay if update => app.request_render(false),
                        After::Stay => {}
                        After::Play(n) => {
                            self.restart(n)?;
                            app.request_render(false);
                        }
                        After::Menu => {
                            app.set_screen(MenuScreen::main(Arc::clone(&self.hub)));
                            return Ok(());
                        }
                    }
                }
                Event::Pause => {
                    if let Some(me) = self.me.upgrade() {
                        app.set_screen(MenuScreen::pause(Arc::clone(&self.hub), me));
                        return Ok(());
                    }
                }
                Event::Stop => return Ok(()),
                Event::Resume => app.request_render(false),
                event @ (Event::RenderContextCreated | Event::RenderContextDestroyed) => {
                    handle_context_event(app, self, event);
                }
                Event::Tap { .. } => {}
            }
        }
    }
}

/// Translation tag for the banner shown once an attempt is over.
fn outcome_tag(outcome: Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Playing => None,
        Outcome::Won => Some("won"),
        Outcome::TimeUp => Some("time_up"),
        Outcome::Exploded => Some("exploded"),
    }
}

struct GameRenderer {
    hub: Arc<ScreenHub>,
    model: Arc<Mutex<GameModel>>,
    index: Option<ContextIndex>,
    batcher: Option<TileBatcher>,
    /// Tiles the batcher currently shows
    shown: Vec<Tile>,
    hud: Option<(String, TextSheet)>,
}

impl GameRenderer {
    fn new(hub: Arc<ScreenHub>, model: Arc<Mutex<GameModel>>) -> Self {
        Self {
            hub,
            model,
            index: None,
            batcher: None,
            shown: Vec::new(),
            hud: None,
        }
    }
}

impl Renderer for GameRenderer {
    fn init_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        if self.index == Some(rc.index()) && self.batcher.is_some() {
            return Ok(());
        }
        self.hub.ensure(rc)?;
        let ts = self.hub.render().tile_size();
        self.batcher = Some(rc.create_tile_batcher(
            LEVEL_WIDTH as u32,
            LEVEL_HEIGHT as u32,
            ts,
            ts,
        ));
        self.shown.clear();
        self.hud = None;
        self.index = Some(rc.index());
        debug!("game: rendering initialised at {}px tiles", ts);
        Ok(())
    }

    fn free_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        if let Some((_, sheet)) = self.hud.take() {
            if self.index == Some(rc.index()) {
                sheet.delete(rc);
            }
        }
        self.batcher = None;
        self.shown.clear();
        self.index = None;
        Ok(())
    }

    fn delete_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        self.free_rendering(rc)?;
        self.hub.delete(rc);
        Ok(())
    }

    fn render(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        if self.index != Some(rc.index()) {
            self.free_rendering(rc)?;
            self.init_rendering(rc)?;
        }
        self.hub.begin_frame(rc);

        let model = self.model.lock();
        let hub = self.hub.render();
        let (Some(tiles), Some(batcher)) = (hub.tiles(), self.batcher.as_mut()) else {
            return Ok(());
        };
        let ts = hub.tile_size() as i32;
        let level = model.field.level();

        if self.shown.len() != LEVEL_SIZE {
            tiles.fill(batcher, level);
            self.shown = level.tiles().to_vec();
        } else {
            for (i, (&tile, shown)) in level.tiles().iter().zip(self.shown.iter_mut()).enumerate() {
                if tile != *shown {
                    let (x, y) = (i % LEVEL_WIDTH, i / LEVEL_WIDTH);
                    batcher.set_texture_at(&tiles.tile(tile), x as u32, y as u32);
                    *shown = tile;
                }
            }
        }
        rc.enable_blend(false);
        batcher.render(rc)?;

        rc.enable_blend(true);
        let flash = tiles.alpha(ALPHA_FLASH);
        for (i, _) in level.tiles().iter().enumerate().filter(|&(_, &t)| t == Tile::EXPLO00) {
            let (x, y) = ((i % LEVEL_WIDTH) as i32, (i / LEVEL_WIDTH) as i32);
            let mut sprite = rc.create_sprite(flash, 3 * ts as u32, 3 * ts as u32);
            sprite.set_position((x - 1) * ts, (y - 1) * ts);
            sprite.render(rc)?;
        }

        let pusher = model.field.pusher();
        if let Some(bomb) = pusher.pushing_bomb() {
            let cell = if bomb == Tile::BOMB2 || bomb.is_bomb2_fused() {
                ALPHA_BOMB2
            } else {
                ALPHA_BOMB1
            };
            let mut sprite = rc.create_sprite(tiles.alpha(cell), ts as u32, ts as u32);
            let (x, y) = pusher.bomb_pixel_pos(ts);
            sprite.set_position(x, y);
            sprite.render(rc)?;
        }
        let mut sprite = rc.create_sprite(tiles.pusher(pusher.direction()), ts as u32, ts as u32);
        let (x, y) = pusher.pixel_pos(ts);
        sprite.set_position(x, y);
        sprite.render(rc)?;

        if pusher.has_match() {
            let mut sprite = rc.create_sprite(tiles.alpha(ALPHA_MATCH), ts as u32, ts as u32);
            sprite.set_position((LEVEL_WIDTH as i32 - 1) * ts, 0);
            sprite.render(rc)?;
        }

        let outcome = model.field.outcome();
        let text = format!("L{:02} {:03}", model.level_no, model.field.time_left());
        let viewport = hub.viewport();
        drop(hub);
        drop(model);

        let banner = outcome_tag(outcome)
            .map(|tag| self.hub.platform().translate(tag))
            .unwrap_or_default();
        let key = format!("{}|{}", text, banner);
        if self.hud.as_ref().map_or(true, |(k, _)| *k != key) {
            if let Some((_, old)) = self.hud.take() {
                old.delete(rc);
            }
            let labels = [text, banner];
            let scale = (ts as u32 / 3).max(1);
            self.hud = Some((key, TextSheet::build(rc, &labels, scale)?));
        }
        if let Some((_, sheet)) = &self.hud {
            if let Some(mut s) = sheet.sprite(rc, 0, false) {
                s.set_position(1, 1);
                s.render(rc)?;
            }
            if outcome.is_over() {
                let (w, h) = sheet.size(1);
                if let Some(mut s) = sheet.sprite(rc, 1, true) {
                    s.set_position((viewport.w - w as i32) / 2, (viewport.h - h as i32) / 2);
                    s.render(rc)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{BuiltinPlatform, N_LEVELS};
    use bombz_engine::{EngineConfig, HeadlessContext, Settings};

    fn hub() -> Arc<ScreenHub> {
        hub_with(EngineConfig::default())
    }

    fn hub_with(config: EngineConfig) -> Arc<ScreenHub> {
        let dir = std::env::temp_dir().join(format!("bombz-game-{}", std::process::id()));
        ScreenHub::new(
            Arc::new(BuiltinPlatform::new(&dir)),
            config,
            Settings::new(dir.join("settings.txt")),
            N_LEVELS,
        )
    }

    #[test_log::test]
    fn new_game_records_the_time_limit() {
        let hub = hub();
        let game = GameScreen::new(Arc::clone(&hub), 2).unwrap();
        assert_eq!(game.level_no(), 2);
        assert_eq!(game.outcome(), Outcome::Playing);
        let limit = stats::LevelStats::read(&hub.settings(), 2).time_limit;
        assert_eq!(limit, game.time_left());
        assert_eq!(hub.current_level(), 2);
    }

    #[test_log::test]
    fn countdown_runs_in_real_time_at_any_tick_period() {
        let hub = hub_with(EngineConfig {
            tick_ms: 20,
            ..EngineConfig::default()
        });
        let game = GameScreen::new(hub, 1).unwrap();
        let limit = game.time_left();
        for _ in 0..25 {
            game.tick(Keys::NONE);
        }
        assert_eq!(game.time_left(), limit);
        for _ in 0..25 {
            game.tick(Keys::NONE);
        }
        assert_eq!(game.time_left(), limit - 1);
    }

    #[test_log::test]
    fn lost_attempt_is_retried_after_the_outcome_delay() {
        let hub = hub();
        let game = GameScreen::new(Arc::clone(&hub), 1).unwrap();
        let mut guard = 0;
        while !game.outcome().is_over() {
            game.tick(Keys::NONE);
            guard += 1;
            assert!(guard < 100_000, "level never timed out");
        }
        assert_eq!(game.outcome(), Outcome::TimeUp);
        assert_eq!(stats::LevelStats::read(&hub.settings(), 1).failed, 1);

        for _ in 1..OUTCOME_TICKS {
            assert_eq!(game.tick(Keys::NONE).1, After::Stay);
        }
        assert_eq!(game.tick(Keys::NONE).1, After::Play(1));
        game.restart(1).unwrap();
        assert_eq!(game.outcome(), Outcome::Playing);
    }

    #[test_log::test]
    fn renders_into_a_headless_context() {
        let hub = hub();
        let game = GameScreen::new(Arc::clone(&hub), 1).unwrap();
        let mut rc = HeadlessContext::new(80, 60);
        game.request_render_state(RenderState::Rendering);
        game.service_render_request(&mut rc).unwrap();
        assert_eq!(game.render_state(), RenderState::Rendering);
        let stats = rc.stats();
        assert_eq!(stats.lock().flips, 1);
        assert!(stats.lock().draw_calls >= LEVEL_HEIGHT as u64);

        game.request_render_state(RenderState::Uninitialised);
        game.service_render_request(&mut rc).unwrap();
        assert_eq!(rc.canvas().live_textures(), 0);
    }

    #[test_log::test]
    fn rendering_survives_a_recreated_context() {
        let hub = hub();
        let game = GameScreen::new(Arc::clone(&hub), 1).unwrap();
        let mut rc = HeadlessContext::new(40, 30);
        game.request_render_state(RenderState::Rendering);
        game.service_render_request(&mut rc).unwrap();
        rc.stats().lock().pending_size = Some((60, 45));
        rc.recreate().unwrap();
        game.service_render_request(&mut rc).unwrap();
        assert_eq!(hub.render().tile_size(), 3);
    }
}
