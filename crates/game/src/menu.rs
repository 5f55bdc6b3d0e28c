//! Menu screens: main menu, level chooser and pause.
//!
//! Items are text widgets. A tap on an item activates it; with the keyboard
//! Up/Down move the highlight, Right activates and Left (or Pause) goes back.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use bombz_core::Level;
use bombz_engine::{
    handle_context_event, Application, ContextIndex, Platform, Rect, RenderContext, Renderer,
    RendererWithState, Result, Screen, TileBatcher, WidgetGroup,
};

use crate::assets::LOGO_TILES_H;
use crate::game_screen::GameScreen;
use crate::hub::ScreenHub;
use crate::stats;
use crate::text::TextSheet;
use crate::types::{Event, Keys, RenderState, LEVEL_HEIGHT, LEVEL_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    ChooseLevel,
    Quit,
    PreviousLevel,
    NextLevel,
    Back,
    Resume,
    Exit,
}

impl MenuAction {
    /// Translation tag of the item's label.
    fn tag(self) -> &'static str {
        match self {
            MenuAction::Play => "play",
            MenuAction::ChooseLevel => "choose_level",
            MenuAction::Quit => "quit",
            MenuAction::PreviousLevel => "previous",
            MenuAction::NextLevel => "next",
            MenuAction::Back => "back",
            MenuAction::Resume => "resume",
            MenuAction::Exit => "exit",
        }
    }
}

#[derive(Clone)]
enum MenuKind {
    Main,
    Chooser,
    Pause(Arc<GameScreen>),
}

/// State shared between the logic and render halves of a menu.
struct MenuModel {
    title: Option<String>,
    items: Vec<MenuAction>,
    item_labels: Vec<String>,
    selected: usize,
    /// Level shown behind the menu
    preview: Option<(u32, Arc<Level>)>,
    widgets: WidgetGroup<MenuAction>,
    /// Bumped whenever a label changes
    version: u64,
}

impl MenuModel {
    fn new(
        platform: &dyn Platform,
        title: Option<String>,
        items: Vec<MenuAction>,
        preview: Option<(u32, Arc<Level>)>,
    ) -> Self {
        let mut widgets = WidgetGroup::new();
        for &item in &items {
            widgets.add(item);
        }
        let item_labels = items.iter().map(|a| platform.translate(a.tag())).collect();
        Self {
            title,
            items,
            item_labels,
            selected: 0,
            preview,
            widgets,
            version: 0,
        }
    }

    fn labels(&self) -> Vec<String> {
        self.title
            .iter()
            .chain(self.item_labels.iter())
            .cloned()
            .collect()
    }

    fn move_selection(&mut self, down: bool) {
        let n = self.items.len().max(1);
        self.selected = if down {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }
}

/// What a keyboard change means for the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    None,
    Moved,
    Activate(MenuAction),
}

pub struct MenuScreen {
    kind: MenuKind,
    hub: Arc<ScreenHub>,
    model: Arc<Mutex<MenuModel>>,
    renderer: RendererWithState<MenuRenderer>,
}

fn chooser_title(platform: &dyn Platform, level: u32) -> String {
    format!("{} {:02}", platform.translate("level"), level)
}

/// Level `n` for showing behind the chooser. Failures only cost the preview.
fn preview_level(hub: &ScreenHub, n: u32) -> Option<(u32, Arc<Level>)> {
    match hub.preview_level(n) {
        Ok(level) => Some((n, Arc::new(level))),
        Err(e) => {
            warn!("menu: no preview for level {}: {}", n, e);
            None
        }
    }
}

impl MenuScreen {
    fn new(kind: MenuKind, hub: Arc<ScreenHub>) -> Arc<Self> {
        let platform = hub.platform().as_ref();
        let (name, model) = match &kind {
            MenuKind::Main => (
                "main menu",
                MenuModel::new(
                    platform,
                    None,
                    vec![MenuAction::Play, MenuAction::ChooseLevel, MenuAction::Quit],
                    None,
                ),
            ),
            MenuKind::Chooser => {
                let level = hub.current_level();
                (
                    "level chooser",
                    MenuModel::new(
                        platform,
                        Some(chooser_title(platform, level)),
                        vec![
                            MenuAction::Play,
                            MenuAction::PreviousLevel,
                            MenuAction::NextLevel,
                            MenuAction::Back,
                        ],
                        preview_level(&hub, level),
                    ),
                )
            }
            MenuKind::Pause(_) => (
                "pause",
                MenuModel::new(
                    platform,
                    Some(platform.translate("paused")),
                    vec![MenuAction::Resume, MenuAction::Exit],
                    None,
                ),
            ),
        };
        let model = Arc::new(Mutex::new(model));
        let show_logo = matches!(kind, MenuKind::Main);
        let renderer = MenuRenderer::new(Arc::clone(&hub), Arc::clone(&model), show_logo);
        Arc::new(Self {
            kind,
            hub,
            model,
            renderer: RendererWithState::new(name, renderer),
        })
    }

    pub fn main(hub: Arc<ScreenHub>) -> Arc<Self> {
        Self::new(MenuKind::Main, hub)
    }

    pub fn chooser(hub: Arc<ScreenHub>) -> Arc<Self> {
        Self::new(MenuKind::Chooser, hub)
    }

    pub fn pause(hub: Arc<ScreenHub>, game: Arc<GameScreen>) -> Arc<Self> {
        Self::new(MenuKind::Pause(game), hub)
    }

    pub fn items(&self) -> Vec<MenuAction> {
        self.model.lock().items.clone()
    }

    pub fn selected(&self) -> MenuAction {
        let m = self.model.lock();
        m.items[m.selected.min(m.items.len() - 1)]
    }

    pub fn title(&self) -> Option<String> {
        self.model.lock().title.clone()
    }

    /// Widget under a tap, if any.
    pub fn hit(&self, x: i32, y: i32) -> Option<MenuAction> {
        self.model.lock().widgets.hit(x, y)
    }

    fn back_action(&self) -> Option<MenuAction> {
        match self.kind {
            MenuKind::Main => None,
            MenuKind::Chooser => Some(MenuAction::Back),
            MenuKind::Pause(_) => Some(MenuAction::Resume),
        }
    }

    /// React to keys that went down since the last tick.
    fn navigate(&self, pressed: Keys) -> Nav {
        if pressed.contains(Keys::LEFT) {
            return self.back_action().map_or(Nav::None, Nav::Activate);
        }
        if pressed.contains(Keys::RIGHT) {
            return Nav::Activate(self.selected());
        }
        let mut m = self.model.lock();
        if pressed.contains(Keys::UP) {
            m.move_selection(false);
            Nav::Moved
        } else if pressed.contains(Keys::DOWN) {
            m.move_selection(true);
            Nav::Moved
        } else {
            Nav::None
        }
    }

    fn show_level(&self, level: u32) {
        let title = chooser_title(self.hub.platform().as_ref(), level);
        let preview = preview_level(&self.hub, level);
        let mut m = self.model.lock();
        m.title = Some(title);
        m.preview = preview;
        m.version += 1;
    }

    /// Level `Play` starts: the current one if it is unlocked, otherwise the
    /// first one not yet completed.
    fn level_to_play(&self) -> u32 {
        let current = self.hub.current_level();
        if self.hub.is_unlocked(current) {
            current
        } else {
            let next = stats::highest_completed(&self.hub.settings()) + 1;
            self.hub.set_current_level(next)
        }
    }

    /// Carry out `action`. Returns true when this screen has been replaced.
    fn activate(&self, app: &Arc<Application>, action: MenuAction) -> Result<bool> {
        info!("menu: {:?}", action);
        match action {
            MenuAction::Play => {
                let game = GameScreen::new(Arc::clone(&self.hub), self.level_to_play())?;
                app.set_screen(game);
                Ok(true)
            }
            MenuAction::ChooseLevel => {
                app.set_screen(MenuScreen::chooser(Arc::clone(&self.hub)));
                Ok(true)
            }
            MenuAction::Quit => {
                self.hub.commit_settings();
                app.stop();
                Ok(true)
            }
            MenuAction::PreviousLevel | MenuAction::NextLevel => {
                let current = self.hub.current_level();
                let wanted = if action == MenuAction::NextLevel {
                    current + 1
                } else {
                    current.saturating_sub(1)
                };
                if wanted >= 1 && self.hub.is_unlocked(wanted) {
                    let level = self.hub.set_current_level(wanted);
                    self.show_level(level);
                    app.request_render(false);
                }
                Ok(false)
            }
            MenuAction::Back | MenuAction::Exit => {
                self.hub.commit_settings();
                app.set_screen(MenuScreen::main(Arc::clone(&self.hub)));
                Ok(true)
            }
            MenuAction::Resume => {
                if let MenuKind::Pause(game) = &self.kind {
                    app.set_screen(Arc::clone(game) as Arc<dyn Screen>);
                    return Ok(true);
                }
                Ok(false)
            }
        }
    }
}

impl Screen for MenuScreen {
    fn name(&self) -> &str {
        match self.kind {
            MenuKind::Main => "main menu",
            MenuKind::Chooser => "level chooser",
            MenuKind::Pause(_) => "pause",
        }
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
        app.enable_tap_events(true);
        self.renderer.request_render_state(RenderState::Rendering);
        app.request_render(false);
        let tick_ms = self.hub.config().tick_ms;
        let mut held = app.controls_state();

        loop {
            let action = match app.get_next_event(tick_ms) {
                Event::Stop => return Ok(()),
                Event::Tap { x, y } => self.hit(x, y),
                Event::Pause => self.back_action(),
                Event::Tick => {
                    let keys = app.controls_state();
                    let pressed = keys.without(held);
                    held = keys;
                    match self.navigate(pressed) {
                        Nav::None => None,
                        Nav::Moved => {
                            app.request_render(false);
                            None
                        }
                        Nav::Activate(action) => Some(action),
                    }
                }
                Event::Resume => {
                    app.request_render(false);
                    None
                }
                event @ (Event::RenderContextCreated | Event::RenderContextDestroyed) => {
                    handle_context_event(app, self, event);
                    None
                }
            };
            if let Some(action) = action {
                if self.activate(app, action)? {
                    return Ok(());
                }
            }
        }
    }
}

struct MenuRenderer {
    hub: Arc<ScreenHub>,
    model: Arc<Mutex<MenuModel>>,
    show_logo: bool,
    index: Option<ContextIndex>,
    sheet: Option<(u64, TextSheet)>,
    preview: Option<(u32, TileBatcher)>,
}

impl MenuRenderer {
    fn new(hub: Arc<ScreenHub>, model: Arc<Mutex<MenuModel>>, show_logo: bool) -> Self {
        Self {
            hub,
            model,
            show_logo,
            index: None,
            sheet: None,
            preview: None,
        }
    }

    fn text_scale(&self) -> u32 {
        (self.hub.render().tile_size() / 3).max(1)
    }

    /// Rebuild whatever is out of date with the model.
    fn refresh(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        let stale = |v: &u64| self.sheet.as_ref().map_or(true, |(shown, _)| shown != v);
        let (version, labels, preview) = {
            let m = self.model.lock();
            let labels = if stale(&m.version) { Some(m.labels()) } else { None };
            (m.version, labels, m.preview.clone())
        };

        if let Some(labels) = labels {
            if let Some((_, old)) = self.sheet.take() {
                old.delete(rc);
            }
            let sheet = TextSheet::build(rc, &labels, self.text_scale())?;
            self.sheet = Some((version, sheet));
        }

        match preview {
            Some((n, level)) if self.preview.as_ref().map_or(true, |(shown, _)| *shown != n) => {
                let hub = self.hub.render();
                let ts = hub.tile_size();
                let mut batcher =
                    rc.create_tile_batcher(LEVEL_WIDTH as u32, LEVEL_HEIGHT as u32, ts, ts);
                if let Some(tiles) = hub.tiles() {
                    tiles.fill(&mut batcher, &level);
                }
                drop(hub);
                self.preview = Some((n, batcher));
            }
            Some(_) => {}
            None => self.preview = None,
        }
        Ok(())
    }
}

impl Renderer for MenuRenderer {
    fn init_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        if self.index == Some(rc.index()) && self.sheet.is_some() {
            return Ok(());
        }
        self.hub.ensure(rc)?;
        self.index = Some(rc.index());
        self.refresh(rc)?;
        debug!("menu: rendering initialised");
        Ok(())
    }

    fn free_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        if let Some((_, sheet)) = self.sheet.take() {
            if self.index == Some(rc.index()) {
                sheet.delete(rc);
            }
        }
        self.preview = None;
        self.index = None;
        self.model.lock().widgets.clear_areas();
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
        self.refresh(rc)?;
        self.hub.begin_frame(rc);

        let hub = self.hub.render();
        let ts = hub.tile_size() as i32;
        let viewport = hub.viewport();

        if let Some((_, batcher)) = &self.preview {
            rc.enable_blend(false);
            batcher.render(rc)?;
        }
        rc.enable_blend(true);

        let mut y = ts;
        if self.show_logo {
            if let Some(region) = hub.logo() {
                let mut logo = rc.create_sprite(region, region.width, region.height);
                logo.set_position((viewport.w - region.width as i32) / 2, y);
                logo.render(rc)?;
            }
            y += ts * (LOGO_TILES_H as i32 + 1);
        }
        drop(hub);

        let Some((_, sheet)) = &self.sheet else {
            return Ok(());
        };
        let mut m = self.model.lock();
        let line = sheet.size(0).1 as i32 * 7 / 5;
        let first_item = if m.title.is_some() {
            if let Some(mut s) = sheet.sprite(rc, 0, true) {
                s.set_position((viewport.w - sheet.size(0).0 as i32) / 2, y);
                s.render(rc)?;
            }
            y += line * 3 / 2;
            1
        } else {
            0
        };

        let selected = m.selected;
        let items = m.items.clone();
        for (n, action) in items.into_iter().enumerate() {
            let i = first_item + n;
            let (w, h) = sheet.size(i);
            let x = (viewport.w - w as i32) / 2;
            if let Some(mut s) = sheet.sprite(rc, i, n == selected) {
                s.set_position(x, y);
                s.render(rc)?;
            }
            let area = Rect::new(viewport.x + x, viewport.y + y, w as i32, h as i32);
            m.widgets.set_area(action, area);
            y += line;
        }
        Ok(())
    }
}
