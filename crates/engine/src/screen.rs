//! Screens: one mode of the application with its own event loop.
//!
//! A screen is shared between two threads. The logic thread calls
//! [`Screen::run`], the render thread calls
//! [`Screen::service_render_request`]. Exactly one screen is current on the
//! [`Application`] at a time; switching goes through
//! [`Application::set_screen`].

use std::sync::Arc;

use log::{debug, error, info};

use crate::application::Application;
use crate::error::Result;
use crate::render::RenderContext;
use crate::types::{Event, RenderState};

pub trait Screen: Send + Sync {
    fn name(&self) -> &str;

    fn render_state(&self) -> RenderState;

    fn request_render_state(&self, state: RenderState);

    /// Render thread entry point.
    fn service_render_request(&self, rc: &mut dyn RenderContext) -> Result<()>;

    /// Delete the screen's rendering whatever was last requested. Called by
    /// the render thread once the loop has been told to stop.
    fn teardown_rendering(&self, rc: &mut dyn RenderContext) -> Result<()> {
        self.request_render_state(RenderState::Uninitialised);
        self.service_render_request(rc)
    }

    /// Logic thread entry point. Returns when the screen is replaced or the
    /// application stops.
    fn run(&self, app: &Arc<Application>) -> Result<()>;
}

/// Common reaction to render context events.
///
/// When the context goes away the screen's rendering is torn down; when a
/// new one arrives the context is marked for recreation and the screen
/// renders again. Both wait for the render thread. Returns false for any
/// other event.
pub fn handle_context_event(app: &Application, screen: &dyn Screen, event: Event) -> bool {
    let is_context_event = matches!(
        event,
        Event::RenderContextDestroyed | Event::RenderContextCreated
    );
    if is_context_event && app.is_stopped() {
        debug!("screen: {} ignoring {:?} after stop", screen.name(), event);
        return true;
    }
    match event {
        Event::RenderContextDestroyed => {
            screen.request_render_state(RenderState::Uninitialised);
            app.request_render(true);
            true
        }
        Event::RenderContextCreated => {
            app.reset_render_context();
            screen.request_render_state(RenderState::Rendering);
            app.request_render(true);
            true
        }
        _ => false,
    }
}

/// Runs whichever screen is current until the application stops.
///
/// An error escaping a screen is logged and stops the application.
pub struct ScreenRunner {
    app: Arc<Application>,
}

impl ScreenRunner {
    pub fn new(app: Arc<Application>) -> Self {
        Self { app }
    }

    pub fn run(&self) {
        info!("screen: logic thread started");
        while !self.app.is_stopped() {
            let Some(screen) = self.app.screen() else {
                break;
            };
            if let Err(e) = screen.run(&self.app) {
                error!("screen: {} failed: {}", screen.name(), e);
                self.app.stop();
                break;
            }
        }
        info!("screen: logic thread finished");
    }
}
