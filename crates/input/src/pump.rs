//! Input thread: reads terminal events and feeds the application.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use log::{debug, error, info};

use bombz_engine::Application;

use crate::controls::KeyboardControls;
use crate::map::{map_key, map_mouse, should_quit, InputAction};
use crate::types::Event;

// How often the thread looks at the stop flag while idle.
const POLL_MS: u64 = 50;

pub struct InputPump {
    app: Arc<Application>,
    controls: Arc<KeyboardControls>,
}

impl InputPump {
    /// Create a pump and install its controls on `app`.
    pub fn new(app: Arc<Application>) -> Self {
        let controls = Arc::new(KeyboardControls::default());
        app.set_controls(controls.clone());
        Self { app, controls }
    }

    pub fn controls(&self) -> &Arc<KeyboardControls> {
        &self.controls
    }

    /// Run on a new thread named `input`.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("input".to_string())
            .spawn(move || self.run())
    }

    pub fn run(&self) {
        info!("input: thread started");
        while !self.app.is_stopped() {
            match self.next_event() {
                Ok(Some(ev)) => {
                    if !self.handle(ev) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("input: terminal read failed: {}", e);
                    self.app.stop();
                    break;
                }
            }
        }
        info!("input: thread finished");
    }

    fn next_event(&self) -> io::Result<Option<TermEvent>> {
        if event::poll(Duration::from_millis(POLL_MS))? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Apply one terminal event. Returns false once the application has been
    /// told to stop.
    pub fn handle(&self, ev: TermEvent) -> bool {
        match ev {
            TermEvent::Key(key) => match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if should_quit(key) {
                        info!("input: quit requested");
                        self.app.stop();
                        return false;
                    }
                    match map_key(key) {
                        Some(InputAction::Hold(dir)) => self.controls.press(dir),
                        Some(InputAction::Pause) => self.app.push_event(Event::Pause),
                        None => {}
                    }
                }
                KeyEventKind::Release => {
                    if let Some(InputAction::Hold(dir)) = map_key(key) {
                        self.controls.release(dir);
                    }
                }
            },
            TermEvent::Mouse(mouse) => {
                if let Some(tap) = map_mouse(mouse) {
                    self.app.push_event(tap);
                }
            }
            TermEvent::Resize(w, h) => {
                debug!("input: resize to {}x{}", w, h);
                self.app.push_event(Event::RenderContextDestroyed);
                self.app.push_event(Event::RenderContextCreated);
            }
            TermEvent::FocusLost => self.controls.reset(),
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bombz_engine::ManualClock;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

    use crate::types::Keys;

    fn pump() -> InputPump {
        InputPump::new(Application::with_clock("test", Arc::new(ManualClock::new(0))))
    }

    #[test_log::test]
    fn test_direction_keys_update_controls() {
        let p = pump();
        assert!(p.handle(TermEvent::Key(KeyEvent::from(KeyCode::Left))));
        assert_eq!(p.app.controls_state(), Keys::LEFT);

        let mut release = KeyEvent::from(KeyCode::Left);
        release.kind = KeyEventKind::Release;
        p.handle(TermEvent::Key(release));
        assert_eq!(p.app.controls_state(), Keys::NONE);
    }

    #[test_log::test]
    fn test_pause_and_tap_are_queued() {
        let p = pump();
        p.handle(TermEvent::Key(KeyEvent::from(KeyCode::Esc)));
        p.handle(TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 1,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(p.app.get_next_event(1000), Event::Pause);
        assert_eq!(p.app.get_next_event(1000), Event::Tap { x: 2, y: 2 });
    }

    #[test_log::test]
    fn test_resize_recycles_render_context() {
        let p = pump();
        p.handle(TermEvent::Resize(80, 24));
        assert_eq!(p.app.get_next_event(1000), Event::RenderContextDestroyed);
        assert_eq!(p.app.get_next_event(1000), Event::RenderContextCreated);
    }

    #[test_log::test]
    fn test_quit_stops_application() {
        let p = pump();
        assert!(!p.handle(TermEvent::Key(KeyEvent::from(KeyCode::Char('q')))));
        assert!(p.app.is_stopped());
        assert_eq!(p.app.get_next_event(1000), Event::Stop);
    }
}
