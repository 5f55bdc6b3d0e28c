//! Application: render loop, event dispatch and screen switching.
//!
//! Two threads cooperate through one mutex and condition variable:
//!
//! - the **render thread** runs [`Application::render_loop`], sleeping until a
//!   render is requested and then servicing the current screen with the lock
//!   released;
//! - the **logic thread** runs the current screen, pulling events with
//!   [`Application::get_next_event`] and asking for renders with
//!   [`Application::request_render`].
//!
//! Non-blocking requests coalesce. A blocking request returns only after a
//! full service pass that started after the request was made, so the caller
//! knows its state change has reached the screen.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::controls::Controls;
use crate::error::Result;
use crate::event::{EventPool, EventQueue};
use crate::render::RenderContext;
use crate::screen::{Screen, ScreenRunner};
use crate::types::{Event, Keys, RenderState};

/// Shared render-loop state. Guarded by `Application::sync`.
struct RenderSync {
    /// Render loop should keep going
    looping: bool,
    /// Render loop thread is inside `render_loop`
    alive: bool,
    /// A render was requested and not yet picked up
    pending: bool,
    /// Requesters currently blocked waiting for a pass
    blocking: u32,
    passes_started: u64,
    passes_done: u64,
    /// Recreate the render context before the next pass
    context_stale: bool,
    tap_events_enabled: bool,
    stopped: bool,
    screen: Option<Arc<dyn Screen>>,
}

struct TickState {
    last_tick_ms: u64,
    saved: Option<Event>,
}

pub struct Application {
    name: String,
    pool: Arc<EventPool>,
    events: EventQueue,
    sync: Mutex<RenderSync>,
    cond: Condvar,
    clock: Arc<dyn Clock>,
    ticks: Mutex<TickState>,
    controls: Mutex<Option<Arc<dyn Controls>>>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_clock(name, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Arc<Self> {
        let now = clock.now_ms();
        Arc::new(Self {
            name: name.into(),
            pool: EventPool::new(),
            events: EventQueue::new(),
            sync: Mutex::new(RenderSync {
                looping: false,
                alive: false,
                pending: false,
                blocking: 0,
                passes_started: 0,
                passes_done: 0,
                context_stale: false,
                tap_events_enabled: true,
                stopped: false,
                screen: None,
            }),
            cond: Condvar::new(),
            clock,
            ticks: Mutex::new(TickState {
                last_tick_ms: now,
                saved: None,
            }),
            controls: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_pool(&self) -> &Arc<EventPool> {
        &self.pool
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Queue an event for the logic thread.
    ///
    /// Taps are dropped while tap events are disabled.
    pub fn push_event(&self, event: Event) {
        if matches!(event, Event::Tap { .. }) && !self.sync.lock().tap_events_enabled {
            debug!("app: dropping {:?}, taps disabled", event);
            return;
        }
        self.events.push(self.pool.alloc(event));
    }

    pub fn enable_tap_events(&self, enable: bool) {
        self.sync.lock().tap_events_enabled = enable;
    }

    pub fn set_controls(&self, controls: Arc<dyn Controls>) {
        *self.controls.lock() = Some(controls);
    }

    /// Directions currently held.
    pub fn controls_state(&self) -> Keys {
        self.controls
            .lock()
            .as_ref()
            .map_or(Keys::NONE, |c| c.keys())
    }

    pub fn screen(&self) -> Option<Arc<dyn Screen>> {
        self.sync.lock().screen.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.sync.lock().stopped
    }

    pub fn is_render_looping(&self) -> bool {
        self.sync.lock().looping
    }

    /// Number of completed render passes.
    pub fn render_passes(&self) -> u64 {
        self.sync.lock().passes_done
    }

    /// Ask the render thread to service the current screen.
    ///
    /// With `block`, wait until a complete pass that started after this call
    /// has finished. Never blocks when the render loop is not running.
    pub fn request_render(&self, block: bool) {
        let mut s = self.sync.lock();
        self.request_render_locked(&mut s, block);
    }

    fn request_render_locked(&self, s: &mut MutexGuard<'_, RenderSync>, block: bool) {
        s.pending = true;
        self.cond.notify_all();
        if !block || !s.alive {
            return;
        }
        let target = s.passes_started + 1;
        s.blocking += 1;
        while s.alive && s.passes_done < target {
            self.cond.wait(s);
        }
        s.blocking -= 1;
    }

    /// Mark the render context for recreation before the next pass.
    pub fn reset_render_context(&self) {
        self.sync.lock().context_stale = true;
    }

    /// Make `screen` current.
    ///
    /// The outgoing screen is asked to replace its rendering and the call
    /// blocks until that has happened. The new screen then inherits the
    /// outgoing screen's render state, and the call blocks again until it
    /// has been serviced. Once the application is stopping the current
    /// screen stays current, so the render loop tears that one down.
    pub fn set_screen(&self, screen: Arc<dyn Screen>) {
        let mut s = self.sync.lock();
        if s.stopped {
            info!("app: stopped, not switching to {}", screen.name());
            return;
        }
        let mut state = RenderState::Uninitialised;
        if let Some(old) = s.screen.clone() {
            info!("app: replacing screen {} with {}", old.name(), screen.name());
            state = old.render_state();
            old.request_render_state(RenderState::ReplaceScreen);
            self.request_render_locked(&mut s, true);
            if s.stopped {
                info!("app: stopped while replacing {}, keeping it current", old.name());
                return;
            }
        } else {
            info!("app: first screen {}", screen.name());
        }

        s.screen = Some(Arc::clone(&screen));
        screen.request_render_state(state);
        self.request_render_locked(&mut s, true);
    }

    /// Stop the application.
    ///
    /// If the render loop is running it is told to finish after tearing the
    /// current screen's rendering down; this call waits for that. A `Stop`
    /// event is always queued so the logic thread leaves its loop.
    pub fn stop(&self) {
        let mut s = self.sync.lock();
        s.stopped = true;
        if s.looping {
            info!("app: stopping render loop");
            s.looping = false;
            if let Some(screen) = s.screen.clone() {
                screen.request_render_state(RenderState::Uninitialised);
            }
            self.request_render_locked(&mut s, true);
        }
        drop(s);
        self.events.push(self.pool.alloc(Event::Stop));
    }

    /// Next event for the logic thread, synthesizing a `Tick` every
    /// `tick_period_ms`.
    ///
    /// If a non-priority event arrives after a full period has elapsed, a
    /// `Tick` is returned first and the event is kept for the next call.
    pub fn get_next_event(&self, tick_period_ms: u32) -> Event {
        let period = tick_period_ms as u64;
        let last_tick = {
            let mut t = self.ticks.lock();
            if let Some(saved) = t.saved.take() {
                return saved;
            }
            t.last_tick_ms
        };

        let elapsed = self.clock.now_ms().saturating_sub(last_tick);
        let timeout = period.saturating_sub(elapsed);
        let popped = self
            .events
            .pop(Some(Duration::from_millis(timeout)))
            .map(|e| e.event());

        let now = self.clock.now_ms();
        let mut t = self.ticks.lock();
        match popped {
            Some(event) if event.is_priority() || now.saturating_sub(t.last_tick_ms) < period => {
                event
            }
            other => {
                t.last_tick_ms = now;
                t.saved = other;
                Event::Tick
            }
        }
    }

    /// Render thread body. Returns when the application stops or a render
    /// pass fails.
    pub fn render_loop(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let mut s = self.sync.lock();
        s.alive = true;
        let mut failure = None;
        info!("render: loop started");

        loop {
            while !s.pending && s.looping {
                self.cond.wait(&mut s);
            }
            if !s.pending {
                break;
            }
            s.pending = false;
            s.passes_started += 1;
            let screen = s.screen.clone();
            let stale = std::mem::take(&mut s.context_stale);

            let result = MutexGuard::unlocked(&mut s, || -> Result<()> {
                if stale {
                    info!("render: recreating context");
                    rc.recreate()?;
                }
                match screen {
                    Some(screen) => screen.service_render_request(rc),
                    None => Ok(()),
                }
            });

            s.passes_done += 1;
            self.cond.notify_all();

            if let Err(e) = result {
                error!("render: pass {} failed: {}", s.passes_done, e);
                s.looping = false;
                s.stopped = true;
                failure = Some(e);
                break;
            }
            if !s.looping && !s.pending {
                break;
            }
        }

        // Whatever the logic thread requested since stop(), the current
        // screen ends up with nothing initialised.
        if failure.is_none() {
            if let Some(screen) = s.screen.clone() {
                let result = MutexGuard::unlocked(&mut s, || screen.teardown_rendering(rc));
                if let Err(e) = result {
                    error!("render: teardown of {} failed: {}", screen.name(), e);
                    s.stopped = true;
                    failure = Some(e);
                }
            }
        }

        s.alive = false;
        s.looping = false;
        if s.blocking > 0 {
            warn!("render: loop ended with {} blocked requesters", s.blocking);
        }
        self.cond.notify_all();
        drop(s);
        info!("render: loop finished");

        match failure {
            Some(e) => {
                self.events.push(self.pool.alloc(Event::Stop));
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Run the application: the current screen on a new logic thread, the
    /// render loop on this one. Returns once both have finished.
    pub fn start(self: &Arc<Self>, rc: &mut dyn RenderContext) -> Result<()> {
        {
            let mut s = self.sync.lock();
            s.looping = true;
            s.alive = true;
        }

        let app = Arc::clone(self);
        let logic = thread::Builder::new()
            .name("screen".to_string())
            .spawn(move || ScreenRunner::new(app).run())
            .context("failed to spawn screen thread")?;

        let result = self.render_loop(rc);

        if logic.join().is_err() {
            error!("app: screen thread panicked");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test_log::test]
    fn saved_event_follows_tick() {
        let clock = Arc::new(ManualClock::new(0));
        let app = Application::with_clock("test", clock.clone());
        clock.advance(100);
        app.push_event(Event::Pause);
        // A period has already elapsed, so the tick goes first.
        assert_eq!(app.get_next_event(40), Event::Tick);
        assert_eq!(app.get_next_event(40), Event::Pause);
    }

    #[test_log::test]
    fn priority_event_skips_the_queue_for_ticks() {
        let clock = Arc::new(ManualClock::new(0));
        let app = Application::with_clock("test", clock.clone());
        clock.advance(100);
        app.push_event(Event::Tap { x: 1, y: 1 });
        assert_eq!(app.get_next_event(40), Event::Tap { x: 1, y: 1 });
    }

    #[test_log::test]
    fn taps_can_be_disabled() {
        let app = Application::with_clock("test", Arc::new(ManualClock::new(0)));
        app.enable_tap_events(false);
        app.push_event(Event::Tap { x: 1, y: 1 });
        app.push_event(Event::Resume);
        assert_eq!(app.get_next_event(1000), Event::Resume);
    }

    #[test_log::test]
    fn request_render_without_loop_does_not_block() {
        let app = Application::new("test");
        app.request_render(true);
        assert_eq!(app.render_passes(), 0);
    }

    #[test_log::test]
    fn stop_without_loop_queues_stop() {
        let app = Application::new("test");
        app.stop();
        assert!(app.is_stopped());
        assert_eq!(app.get_next_event(1000), Event::Stop);
    }

    #[test_log::test]
    fn controls_default_to_none() {
        let app = Application::new("test");
        assert_eq!(app.controls_state(), Keys::NONE);
    }
}
