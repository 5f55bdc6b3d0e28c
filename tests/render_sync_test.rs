use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use bombz::engine::{
    handle_context_event, Application, HeadlessContext, HeadlessStats, RenderContext, Renderer,
    RendererWithState, Result, Screen,
};
use bombz::types::{Event, RenderState, TICK_MS};

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    render_delay: Duration,
}

impl Recorder {
    fn note(&self, what: String) {
        self.log.lock().push(format!("{}:{}", self.name, what));
    }
}

impl Renderer for Recorder {
    fn init_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        self.note(format!("init {}x{}", rc.width(), rc.height()));
        Ok(())
    }

    fn delete_rendering(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
        self.note("delete".to_string());
        Ok(())
    }

    fn render(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
        thread::sleep(self.render_delay);
        self.note("render".to_string());
        Ok(())
    }

    fn free_rendering(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
        self.note("free".to_string());
        Ok(())
    }
}

/// Renders on start, hands over to `next` on a tap.
struct RecorderScreen {
    name: &'static str,
    renderer: RendererWithState<Recorder>,
    next: Mutex<Option<Arc<dyn Screen>>>,
}

impl RecorderScreen {
    fn new(name: &'static str, log: &Log) -> Arc<Self> {
        Self::slow(name, log, Duration::ZERO)
    }

    fn slow(name: &'static str, log: &Log, render_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            renderer: RendererWithState::new(
                name,
                Recorder {
                    name,
                    log: Arc::clone(log),
                    render_delay,
                },
            ),
            next: Mutex::new(None),
        })
    }
}

impl Screen for RecorderScreen {
    fn name(&self) -> &str {
        self.name
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
        self.renderer.request_render_state(RenderState::Rendering);
        app.request_render(false);
        loop {
            match app.get_next_event(TICK_MS) {
                Event::Stop => return Ok(()),
                Event::Tap { .. } => {
                    if let Some(next) = self.next.lock().take() {
                        app.set_screen(next);
                        return Ok(());
                    }
                }
                event => {
                    handle_context_event(app, self, event);
                }
            }
        }
    }
}

fn start(
    app: &Arc<Application>,
    w: u32,
    h: u32,
) -> (Arc<Mutex<HeadlessStats>>, JoinHandle<Result<()>>) {
    let mut rc = HeadlessContext::new(w, h);
    let stats = rc.stats();
    let runner = Arc::clone(app);
    let handle = thread::spawn(move || runner.start(&mut rc));
    wait_for("render loop", || app.is_render_looping());
    (stats, handle)
}

fn wait_for(what: &str, mut f: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !f() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(2));
    }
}

fn position(log: &Log, entry: &str) -> Option<usize> {
    log.lock().iter().position(|e| e == entry)
}

fn last_for(log: &Log, name: &str) -> Option<String> {
    let prefix = format!("{}:", name);
    log.lock().iter().rev().find(|e| e.starts_with(&prefix)).cloned()
}

#[test_log::test]
fn blocking_request_waits_for_a_full_pass() {
    let log = Log::default();
    let app = Application::new("sync");
    app.set_screen(RecorderScreen::new("a", &log));
    let (stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    for _ in 0..5 {
        let before = app.render_passes();
        let flips = stats.lock().flips;
        app.request_render(true);
        assert!(app.render_passes() >= before + 1);
        assert!(stats.lock().flips > flips);
    }

    app.stop();
    handle.join().unwrap().unwrap();
    assert_eq!(log.lock().last().map(String::as_str), Some("a:delete"));
    assert!(!app.is_render_looping());
}

#[test_log::test]
fn outgoing_screen_is_freed_before_the_next_one_starts() {
    let log = Log::default();
    let app = Application::new("sync");
    let a = RecorderScreen::new("a", &log);
    let b = RecorderScreen::new("b", &log);
    *a.next.lock() = Some(b.clone() as Arc<dyn Screen>);
    app.set_screen(a.clone());
    let (_stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    app.push_event(Event::Tap { x: 0, y: 0 });
    wait_for("b to render", || position(&log, "b:render").is_some());

    let freed = position(&log, "a:free").unwrap();
    let started = position(&log, "b:init 40x30").unwrap();
    assert!(freed < started, "{:?}", log.lock());
    assert!(!log.lock()[freed..].iter().any(|e| e.starts_with("a:render")));
    assert_eq!(a.render_state(), RenderState::ReplaceScreen);
    assert_eq!(app.screen().map(|s| s.name().to_string()), Some("b".to_string()));

    app.stop();
    handle.join().unwrap().unwrap();
    assert_eq!(b.render_state(), RenderState::Uninitialised);
    assert_eq!(position(&log, "a:delete"), None);
}

#[test_log::test]
fn context_loss_and_recreation_reinitialise_the_screen() {
    let log = Log::default();
    let app = Application::new("sync");
    let a = RecorderScreen::new("a", &log);
    app.set_screen(a.clone());
    let (stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    app.push_event(Event::RenderContextDestroyed);
    wait_for("teardown", || position(&log, "a:delete").is_some());

    stats.lock().pending_size = Some((80, 60));
    app.push_event(Event::RenderContextCreated);
    wait_for("reinit", || position(&log, "a:init 80x60").is_some());
    wait_for("rendering", || a.render_state() == RenderState::Rendering);
    assert_eq!(stats.lock().recreates, 1);

    app.stop();
    handle.join().unwrap().unwrap();
}

#[test_log::test]
fn failed_pass_stops_the_application() {
    let log = Log::default();
    let app = Application::new("sync");
    app.set_screen(RecorderScreen::new("a", &log));
    let (stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || stats.lock().flips > 0);

    stats.lock().fail_next_flip = true;
    app.request_render(false);

    assert!(handle.join().unwrap().is_err());
    assert!(app.is_stopped());
    assert!(!app.is_render_looping());
    // Nobody is serviced any more, so blocking requests return at once.
    app.request_render(true);
}

#[test_log::test]
fn switching_screens_during_stop_still_deletes_the_current_one() {
    let log = Log::default();
    let app = Application::new("sync");
    let a = RecorderScreen::slow("a", &log, Duration::from_millis(50));
    let b = RecorderScreen::new("b", &log);
    app.set_screen(a.clone());
    let (_stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    // Keep a slow pass in flight while stop() waits on it.
    app.request_render(false);
    let stopper = {
        let app = Arc::clone(&app);
        thread::spawn(move || app.stop())
    };
    wait_for("stop to begin", || app.is_stopped());
    app.set_screen(b.clone());

    stopper.join().unwrap();
    handle.join().unwrap().unwrap();

    assert_eq!(app.screen().map(|s| s.name().to_string()), Some("a".to_string()));
    assert_eq!(last_for(&log, "a").as_deref(), Some("a:delete"), "{:?}", log.lock());
    assert_eq!(a.render_state(), RenderState::Uninitialised);
    assert_eq!(last_for(&log, "b"), None);
    assert_eq!(b.render_state(), RenderState::Uninitialised);
}

#[test_log::test]
fn late_requests_do_not_survive_the_final_pass() {
    let log = Log::default();
    let app = Application::new("sync");
    let a = RecorderScreen::slow("a", &log, Duration::from_millis(50));
    app.set_screen(a.clone());
    let (_stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    app.request_render(false);
    let stopper = {
        let app = Arc::clone(&app);
        thread::spawn(move || app.stop())
    };
    wait_for("stop to begin", || app.is_stopped());
    // A logic thread that has not seen Stop yet may still ask for frames.
    a.request_render_state(RenderState::ReplaceScreen);
    app.request_render(false);

    stopper.join().unwrap();
    handle.join().unwrap().unwrap();
    assert_eq!(last_for(&log, "a").as_deref(), Some("a:delete"), "{:?}", log.lock());
    assert_eq!(a.render_state(), RenderState::Uninitialised);
}

#[test_log::test]
fn context_events_after_stop_are_ignored() {
    let log = Log::default();
    let app = Application::new("sync");
    let a = RecorderScreen::new("a", &log);
    app.set_screen(a.clone());
    let (_stats, handle) = start(&app, 40, 30);
    wait_for("first frame", || position(&log, "a:render").is_some());

    app.stop();
    handle.join().unwrap().unwrap();
    let entries = log.lock().len();

    assert!(handle_context_event(&app, &*a, Event::RenderContextCreated));
    assert!(handle_context_event(&app, &*a, Event::RenderContextDestroyed));
    assert_eq!(a.renderer.requested_render_state(), RenderState::Uninitialised);
    assert_eq!(log.lock().len(), entries);
}
