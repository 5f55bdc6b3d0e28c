use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bombz::engine::{
    Application, EngineConfig, FixedControls, HeadlessContext, HeadlessStats, Result, Settings,
};
use bombz::game::stats::{self, LevelStats};
use bombz::game::{BuiltinPlatform, MenuAction, MenuScreen, ScreenHub, N_LEVELS};
use bombz::types::{Event, Keys};
use parking_lot::Mutex;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bombz-flow-{}-{}", name, std::process::id()))
}

fn hub(name: &str) -> Arc<ScreenHub> {
    let dir = scratch(name);
    let config = EngineConfig {
        settings_path: dir.join("settings.txt"),
        ..EngineConfig::default()
    };
    let settings = Settings::new(&config.settings_path);
    ScreenHub::new(
        Arc::new(BuiltinPlatform::new(dir)),
        config,
        settings,
        N_LEVELS,
    )
}

type Running = JoinHandle<(Result<()>, HeadlessContext)>;

fn start(app: &Arc<Application>) -> (Arc<Mutex<HeadlessStats>>, Running) {
    let mut rc = HeadlessContext::new(120, 90);
    let stats = rc.stats();
    let runner = Arc::clone(app);
    let handle = thread::spawn(move || {
        let result = runner.start(&mut rc);
        (result, rc)
    });
    wait_for("first frame", || stats.lock().flips > 0);
    (stats, handle)
}

fn wait_for(what: &str, mut f: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !f() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(5));
    }
}

fn current(app: &Application) -> String {
    app.screen().map(|s| s.name().to_string()).unwrap_or_default()
}

#[test_log::test]
fn keyboard_play_pause_resume_and_stop() {
    let hub = hub("keys");
    let app = Application::new("bombz");
    let controls = Arc::new(FixedControls::new(Keys::NONE));
    app.set_controls(controls.clone());
    app.set_screen(MenuScreen::main(Arc::clone(&hub)));
    let (_stats, handle) = start(&app);

    controls.set(Keys::RIGHT);
    wait_for("game", || current(&app) == "game");
    controls.set(Keys::NONE);
    assert_eq!(LevelStats::read(&hub.settings(), 1).time_limit, 60);

    app.push_event(Event::Pause);
    wait_for("pause menu", || current(&app) == "pause");
    app.push_event(Event::Pause);
    wait_for("resumed game", || current(&app) == "game");

    app.stop();
    let (result, rc) = handle.join().unwrap();
    result.unwrap();
    assert_eq!(rc.canvas().live_textures(), 0);
}

#[test_log::test]
fn tapping_a_menu_item_activates_it() {
    let hub = hub("taps");
    let app = Application::new("bombz");
    let menu = MenuScreen::main(Arc::clone(&hub));
    app.set_screen(menu.clone());
    let (_stats, handle) = start(&app);

    let target = (0..90)
        .flat_map(|y| (0..120).map(move |x| (x, y)))
        .find(|&(x, y)| menu.hit(x, y) == Some(MenuAction::ChooseLevel));
    let (x, y) = target.expect("level chooser item on screen");
    app.push_event(Event::Tap { x, y });
    wait_for("level chooser", || current(&app) == "level chooser");

    app.stop();
    let (result, rc) = handle.join().unwrap();
    result.unwrap();
    assert_eq!(rc.canvas().live_textures(), 0);
}

#[test]
fn statistics_survive_a_restart() {
    let path = scratch("stats").join("settings.txt");
    let mut settings = Settings::new(&path);
    stats::record_start(&mut settings, 1, 60);
    stats::record_failure(&mut settings, 1);
    stats::record_success(&mut settings, 1, 40, 10, 1);
    stats::record_success(&mut settings, 1, 20, 14, 0);
    settings.set(stats::LAST_LEVEL, 2);
    settings.commit().unwrap();

    let reloaded = Settings::load(&path).unwrap();
    let s = LevelStats::read(&reloaded, 1);
    assert_eq!(s.time_limit, 60);
    assert_eq!((s.failed, s.succeeded), (1, 2));
    assert_eq!(s.time_left, 30.0);
    assert_eq!(s.moves, 12.0);
    assert_eq!(stats::highest_completed(&reloaded), 1);
    assert!(stats::is_unlocked(&reloaded, 2));
    assert!(!stats::is_unlocked(&reloaded, 3));

    let hub = ScreenHub::new(
        Arc::new(BuiltinPlatform::new(std::env::temp_dir())),
        EngineConfig::default(),
        reloaded,
        N_LEVELS,
    );
    assert_eq!(hub.current_level(), 2);
    let _ = std::fs::remove_file(&path);
}
