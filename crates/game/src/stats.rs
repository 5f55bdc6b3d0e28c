//! Per-level play statistics kept in [`Settings`].
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `time_limit_N` | limit of level N when last started |
//! | `failed_N` | attempts lost |
//! | `succeeded_N` | attempts won |
//! | `time_left_N` | mean seconds left over won attempts |
//! | `moves_N` | mean moves over won attempts |
//! | `detonators_left_N` | mean unused matches over won attempts |
//! | `highest_completed` | highest level won so far |
//! | `last_level` | level to offer next time |

use bombz_engine::Settings;

pub const HIGHEST_COMPLETED: &str = "highest_completed";
pub const LAST_LEVEL: &str = "last_level";

fn key(name: &str, level: u32) -> String {
    format!("{}_{}", name, level)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelStats {
    pub time_limit: u32,
    pub failed: u32,
    pub succeeded: u32,
    pub time_left: f64,
    pub moves: f64,
    pub detonators_left: f64,
}

impl LevelStats {
    pub fn read(settings: &Settings, level: u32) -> Self {
        Self {
            time_limit: settings.get(&key("time_limit", level), 0),
            failed: settings.get(&key("failed", level), 0),
            succeeded: settings.get(&key("succeeded", level), 0),
            time_left: settings.get_float(&key("time_left", level), 0.0),
            moves: settings.get_float(&key("moves", level), 0.0),
            detonators_left: settings.get_float(&key("detonators_left", level), 0.0),
        }
    }
}

/// Fold `value` into the mean over `count` samples, `value` being the last.
fn running_mean(mean: f64, value: f64, count: u32) -> f64 {
    if mean == 0.0 || count <= 1 {
        value
    } else {
        let n = count as f64;
        (mean * (n - 1.0) + value) / n
    }
}

pub fn record_start(settings: &mut Settings, level: u32, time_limit: u32) {
    settings.set(&key("time_limit", level), time_limit);
}

pub fn record_failure(settings: &mut Settings, level: u32) {
    let k = key("failed", level);
    let n: u32 = settings.get(&k, 0);
    settings.set(&k, n + 1);
}

pub fn record_success(
    settings: &mut Settings,
    level: u32,
    time_left: u32,
    moves: u32,
    detonators_left: u32,
) {
    let k = key("succeeded", level);
    let n: u32 = settings.get::<u32>(&k, 0) + 1;
    settings.set(&k, n);

    for (name, value) in [
        ("time_left", time_left),
        ("moves", moves),
        ("detonators_left", detonators_left),
    ] {
        let k = key(name, level);
        let mean = running_mean(settings.get_float(&k, 0.0), value as f64, n);
        settings.set(&k, mean);
    }

    if level > highest_completed(settings) {
        settings.set(HIGHEST_COMPLETED, level);
    }
}

pub fn highest_completed(settings: &Settings) -> u32 {
    settings.get(HIGHEST_COMPLETED, 0)
}

/// A level can be played once every level before it has been completed.
pub fn is_unlocked(settings: &Settings, level: u32) -> bool {
    level >= 1 && level <= highest_completed(settings) + 1
}
