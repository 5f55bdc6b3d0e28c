//! Held direction keys for terminal environments.
//!
//! Supports terminals that do not emit key release events by using a timeout:
//! a direction counts as held until it is released or until no press (or
//! auto-repeat) for it has been seen for the timeout.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use parking_lot::Mutex;

use bombz_engine::Controls;

use crate::types::{Direction, Keys};

// Long enough to bridge the usual keyboard auto-repeat delay, so a held key
// stays held between the first press and the first repeat.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 550;

#[derive(Debug, Clone)]
pub struct HeldKeys {
    pressed_at: [Option<Instant>; 4],
    key_release_timeout_ms: u32,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self {
            pressed_at: [None; 4],
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    /// Record a press or auto-repeat. Pressing a direction releases its
    /// opposite.
    pub fn press(&mut self, dir: Direction, now: Instant) {
        let opposite = match dir {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        };
        self.pressed_at[opposite.index()] = None;
        self.pressed_at[dir.index()] = Some(now);
    }

    pub fn release(&mut self, dir: Direction) {
        self.pressed_at[dir.index()] = None;
    }

    /// Directions held at `now`, dropping any that timed out.
    pub fn held(&mut self, now: Instant) -> ArrayVec<Direction, 4> {
        let timeout = Duration::from_millis(self.key_release_timeout_ms as u64);
        let mut out = ArrayVec::new();
        for dir in Direction::ALL {
            let slot = &mut self.pressed_at[dir.index()];
            match *slot {
                Some(t) if now.saturating_duration_since(t) <= timeout => out.push(dir),
                Some(_) => *slot = None,
                None => {}
            }
        }
        out
    }

    pub fn keys(&mut self, now: Instant) -> Keys {
        self.held(now)
            .iter()
            .fold(Keys::NONE, |k, &d| k | Keys::from_direction(d))
    }

    pub fn reset(&mut self) {
        self.pressed_at = [None; 4];
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// [`HeldKeys`] shared between the input thread and the logic thread.
#[derive(Debug, Default)]
pub struct KeyboardControls {
    held: Mutex<HeldKeys>,
}

impl KeyboardControls {
    pub fn new(held: HeldKeys) -> Self {
        Self {
            held: Mutex::new(held),
        }
    }

    pub fn press(&self, dir: Direction) {
        self.held.lock().press(dir, Instant::now());
    }

    pub fn release(&self, dir: Direction) {
        self.held.lock().release(dir);
    }

    pub fn reset(&self) {
        self.held.lock().reset();
    }
}

impl Controls for KeyboardControls {
    fn keys(&self) -> Keys {
        self.held.lock().keys(Instant::now())
    }
}
