//! Playfield - one attempt at a level
//!
//! Combines the [`Level`], the [`Pusher`] and the countdown clock, and
//! decides when the attempt is won or lost:
//!
//! - **Won**: every bomb has exploded and the dust has settled.
//! - **Lost**: the clock ran out, or the pusher stands in a blast.

use crate::level::Level;
use crate::pusher::Pusher;
use crate::types::{Keys, TICK_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    TimeUp,
    Exploded,
}

impl Outcome {
    pub fn is_over(self) -> bool {
        self != Outcome::Playing
    }
}

#[derive(Debug, Clone)]
pub struct Playfield {
    level: Level,
    pusher: Pusher,
    time_left: u32,
    tick_ms: u32,
    ms_since_second: u32,
    outcome: Outcome,
}

impl Playfield {
    pub fn new(level: Level) -> Self {
        let pusher = Pusher::new(&level);
        let time_left = level.time_limit();
        Self {
            level,
            pusher,
            time_left,
            tick_ms: TICK_MS,
            ms_since_second: 0,
            outcome: Outcome::Playing,
        }
    }

    /// Count the clock down by `tick_ms` per tick instead of [`TICK_MS`].
    pub fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn pusher(&self) -> &Pusher {
        &self.pusher
    }

    /// Seconds remaining
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Matches still available to the player, carried or lying around
    pub fn detonators_left(&self) -> u32 {
        self.level.matches_left() + self.pusher.has_match() as u32
    }

    /// Advance one tick with the given held keys.
    ///
    /// Returns whether the display needs refreshing.
    pub fn tick(&mut self, keys: Keys) -> bool {
        if self.outcome.is_over() {
            return false;
        }

        let mut update = self.level.tick();
        update = self.pusher.step(&mut self.level, keys) || update;

        self.ms_since_second += self.tick_ms;
        if self.ms_since_second >= 1000 {
            self.ms_since_second -= 1000;
            self.time_left = self.time_left.saturating_sub(1);
            update = true;
        }

        let outcome = self.judge();
        if outcome != self.outcome {
            self.outcome = outcome;
            update = true;
        }
        update
    }

    fn judge(&self) -> Outcome {
        let (x, y) = self.pusher.tile();
        if self.level.tile_at(x, y).is_deadly() {
            Outcome::Exploded
        } else if self.level.n_bombs() == 0 && !self.level.has_activity() {
            Outcome::Won
        } else if self.time_left == 0 {
            Outcome::TimeUp
        } else {
            Outcome::Playing
        }
    }
}
