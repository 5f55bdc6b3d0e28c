//! Level module - the 20x15 puzzle grid
//!
//! The grid uses a flat array for cache locality and no allocation.
//! Coordinates: (x, y) where x ranges 0..19 (left to right), y ranges 0..14
//! (top to bottom).
//!
//! # Text format
//!
//! Fifteen rows of twenty characters followed by a line holding the time
//! limit in seconds:
//!
//! | Char | Tile |
//! |------|------|
//! | `' '` | blank |
//! | `.` | earth |
//! | `D` | match |
//! | `B` | picket |
//! | `O` | bomb |
//! | `0` | lit bomb |
//! | `S` | start position (blank) |
//! | `X` | chrome wall |
//!
//! Anything else reads as blank. Short rows are padded with blanks.

use crate::error::LevelError;
use crate::rng::SimpleRng;
use crate::tile::Tile;
use crate::types::{DEFAULT_TIME_LIMIT, LEVEL_HEIGHT, LEVEL_WIDTH};

/// Total number of cells in a level
pub const LEVEL_SIZE: usize = LEVEL_WIDTH * LEVEL_HEIGHT;

/// Chrome shape for each (left, right, above, below) neighbour combination,
/// indexed by `left << 3 | right << 2 | above << 1 | below`.
pub const CHROME_SHAPES: [u8; 16] = [15, 6, 10, 3, 7, 0, 4, 14, 9, 2, 5, 12, 1, 13, 11, 8];

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    tiles: [Tile; LEVEL_SIZE],
    n_bombs: u32,
    start_x: i32,
    start_y: i32,
    time_limit: u32,
    bomb_activity: bool,
}

impl Level {
    /// An empty level with the pusher in the top-left corner.
    pub fn empty() -> Self {
        Self {
            tiles: [Tile::BLANK; LEVEL_SIZE],
            n_bombs: 0,
            start_x: 0,
            start_y: 0,
            time_limit: DEFAULT_TIME_LIMIT,
            bomb_activity: false,
        }
    }

    /// Parse a level from its text form and tidy the walls up for display.
    pub fn parse(text: &str, rng: &mut SimpleRng) -> Result<Self, LevelError> {
        let mut level = Self::empty();
        let mut lines = text.lines();

        for y in 0..LEVEL_HEIGHT {
            let row = lines.next().ok_or(LevelError::MissingRows { found: y })?;
            let mut chars = row.chars();
            for x in 0..LEVEL_WIDTH {
                let tile = match chars.next() {
                    Some('.') => Tile::EARTH,
                    Some('D') => Tile::MATCH,
                    Some('B') => Tile::PICKET,
                    Some('O') => {
                        level.n_bombs += 1;
                        Tile::BOMB1
                    }
                    Some('0') => {
                        level.n_bombs += 1;
                        level.bomb_activity = true;
                        Tile::BOMB1_FUSED_FIRST
                    }
                    Some('S') => {
                        level.start_x = x as i32;
                        level.start_y = y as i32;
                        Tile::BLANK
                    }
                    Some('X') => Tile::CHROME15,
                    _ => Tile::BLANK,
                };
                level.tiles[y * LEVEL_WIDTH + x] = tile;
            }
        }

        level.time_limit = match lines.map(str::trim).find(|l| !l.is_empty()) {
            Some(line) => line
                .parse()
                .map_err(|_| LevelError::BadTimeLimit(line.to_string()))?,
            None => DEFAULT_TIME_LIMIT,
        };

        level.prettify(rng);
        Ok(level)
    }

    #[inline(always)]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= LEVEL_WIDTH as i32 || y < 0 || y >= LEVEL_HEIGHT as i32 {
            return None;
        }
        Some((y as usize) * LEVEL_WIDTH + (x as usize))
    }

    pub fn in_bounds(x: i32, y: i32) -> bool {
        Self::index(x, y).is_some()
    }

    /// Tile at (x, y), or blank outside the grid.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        Self::index(x, y).map_or(Tile::BLANK, |i| self.tiles[i])
    }

    /// Tile at (x, y), or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        Self::index(x, y).map(|i| self.tiles[i])
    }

    /// Set the tile at (x, y). Returns false if out of bounds.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match Self::index(x, y) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Set a tile that starts animating (a freshly lit bomb).
    pub fn set_active_tile_at(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        let ok = self.set_tile_at(x, y, tile);
        if ok {
            self.bomb_activity = true;
        }
        ok
    }

    pub fn set_blank_at(&mut self, x: i32, y: i32) -> bool {
        self.set_tile_at(x, y, Tile::BLANK)
    }

    pub fn is_chrome_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Tile::is_chrome)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Bombs that have not exploded yet (lit or unlit, including one being pushed)
    pub fn n_bombs(&self) -> u32 {
        self.n_bombs
    }

    pub fn start(&self) -> (i32, i32) {
        (self.start_x, self.start_y)
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    /// Whether any fuse or explosion is still animating
    pub fn has_activity(&self) -> bool {
        self.bomb_activity
    }

    /// Matches still lying in the level
    pub fn matches_left(&self) -> u32 {
        self.tiles.iter().filter(|&&t| t == Tile::MATCH).count() as u32
    }

    /// Whether the pusher (or a pushed bomb) may enter (x, y) moving by (dx, dy).
    ///
    /// Entering an unlit bomb while holding a match lights it instead of
    /// moving, so that counts as possible.
    pub fn can_move_to(&self, x: i32, y: i32, dx: i32, dy: i32, have_match: bool) -> bool {
        self.can_move_to_impl(x, y, dx, dy, have_match, false)
    }

    fn can_move_to_impl(
        &self,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
        have_match: bool,
        bomb: bool,
    ) -> bool {
        let Some(t) = self.get(x, y) else {
            return false;
        };
        if t == Tile::BLANK {
            true
        } else if t == Tile::EARTH || t == Tile::MATCH {
            !bomb
        } else if t.is_bomb() {
            if bomb {
                false
            } else if have_match {
                true
            } else {
                self.can_move_to_impl(x + dx, y + dy, dx, dy, false, true)
            }
        } else {
            t.is_explosion()
        }
    }

    /// Advance fuses and explosions by one tick.
    ///
    /// Returns whether anything changed (so a redraw is needed).
    pub fn tick(&mut self) -> bool {
        if !self.bomb_activity {
            return false;
        }
        self.bomb_activity = false;

        for y in 0..LEVEL_HEIGHT as i32 {
            for x in 0..LEVEL_WIDTH as i32 {
                let t = self.tile_at(x, y);
                if (t >= Tile::BOMB1_FUSED_FIRST && t < Tile::BOMB1_FUSED_LAST)
                    || (t >= Tile::BOMB2_FUSED_FIRST && t < Tile::BOMB2_FUSED_LAST)
                    || (t > Tile::EXPLO00 && t < Tile::EXPLO11)
                {
                    self.set_tile_at(x, y, t.next());
                    self.bomb_activity = true;
                } else if t == Tile::PRE_EXPLO {
                    self.set_tile_at(x, y, Tile::explo(1));
                    self.bomb_activity = true;
                } else if t == Tile::EXPLO00 {
                    self.bomb_activity = true;
                    self.blast(x, y);
                } else if t == Tile::BOMB1_FUSED_LAST || t == Tile::BOMB2_FUSED_LAST {
                    self.n_bombs = self.n_bombs.saturating_sub(1);
                    self.bomb_activity = true;
                    self.set_tile_at(x, y, Tile::EXPLO00);
                } else if t == Tile::EXPLO11 {
                    self.set_blank_at(x, y);
                }
            }
        }
        true
    }

    /// Spread an explosion from its centre to the 3x3 neighbourhood.
    fn blast(&mut self, x: i32, y: i32) {
        let y_range = (y - 1).max(0)..=(y + 1).min(LEVEL_HEIGHT as i32 - 1);
        for y0 in y_range {
            for x0 in (x - 1).max(0)..=(x + 1).min(LEVEL_WIDTH as i32 - 1) {
                // Cells before (x, y) in scan order were already ticked.
                let behind = y0 < y || (y0 == y && x0 <= x);
                self.explode_at(x0, y0, behind);
            }
        }
    }

    fn explode_at(&mut self, x: i32, y: i32, behind: bool) {
        let t = self.tile_at(x, y);
        let last = if t == Tile::BOMB1 || t.is_bomb1_fused() {
            Some(Tile::BOMB1_FUSED_LAST)
        } else if t == Tile::BOMB2 || t.is_bomb2_fused() {
            Some(Tile::BOMB2_FUSED_LAST)
        } else {
            None
        };

        match last {
            Some(last) if behind => self.set_tile_at(x, y, last),
            Some(last) => self.set_tile_at(x, y, last.prev()),
            None if t.is_chrome() => false,
            None if behind => self.set_tile_at(x, y, Tile::explo(1)),
            None => self.set_tile_at(x, y, Tile::PRE_EXPLO),
        };
    }

    fn prettify(&mut self, rng: &mut SimpleRng) {
        self.hollow_chrome();
        self.shape_chrome();
        self.disconnect_ts();
        self.randomise_bombs(rng);
    }

    /// Walls completely surrounded by walls are invisible, so clear them.
    fn hollow_chrome(&mut self) {
        let mut out = self.tiles;
        for y in 0..LEVEL_HEIGHT as i32 {
            for x in 0..LEVEL_WIDTH as i32 {
                if !self.is_chrome_at(x, y) {
                    continue;
                }
                let exposed = (y - 1..=y + 1)
                    .any(|y0| (x - 1..=x + 1).any(|x0| !self.is_chrome_at(x0, y0)));
                out[y as usize * LEVEL_WIDTH + x as usize] =
                    if exposed { Tile::CHROME15 } else { Tile::BLANK };
            }
        }
        self.tiles = out;
    }

    fn shape_chrome(&mut self) {
        let mut out = self.tiles;
        for y in 0..LEVEL_HEIGHT as i32 {
            for x in 0..LEVEL_WIDTH as i32 {
                if !self.is_chrome_at(x, y) {
                    continue;
                }
                let key = (self.is_chrome_at(x - 1, y) as usize) << 3
                    | (self.is_chrome_at(x + 1, y) as usize) << 2
                    | (self.is_chrome_at(x, y - 1) as usize) << 1
                    | self.is_chrome_at(x, y + 1) as usize;
                out[y as usize * LEVEL_WIDTH + x as usize] = Tile::chrome(CHROME_SHAPES[key]);
            }
        }
        self.tiles = out;
    }

    /// Two parallel walls end up joined by rows of T pieces; straighten them.
    fn disconnect_ts(&mut self) {
        let tee_down = Tile::chrome(13);
        let tee_up = Tile::chrome(11);
        let tee_right = Tile::chrome(14);
        let tee_left = Tile::chrome(12);
        for y in 0..LEVEL_HEIGHT as i32 {
            for x in 0..LEVEL_WIDTH as i32 {
                let t = self.tile_at(x, y);
                if t == tee_down && self.get(x, y + 1) == Some(tee_up) {
                    self.set_tile_at(x, y, Tile::chrome(1));
                    self.set_tile_at(x, y + 1, Tile::chrome(1));
                } else if t == tee_right && self.get(x + 1, y) == Some(tee_left) {
                    self.set_tile_at(x, y, Tile::chrome(3));
                    self.set_tile_at(x + 1, y, Tile::chrome(3));
                }
            }
        }
    }

    fn randomise_bombs(&mut self, rng: &mut SimpleRng) {
        for t in self.tiles.iter_mut() {
            if *t == Tile::BOMB1 && rng.next_bool() {
                *t = Tile::BOMB2;
            } else if *t == Tile::BOMB1_FUSED_FIRST && rng.next_bool() {
                *t = Tile::BOMB2_FUSED_FIRST;
            }
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::empty()
    }
}
