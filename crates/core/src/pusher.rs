//! Pusher module - the player character
//!
//! The pusher moves one tile at a time in [`STEPS_PER_TILE`] sub-steps.
//! Direction keys are only sampled while it stands still on a tile.
//!
//! - Opposite keys cancel each other out.
//! - With a horizontal and a vertical key both held, it tries the axis it
//!   was *not* moving along first, so holding two keys walks a staircase.
//! - Half-way into a tile it clears earth and picks up matches.
//! - Walking into an unlit bomb with a match lights the bomb and the pusher
//!   stays put. Without a match the bomb is lifted off the grid, carried
//!   one tile ahead and dropped when the pusher arrives.

use crate::level::Level;
use crate::tile::Tile;
use crate::types::{Direction, Keys, STEPS_PER_TILE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pusher {
    tile_x: i32,
    tile_y: i32,
    inter_x: i32,
    inter_y: i32,
    direction: Direction,
    moving: bool,
    have_match: bool,
    pushing_bomb: Option<Tile>,
    moves: u32,
}

/// Held directions after cancelling and axis selection
#[derive(Debug, Clone, Copy, Default)]
struct Lrud {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl Pusher {
    pub fn new(level: &Level) -> Self {
        let (tile_x, tile_y) = level.start();
        Self {
            tile_x,
            tile_y,
            inter_x: 0,
            inter_y: 0,
            direction: Direction::Up,
            moving: false,
            have_match: false,
            pushing_bomb: None,
            moves: 0,
        }
    }

    /// Put the pusher back on the level's start tile.
    pub fn reset(&mut self, level: &Level) {
        *self = Self::new(level);
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn has_match(&self) -> bool {
        self.have_match
    }

    /// The bomb currently being carried ahead of the pusher
    pub fn pushing_bomb(&self) -> Option<Tile> {
        self.pushing_bomb
    }

    /// Number of changes of direction
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Top-left pixel position for a given on-screen tile size.
    pub fn pixel_pos(&self, tile_size: i32) -> (i32, i32) {
        (
            self.tile_x * tile_size + (self.inter_x * tile_size) / STEPS_PER_TILE,
            self.tile_y * tile_size + (self.inter_y * tile_size) / STEPS_PER_TILE,
        )
    }

    /// Top-left pixel position of the carried bomb.
    pub fn bomb_pixel_pos(&self, tile_size: i32) -> (i32, i32) {
        let (x, y) = self.pixel_pos(tile_size);
        let (dx, dy) = self.direction.delta();
        (x + dx * tile_size, y + dy * tile_size)
    }

    /// Advance one tick. Returns true if the pusher moved.
    pub fn step(&mut self, level: &mut Level, keys: Keys) -> bool {
        if !self.moving {
            self.start_move(level, keys);
        }
        if !self.moving {
            return false;
        }

        let half = STEPS_PER_TILE / 2;
        let (dx, dy) = self.direction.delta();
        self.inter_x += dx;
        self.inter_y += dy;
        let progress = (self.inter_x + self.inter_y).abs();
        if progress == STEPS_PER_TILE {
            self.arrive(level, dx, dy);
        } else if progress == half {
            self.halfway(level, dx, dy);
        }
        true
    }

    fn start_move(&mut self, level: &mut Level, keys: Keys) {
        let mut lrud = Lrud {
            left: keys.contains(Keys::LEFT),
            right: keys.contains(Keys::RIGHT),
            up: keys.contains(Keys::UP),
            down: keys.contains(Keys::DOWN),
        };
        if lrud.left && lrud.right {
            lrud.left = false;
            lrud.right = false;
        }
        if lrud.up && lrud.down {
            lrud.up = false;
            lrud.down = false;
        }

        if self.direction.is_vertical() {
            if !self.check_horiz(level, &mut lrud) {
                self.check_vert(level, &mut lrud);
            }
        } else if !self.check_vert(level, &mut lrud) {
            self.check_horiz(level, &mut lrud);
        }

        let dir = if lrud.left {
            Direction::Left
        } else if lrud.right {
            Direction::Right
        } else if lrud.up {
            Direction::Up
        } else if lrud.down {
            Direction::Down
        } else {
            return;
        };

        if dir != self.direction {
            self.moves += 1;
        }
        self.direction = dir;
        self.moving = true;

        let (dx, dy) = dir.delta();
        let (tx, ty) = (self.tile_x + dx, self.tile_y + dy);
        let target = level.tile_at(tx, ty);
        if target.is_bomb() {
            if self.have_match {
                level.set_active_tile_at(tx, ty, target.lit());
                self.moving = false;
                self.have_match = false;
            } else {
                self.pushing_bomb = Some(target);
                level.set_blank_at(tx, ty);
            }
        }
    }

    fn check_horiz(&self, level: &Level, lrud: &mut Lrud) -> bool {
        let (x, y, m) = (self.tile_x, self.tile_y, self.have_match);
        if (lrud.left && level.can_move_to(x - 1, y, -1, 0, m))
            || (lrud.right && level.can_move_to(x + 1, y, 1, 0, m))
        {
            lrud.up = false;
            lrud.down = false;
            true
        } else {
            lrud.left = false;
            lrud.right = false;
            false
        }
    }

    fn check_vert(&self, level: &Level, lrud: &mut Lrud) -> bool {
        let (x, y, m) = (self.tile_x, self.tile_y, self.have_match);
        if (lrud.up && level.can_move_to(x, y - 1, 0, -1, m))
            || (lrud.down && level.can_move_to(x, y + 1, 0, 1, m))
        {
            lrud.left = false;
            lrud.right = false;
            true
        } else {
            lrud.up = false;
            lrud.down = false;
            false
        }
    }

    fn halfway(&mut self, level: &mut Level, dx: i32, dy: i32) {
        let (x, y) = (self.tile_x + dx, self.tile_y + dy);
        let t = level.tile_at(x, y);
        if t == Tile::MATCH {
            self.have_match = true;
            level.set_blank_at(x, y);
        } else if t == Tile::EARTH {
            level.set_blank_at(x, y);
        }
    }

    fn arrive(&mut self, level: &mut Level, dx: i32, dy: i32) {
        self.inter_x = 0;
        self.inter_y = 0;
        self.tile_x += dx;
        self.tile_y += dy;
        self.moving = false;
        if let Some(bomb) = self.pushing_bomb.take() {
            level.set_tile_at(self.tile_x + dx, self.tile_y + dy, bomb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;
    use crate::types::LEVEL_HEIGHT;

    fn level(rows: &[&str]) -> Level {
        let mut s = String::new();
        for y in 0..LEVEL_HEIGHT {
            s.push_str(rows.get(y).copied().unwrap_or(""));
            s.push('\n');
        }
        s.push_str("60\n");
        Level::parse(&s, &mut SimpleRng::new(5)).unwrap()
    }

    fn walk(p: &mut Pusher, level: &mut Level, keys: Keys, ticks: i32) {
        for _ in 0..ticks {
            p.step(level, keys);
        }
    }

    #[test]
    fn walks_one_tile_in_steps() {
        let mut lvl = level(&["S  "]);
        let mut p = Pusher::new(&lvl);
        assert_eq!(p.tile(), (0, 0));

        assert!(p.step(&mut lvl, Keys::RIGHT));
        assert!(p.is_moving());
        assert_eq!(p.pixel_pos(16), (2, 0));
        walk(&mut p, &mut lvl, Keys::NONE, STEPS_PER_TILE - 1);
        assert_eq!(p.tile(), (1, 0));
        assert!(!p.is_moving());
        assert_eq!(p.direction(), Direction::Right);
        assert!(!p.step(&mut lvl, Keys::NONE));
    }

    #[test]
    fn blocked_by_pickets_and_edges() {
        let mut lvl = level(&["SB"]);
        let mut p = Pusher::new(&lvl);
        assert!(!p.step(&mut lvl, Keys::RIGHT));
        assert!(!p.step(&mut lvl, Keys::LEFT));
        assert!(!p.step(&mut lvl, Keys::UP));
        assert_eq!(p.tile(), (0, 0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut lvl = level(&[" S "]);
        let mut p = Pusher::new(&lvl);
        assert!(!p.step(&mut lvl, Keys::LEFT | Keys::RIGHT));
    }

    #[test]
    fn diagonal_input_alternates_axes() {
        let mut lvl = level(&["S", "", ""]);
        let mut p = Pusher::new(&lvl);
        // Starts facing up, so horizontal is tried first.
        walk(&mut p, &mut lvl, Keys::RIGHT | Keys::DOWN, STEPS_PER_TILE);
        assert_eq!(p.tile(), (1, 0));
        walk(&mut p, &mut lvl, Keys::RIGHT | Keys::DOWN, STEPS_PER_TILE);
        assert_eq!(p.tile(), (1, 1));
        walk(&mut p, &mut lvl, Keys::RIGHT | Keys::DOWN, STEPS_PER_TILE);
        assert_eq!(p.tile(), (2, 1));
        assert_eq!(p.moves(), 3);
    }

    #[test]
    fn digs_earth_and_collects_match() {
        let mut lvl = level(&["S.D"]);
        let mut p = Pusher::new(&lvl);
        walk(&mut p, &mut lvl, Keys::RIGHT, STEPS_PER_TILE / 2);
        assert_eq!(lvl.tile_at(1, 0), Tile::BLANK);
        walk(&mut p, &mut lvl, Keys::RIGHT, STEPS_PER_TILE / 2 + STEPS_PER_TILE);
        assert_eq!(p.tile(), (2, 0));
        assert!(p.has_match());
        assert_eq!(lvl.matches_left(), 0);
    }

    #[test]
    fn pushes_bomb_one_tile() {
        let mut lvl = level(&["SO "]);
        let bomb = lvl.tile_at(1, 0);
        let mut p = Pusher::new(&lvl);
        p.step(&mut lvl, Keys::RIGHT);
        assert_eq!(p.pushing_bomb(), Some(bomb));
        assert_eq!(lvl.tile_at(1, 0), Tile::BLANK);
        assert_eq!(p.bomb_pixel_pos(8), (9, 0));
        walk(&mut p, &mut lvl, Keys::NONE, STEPS_PER_TILE - 1);
        assert_eq!(p.tile(), (1, 0));
        assert_eq!(lvl.tile_at(2, 0), bomb);
        assert_eq!(p.pushing_bomb(), None);
    }

    #[test]
    fn lights_bomb_with_match() {
        let mut lvl = level(&["DSO"]);
        let mut p = Pusher::new(&lvl);
        walk(&mut p, &mut lvl, Keys::LEFT, STEPS_PER_TILE);
        assert!(p.has_match());
        assert!(!lvl.has_activity());

        // Walk back, then into the bomb: it lights and the pusher stays put.
        walk(&mut p, &mut lvl, Keys::RIGHT, STEPS_PER_TILE);
        assert_eq!(p.tile(), (1, 0));
        assert!(!p.step(&mut lvl, Keys::RIGHT));
        assert_eq!(p.tile(), (1, 0));
        assert!(lvl.tile_at(2, 0).is_fused());
        assert!(lvl.has_activity());
        assert!(!p.has_match());
        assert!(!p.is_moving());
    }
}
