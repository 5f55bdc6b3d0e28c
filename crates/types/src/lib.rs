//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types shared by every Bombz crate.
//! All types are pure data structures with no external dependencies, making them
//! usable from the puzzle rules, the engine's threads and the terminal frontend.
//!
//! # Grid Dimensions
//!
//! - **Width**: 20 columns (indexed 0-19)
//! - **Height**: 15 rows (indexed 0-14)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 40 | Logic tick period (25 ticks per second) |
//! | `STEPS_PER_TILE` | 8 | Pusher sub-steps to cross one tile |
//! | `FUSE_TICKS` | 60 | Ticks between lighting a bomb and its explosion |
//! | `EXPLO_TICKS` | 12 | Frames in an explosion animation |
//! | `DEFAULT_TIME_LIMIT` | 180 | Seconds allowed when a level omits its limit |
//!
//! # Events
//!
//! Every [`Event`] has a four character [`EventTag`] packed little-endian
//! into a `u32` so that tags read naturally in hex dumps and logs:
//!
//! ```
//! use bombz_types::{Event, EventTag};
//!
//! assert_eq!(Event::Tick.tag(), EventTag::from_bytes(*b"TICK"));
//! assert_eq!(Event::Stop.tag().to_string(), "STOP");
//! assert!(Event::Tap { x: 1, y: 2 }.is_priority());
//! assert!(!Event::Tick.is_priority());
//! ```

use std::fmt;

/// Level width in tiles (20 columns)
pub const LEVEL_WIDTH: usize = 20;

/// Level height in tiles (15 rows)
pub const LEVEL_HEIGHT: usize = 15;

/// Logic tick period in milliseconds
pub const TICK_MS: u32 = 40;

/// Number of preallocated events in the event pool
pub const EVENT_POOL_SIZE: usize = 16;

/// Sub-steps the pusher takes to cross one tile
pub const STEPS_PER_TILE: i32 = 8;

/// Number of fuse frames before a lit bomb explodes
pub const FUSE_TICKS: u8 = 60;

/// Number of explosion animation frames
pub const EXPLO_TICKS: u8 = 12;

/// Columns in the tile atlas
pub const ATLAS_COLUMNS: u32 = 6;

/// Time limit used when a level file has no limit line (seconds)
pub const DEFAULT_TIME_LIMIT: u32 = 180;

/// Four character code identifying an event type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventTag(pub u32);

impl EventTag {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(b))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventTag({})", self)
    }
}

/// Discrete input or lifecycle event delivered to the logic thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Synthesized once per tick period when nothing else arrives
    Tick,
    /// Pointer tap in render-context pixel coordinates
    Tap { x: i32, y: i32 },
    RenderContextCreated,
    RenderContextDestroyed,
    Pause,
    Resume,
    Stop,
}

impl Event {
    pub const TICK: EventTag = EventTag::from_bytes(*b"TICK");
    pub const TAP: EventTag = EventTag::from_bytes(*b"TAP ");
    pub const RENDER_CONTEXT_CREATED: EventTag = EventTag::from_bytes(*b"RCUP");
    pub const RENDER_CONTEXT_DESTROYED: EventTag = EventTag::from_bytes(*b"RCDN");
    pub const PAUSE: EventTag = EventTag::from_bytes(*b"PAUS");
    pub const RESUME: EventTag = EventTag::from_bytes(*b"RESM");
    pub const STOP: EventTag = EventTag::from_bytes(*b"STOP");

    pub fn tag(&self) -> EventTag {
        match self {
            Event::Tick => Self::TICK,
            Event::Tap { .. } => Self::TAP,
            Event::RenderContextCreated => Self::RENDER_CONTEXT_CREATED,
            Event::RenderContextDestroyed => Self::RENDER_CONTEXT_DESTROYED,
            Event::Pause => Self::PAUSE,
            Event::Resume => Self::RESUME,
            Event::Stop => Self::STOP,
        }
    }

    /// Priority events are delivered even when a tick is overdue.
    pub fn is_priority(&self) -> bool {
        matches!(self, Event::Tap { .. } | Event::Stop)
    }
}

/// Render state of a renderer-with-state.
///
/// The render thread is the only actor that advances the current state to
/// the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Uninitialised,
    Initialised,
    Rendering,
    Free,
    ReplaceScreen,
}

/// Facing / movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    Right,
    #[default]
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step for this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Index into per-direction tables (left, right, up, down)
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}

/// Bitset of held direction controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keys(pub u8);

impl Keys {
    pub const NONE: Keys = Keys(0);
    pub const LEFT: Keys = Keys(1);
    pub const RIGHT: Keys = Keys(2);
    pub const UP: Keys = Keys(4);
    pub const DOWN: Keys = Keys(8);

    pub fn from_direction(dir: Direction) -> Keys {
        match dir {
            Direction::Left => Keys::LEFT,
            Direction::Right => Keys::RIGHT,
            Direction::Up => Keys::UP,
            Direction::Down => Keys::DOWN,
        }
    }

    pub fn contains(self, other: Keys) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn with(self, other: Keys) -> Keys {
        Keys(self.0 | other.0)
    }

    pub fn without(self, other: Keys) -> Keys {
        Keys(self.0 & !other.0)
    }
}

impl std::ops::BitOr for Keys {
    type Output = Keys;

    fn bitor(self, rhs: Keys) -> Keys {
        self.with(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tags_pack_little_endian() {
        assert_eq!(Event::TICK.0, u32::from_le_bytes(*b"TICK"));
        assert_eq!(Event::TICK.to_bytes(), *b"TICK");
        assert_eq!(format!("{}", Event::RENDER_CONTEXT_CREATED), "RCUP");
        assert_eq!(format!("{:?}", Event::PAUSE), "EventTag(PAUS)");
    }

    #[test]
    fn every_event_has_a_distinct_tag() {
        let events = [
            Event::Tick,
            Event::Tap { x: 0, y: 0 },
            Event::RenderContextCreated,
            Event::RenderContextDestroyed,
            Event::Pause,
            Event::Resume,
            Event::Stop,
        ];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a.tag(), b.tag(), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn only_tap_and_stop_are_priority() {
        assert!(Event::Tap { x: 3, y: 4 }.is_priority());
        assert!(Event::Stop.is_priority());
        assert!(!Event::Tick.is_priority());
        assert!(!Event::Pause.is_priority());
        assert!(!Event::Resume.is_priority());
        assert!(!Event::RenderContextCreated.is_priority());
        assert!(!Event::RenderContextDestroyed.is_priority());
    }

    #[test]
    fn keys_bitset_operations() {
        let k = Keys::LEFT | Keys::UP;
        assert!(k.contains(Keys::LEFT));
        assert!(k.contains(Keys::UP));
        assert!(!k.contains(Keys::RIGHT));
        assert!(!k.contains(Keys::NONE));
        assert_eq!(k.without(Keys::LEFT), Keys::UP);
        assert!(Keys::NONE.is_empty());
    }

    #[test]
    fn direction_deltas() {
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert!(Direction::Up.is_vertical());
        assert!(!Direction::Right.is_vertical());
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }
}
