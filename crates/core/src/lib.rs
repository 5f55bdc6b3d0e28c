//! Core puzzle logic module - pure, deterministic, and testable
//!
//! This module contains the Bombz rules: the level grid, its bombs and
//! explosions, the pusher and the per-attempt clock. It has **zero
//! dependencies** on rendering, threads or I/O, so the same rules run in the
//! engine's logic thread, in tests and in benchmarks.
//!
//! # Module Structure
//!
//! - [`tile`]: tile codes and their atlas cells
//! - [`level`]: 20x15 grid, text loading, wall shaping, fuses and blasts
//! - [`pusher`]: the player character and its tile-by-tile movement
//! - [`playfield`]: one attempt at a level, with time limit and outcome
//! - [`rng`]: seeded LCG used to vary bomb looks
//!
//! # Example
//!
//! ```
//! use bombz_core::{Level, Playfield, SimpleRng};
//! use bombz_types::Keys;
//!
//! let mut text = String::from("S.  O\n");
//! for _ in 1..15 {
//!     text.push('\n');
//! }
//! text.push_str("30\n");
//!
//! let level = Level::parse(&text, &mut SimpleRng::new(1)).unwrap();
//! let mut field = Playfield::new(level);
//! assert!(field.tick(Keys::RIGHT));
//! assert_eq!(field.time_left(), 30);
//! ```
//!
//! # Timing
//!
//! Call [`Playfield::tick`] once per [`TICK_MS`](types::TICK_MS). The pusher
//! crosses a tile in [`STEPS_PER_TILE`](types::STEPS_PER_TILE) ticks, a fuse
//! burns for [`FUSE_TICKS`](types::FUSE_TICKS) ticks.

pub mod error;
pub mod level;
pub mod playfield;
pub mod pusher;
pub mod rng;
pub mod tile;

pub use bombz_types as types;

pub use error::LevelError;
pub use level::{Level, CHROME_SHAPES, LEVEL_SIZE};
pub use playfield::{Outcome, Playfield};
pub use pusher::Pusher;
pub use rng::SimpleRng;
pub use tile::{Tile, ATLAS_CELLS};
