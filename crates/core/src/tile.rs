//! Tile codes for the level grid.
//!
//! Every cell holds a single byte. The ordering matters: ranges of codes
//! are animation frames that advance by incrementing the byte.
//!
//! | Range | Meaning |
//! |-------|---------|
//! | `BLANK..=BOMB2` | static tiles |
//! | `EXPLO00..=EXPLO11` | explosion frames (`EXPLO00` is the blast centre) |
//! | `PRE_EXPLO` | cell hit by a blast this tick, becomes `EXPLO01` next tick |
//! | `CHROME00..=CHROME15` | walls, shaped by their chrome neighbours |
//! | `BOMB1_FUSED_FIRST..=BOMB1_FUSED_LAST` | lit bomb, 60 fuse frames |
//! | `BOMB2_FUSED_FIRST..=BOMB2_FUSED_LAST` | lit bomb (second look) |

use crate::types::{ATLAS_COLUMNS, EXPLO_TICKS, FUSE_TICKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tile(pub u8);

impl Tile {
    pub const BLANK: Tile = Tile(0);
    pub const EARTH: Tile = Tile(1);
    pub const MATCH: Tile = Tile(2);
    pub const PICKET: Tile = Tile(3);
    pub const BOMB1: Tile = Tile(4);
    pub const BOMB2: Tile = Tile(5);
    pub const EXPLO00: Tile = Tile(6);
    pub const EXPLO11: Tile = Tile(Self::EXPLO00.0 + EXPLO_TICKS - 1);
    pub const PRE_EXPLO: Tile = Tile(Self::EXPLO11.0 + 1);
    pub const CHROME00: Tile = Tile(Self::PRE_EXPLO.0 + 1);
    pub const CHROME15: Tile = Tile(Self::CHROME00.0 + 15);
    pub const BOMB1_FUSED_FIRST: Tile = Tile(Self::CHROME15.0 + 1);
    pub const BOMB1_FUSED_LAST: Tile = Tile(Self::BOMB1_FUSED_FIRST.0 + FUSE_TICKS - 1);
    pub const BOMB2_FUSED_FIRST: Tile = Tile(Self::BOMB1_FUSED_LAST.0 + 1);
    pub const BOMB2_FUSED_LAST: Tile = Tile(Self::BOMB2_FUSED_FIRST.0 + FUSE_TICKS - 1);

    /// Number of distinct tile codes
    pub const COUNT: usize = Self::BOMB2_FUSED_LAST.0 as usize + 1;

    pub fn explo(n: u8) -> Tile {
        Tile(Self::EXPLO00.0 + n)
    }

    pub fn chrome(n: u8) -> Tile {
        Tile(Self::CHROME00.0 + n)
    }

    pub fn next(self) -> Tile {
        Tile(self.0 + 1)
    }

    pub fn prev(self) -> Tile {
        Tile(self.0 - 1)
    }

    pub fn is_chrome(self) -> bool {
        self >= Self::CHROME00 && self <= Self::CHROME15
    }

    /// An unlit bomb of either look
    pub fn is_bomb(self) -> bool {
        self == Self::BOMB1 || self == Self::BOMB2
    }

    pub fn is_bomb1_fused(self) -> bool {
        self >= Self::BOMB1_FUSED_FIRST && self <= Self::BOMB1_FUSED_LAST
    }

    pub fn is_bomb2_fused(self) -> bool {
        self >= Self::BOMB2_FUSED_FIRST && self <= Self::BOMB2_FUSED_LAST
    }

    pub fn is_fused(self) -> bool {
        self.is_bomb1_fused() || self.is_bomb2_fused()
    }

    pub fn is_explosion(self) -> bool {
        self >= Self::EXPLO00 && self <= Self::EXPLO11
    }

    /// Cells that kill the pusher
    pub fn is_deadly(self) -> bool {
        self.is_explosion() || self == Self::PRE_EXPLO
    }

    /// Lit version of an unlit bomb
    pub fn lit(self) -> Tile {
        if self == Self::BOMB2 {
            Self::BOMB2_FUSED_FIRST
        } else {
            Self::BOMB1_FUSED_FIRST
        }
    }

    /// Cell in the tile atlas (row-major, [`ATLAS_COLUMNS`] wide) that draws
    /// this tile.
    ///
    /// Lit bombs flash between the bomb and a blank cell every four frames.
    /// The blast centre draws blank; a separate sprite covers it.
    pub fn atlas_index(self) -> u32 {
        let t = self.0 as u32;
        if self <= Self::BOMB2 {
            t
        } else if self == Self::EXPLO00 || self == Self::PRE_EXPLO {
            Self::BLANK.0 as u32
        } else if self.is_explosion() {
            t - 1
        } else if self.is_chrome() {
            t - Self::CHROME00.0 as u32 + 17
        } else if self.is_bomb1_fused() {
            let m = t - Self::BOMB1_FUSED_FIRST.0 as u32;
            if m & 4 == 0 {
                Self::BOMB1.0 as u32
            } else {
                Self::BLANK.0 as u32
            }
        } else if self.is_bomb2_fused() {
            let m = t - Self::BOMB2_FUSED_FIRST.0 as u32;
            if m & 4 == 0 {
                Self::BOMB2.0 as u32
            } else {
                Self::BLANK.0 as u32
            }
        } else {
            Self::BLANK.0 as u32
        }
    }

    /// Atlas cell as (column, row)
    pub fn atlas_cell(self) -> (u32, u32) {
        let n = self.atlas_index();
        (n % ATLAS_COLUMNS, n / ATLAS_COLUMNS)
    }
}

/// Number of cells the tile atlas must provide.
pub const ATLAS_CELLS: u32 = 33;
