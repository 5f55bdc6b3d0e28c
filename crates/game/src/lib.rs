//! The Bombz game: screens, artwork and built-in levels on top of the engine.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`hub`] | shared resources, current level, settings |
//! | [`menu`] | main menu, level chooser, pause |
//! | [`game_screen`] | playing a level |
//! | [`tiles`] | uploaded atlases and their regions |
//! | [`assets`] | procedurally drawn artwork |
//! | [`font`] | 3x5 pixel font |
//! | [`text`] | label textures |
//! | [`stats`] | per-level statistics |
//! | [`platform`] | built-in resources |

pub mod assets;
pub mod font;
pub mod game_screen;
pub mod hub;
pub mod menu;
pub mod platform;
pub mod stats;
pub mod text;
pub mod tiles;

pub use bombz_types as types;

pub use game_screen::{GameScreen, OUTCOME_TICKS};
pub use hub::ScreenHub;
pub use menu::{MenuAction, MenuScreen};
pub use platform::{level_resource, BuiltinPlatform, N_LEVELS};
pub use stats::LevelStats;
pub use tiles::Tiles;
