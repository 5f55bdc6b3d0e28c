//! Bombz (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so binaries, tests and
//! benches can write `bombz::engine::Application` and the like.

pub use bombz_core as core;
pub use bombz_engine as engine;
pub use bombz_game as game;
pub use bombz_input as input;
pub use bombz_term as term;
pub use bombz_types as types;
