//! Terminal input.
//!
//! Maps `crossterm` key and mouse events to engine events, keeps track of
//! held direction keys (with a release timeout for terminals that never send
//! key-release events) and runs the thread that feeds both into an
//! [`Application`](bombz_engine::Application).

pub mod controls;
pub mod map;
pub mod pump;

pub use bombz_types as types;

pub use controls::{HeldKeys, KeyboardControls};
pub use map::{map_key, map_mouse, should_quit, InputAction};
pub use pump::InputPump;
