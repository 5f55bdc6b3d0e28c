//! Held-direction source polled by game screens each tick.

use crate::types::Keys;

/// Something that knows which directions are currently held down.
///
/// Implemented by the input backend; screens read it through
/// [`Application::controls_state`](crate::Application::controls_state).
pub trait Controls: Send + Sync {
    fn keys(&self) -> Keys;
}

/// Fixed key state, for tests and replays.
#[derive(Debug, Default)]
pub struct FixedControls(parking_lot::Mutex<Keys>);

impl FixedControls {
    pub fn new(keys: Keys) -> Self {
        Self(parking_lot::Mutex::new(keys))
    }

    pub fn set(&self, keys: Keys) {
        *self.0.lock() = keys;
    }
}

impl Controls for FixedControls {
    fn keys(&self) -> Keys {
        *self.0.lock()
    }
}
