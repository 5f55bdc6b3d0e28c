//! Platform services the engine and game need from the host.

use std::path::PathBuf;

use crate::error::Result;
use crate::render::Image;

pub trait Platform: Send + Sync {
    /// Load a named image, generated or decoded at `size` pixels per source
    /// tile where that applies.
    fn load_image(&self, name: &str, size: u32) -> Result<Image>;

    /// Load a named text resource, such as a level.
    fn load_text(&self, name: &str) -> Result<String>;

    /// Localised string for `tag`. Falls back to the tag itself.
    fn translate(&self, tag: &str) -> String {
        tag.to_string()
    }

    /// Where a per-user file named `leaf` lives.
    fn profile_path(&self, leaf: &str) -> PathBuf;
}
