//! Built-in resources: generated artwork and levels compiled into the binary.

use std::path::PathBuf;

use log::debug;

use bombz_engine::{resource_error, Image, Platform, Result};

use crate::assets::{self, ALPHA_ATLAS, LOGO, TILE_ATLAS};

const LEVELS: [&str; 8] = [
    include_str!("../levels/01.txt"),
    include_str!("../levels/02.txt"),
    include_str!("../levels/03.txt"),
    include_str!("../levels/04.txt"),
    include_str!("../levels/05.txt"),
    include_str!("../levels/06.txt"),
    include_str!("../levels/07.txt"),
    include_str!("../levels/08.txt"),
];

/// Number of built-in levels. Levels are numbered from 1.
pub const N_LEVELS: u32 = LEVELS.len() as u32;

/// Resource name of level `n`.
pub fn level_resource(n: u32) -> String {
    format!("levels/{:02}", n)
}

fn level_number(name: &str) -> Option<u32> {
    name.strip_prefix("levels/")?.parse().ok()
}

#[derive(Debug, Clone)]
pub struct BuiltinPlatform {
    profile_dir: PathBuf,
}

impl BuiltinPlatform {
    pub fn new(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile_dir: profile_dir.into(),
        }
    }
}

impl Platform for BuiltinPlatform {
    fn load_image(&self, name: &str, size: u32) -> Result<Image> {
        debug!("platform: generating {} at {}px", name, size);
        match name {
            TILE_ATLAS => Ok(assets::tile_atlas(size)),
            ALPHA_ATLAS => Ok(assets::alpha_atlas(size)),
            LOGO => Ok(assets::logo(size)),
            _ => Err(resource_error!(name, "no such image")),
        }
    }

    fn load_text(&self, name: &str) -> Result<String> {
        let text = level_number(name)
            .filter(|n| (1..=N_LEVELS).contains(n))
            .map(|n| LEVELS[(n - 1) as usize]);
        match text {
            Some(text) => Ok(text.to_string()),
            None => Err(resource_error!(name, "no such text resource")),
        }
    }

    fn translate(&self, tag: &str) -> String {
        let text = match tag {
            "play" => "PLAY",
            "choose_level" => "CHOOSE LEVEL",
            "quit" => "QUIT",
            "previous" => "<",
            "next" => ">",
            "back" => "BACK",
            "resume" => "RESUME",
            "exit" => "EXIT",
            "paused" => "PAUSED",
            "level" => "LEVEL",
            "won" => "WELL DONE",
            "time_up" => "OUT OF TIME",
            "exploded" => "BOOM",
            _ => tag,
        };
        text.to_string()
    }

    fn profile_path(&self, leaf: &str) -> PathBuf {
        self.profile_dir.join(leaf)
    }
}
