//! Persisted `key:value` settings.
//!
//! One pair per line, split at the first colon. Blank lines, lines starting
//! with `#` and lines without a colon are skipped. Typed accessors go through
//! the text form, so a value that fails to parse reads as the default.
//! [`Settings::commit`] writes every pair back sorted by key.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default)]
pub struct Settings {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl Settings {
    /// Empty settings that will be committed to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load from `path`. A missing file gives empty settings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("settings: {} not found, starting empty", path.display());
                return Ok(Self::new(path));
            }
            Err(e) => {
                return Err(EngineError::Settings {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let mut settings = Self::new(path);
        settings.parse(&text);
        debug!(
            "settings: loaded {} keys from {}",
            settings.values.len(),
            settings.path.display()
        );
        Ok(settings)
    }

    fn parse(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once(':') {
                self.values.insert(k.to_string(), v.to_string());
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or(default).to_string()
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.dirty = true;
    }

    /// Parse the stored text as `T`, or return `default`.
    pub fn get<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get_str(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn set<T: Display>(&mut self, key: &str, value: T) {
        self.set_string(key, &value.to_string());
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key, default)
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get(key, default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_str(key).map(str::trim) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let old = self.values.remove(key);
        self.dirty |= old.is_some();
        old
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.values {
            out.push_str(k);
            out.push(':');
            out.push_str(v);
            out.push('\n');
        }
        out
    }

    /// Write all pairs to the settings file, creating its directory.
    pub fn commit(&mut self) -> Result<()> {
        let err = |e: std::io::Error| EngineError::Settings {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(err)?;
        }
        fs::write(&self.path, self.to_text()).map_err(err)?;
        self.dirty = false;
        debug!("settings: committed {} keys", self.values.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Settings {
        let mut s = Settings::new("unused");
        s.parse(text);
        s
    }

    #[test]
    fn skips_comments_blanks_and_colonless_lines() {
        let s = parsed("# comment\n\nlast_level:3\nnonsense\nname:a:b\n");
        assert_eq!(s.len(), 2);
        assert_eq!(s.get_int("last_level", 0), 3);
        assert_eq!(s.get_str("name"), Some("a:b"));
    }

    #[test]
    fn typed_accessors_fall_back_to_default() {
        let s = parsed("n:abc\nf:2.5\nb:true\n");
        assert_eq!(s.get_int("n", 7), 7);
        assert_eq!(s.get_int("missing", -1), -1);
        assert_eq!(s.get_float("f", 0.0), 2.5);
        assert!(s.get_bool("b", false));
        assert!(s.get_bool("missing", true));
    }

    #[test]
    fn commit_text_is_sorted() {
        let mut s = Settings::new("unused");
        s.set("zeta", 1);
        s.set("alpha", 2.5);
        s.set_string("mid", "x");
        assert!(s.is_dirty());
        assert_eq!(s.to_text(), "alpha:2.5\nmid:x\nzeta:1\n");
    }
}
