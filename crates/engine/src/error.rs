//! Engine error type.

use thiserror::Error;

use crate::render::AtlasId;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A named asset could not be loaded or parsed.
    #[error("{name}: {reason} ({func} at {file}:{line})")]
    Resource {
        name: String,
        reason: String,
        file: &'static str,
        line: u32,
        func: &'static str,
    },

    /// The render backend failed.
    #[error("render backend: {0}")]
    Backend(String),

    /// A texture handle from a render context generation that no longer exists.
    #[error("texture {0:?} is stale")]
    StaleTexture(AtlasId),

    #[error("draw with no texture bound")]
    NoTexture,

    #[error("settings {path}: {reason}")]
    Settings { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Build an [`EngineError::Resource`] tagged with the call site.
#[macro_export]
macro_rules! resource_error {
    ($name:expr, $($arg:tt)+) => {
        $crate::EngineError::Resource {
            name: ($name).to_string(),
            reason: format!($($arg)+),
            file: file!(),
            line: line!(),
            func: module_path!(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_records_call_site() {
        let err = resource_error!("level07.txt", "only {} rows", 3);
        match &err {
            EngineError::Resource {
                name, reason, file, line, ..
            } => {
                assert_eq!(name, "level07.txt");
                assert_eq!(reason, "only 3 rows");
                assert!(file.ends_with("error.rs"));
                assert!(*line > 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().starts_with("level07.txt: only 3 rows"));
    }
}
