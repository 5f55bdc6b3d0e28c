use thiserror::Error;

/// Errors from reading a level file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level has only {found} rows")]
    MissingRows { found: usize },
    #[error("bad time limit {0:?}")]
    BadTimeLimit(String),
}
