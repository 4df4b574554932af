use std::path::PathBuf;

use thiserror::Error;

/// Level data that cannot be turned into a playable grid.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("level has no goal cell")]
    MissingGoal,

    #[error("level has {count} goal cells, expected exactly one")]
    MultipleGoals { count: usize },

    #[error("level has no character start cell")]
    MissingCharacter,

    #[error("level has {count} character cells, expected exactly one")]
    MultipleCharacters { count: usize },

    #[error("could not read level file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

pub type LevelResult<T> = Result<T, LevelError>;
