//! Error types shared across the synchronization engine.
//!
//! Nothing in here escapes [`SyncEngine::tick`](crate::engine::SyncEngine::tick):
//! the tick loop logs and degrades. The variants surface on the setup path
//! (loading configs, adding characters, exporting) and through the strict
//! helpers such as [`warp`](crate::data::warp::warp).

use thiserror::Error;

use crate::data::warp::WarpError;

/// Root error type for the crate.
#[derive(Error, Debug)]
pub enum SyncError {
    /// An operation needs at least one loaded character.
    #[error("engine is not ready: no characters loaded")]
    NotReady,

    /// A character with this id is already registered.
    #[error("character '{0}' is already loaded")]
    DuplicateCharacter(String),

    /// Characters can only join while the engine is still collecting.
    #[error("cannot add character '{0}' after collection has finished")]
    CollectionFinished(String),

    /// No character with this id exists.
    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    /// The tracked anatomical point is missing from a character's skeleton.
    #[error("character '{character}' has no tracked point named '{point}'")]
    LookupFailure { character: String, point: String },

    /// Time remapping could not be evaluated.
    #[error(transparent)]
    Warp(#[from] WarpError),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
