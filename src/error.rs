//! Error types for the game core.
//!
//! Nothing here is fatal to a session: the round machine degrades to a fresh
//! round on every failure except an unusable catalog.

use thiserror::Error;

/// Errors surfaced by session transitions.
#[derive(Debug, Error)]
pub enum GameError {
    /// Fewer than two artists loaded; no pair can be formed.
    #[error("artist catalog unavailable ({artists} artists loaded, need at least 2)")]
    CatalogUnavailable { artists: usize },

    #[error("stored round is corrupt: {0}")]
    PersistenceCorrupt(#[from] PersistenceError),

    /// Every step of the fallback chain came back empty.
    #[error("no candidate artist available")]
    NoCandidateAvailable,

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors raised by the persistence gateway and its storage backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("malformed saved state: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("saved state is inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors raised while loading an artist catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}
