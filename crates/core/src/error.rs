//! Error types shared across the core crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::{ConnectionKey, WIN_TARGET};

/// Failures that abort a dataset load. Individual bad rows never surface here.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The CSV file could not be opened or its header read.
    #[error("failed to read {path}: {source}")]
    Csv {
        /// File being read.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: csv::Error,
    },
    /// A column the loader depends on is absent from the header.
    #[error("{path} is missing required column `{column}`")]
    MissingColumn {
        /// File being read.
        path: PathBuf,
        /// Name of the absent column.
        column: &'static str,
    },
    /// Discovery found no file for one of the datasets.
    #[error("no {kind} CSV found under {dir}")]
    DatasetNotFound {
        /// `movies` or `credits`.
        kind: &'static str,
        /// Directory that was searched.
        dir: PathBuf,
    },
}

/// Invalid values in an otherwise readable configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Turn limit of zero seconds.
    #[error("turn_time_limit must be a positive number of seconds")]
    InvalidTurnTimeLimit,
    /// Genre target the game could never award, since a win also needs `WIN_TARGET` points.
    #[error("genre_target must be at least {}", WIN_TARGET)]
    InvalidGenreTarget,
}

/// Why a move was refused without touching the game.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveRejection {
    /// No game is running.
    #[error("the game is not in progress")]
    NotInProgress,
    /// Empty or whitespace-only input.
    #[error("no title given")]
    BlankTitle,
    /// The title does not match any indexed movie.
    #[error("unknown movie: {0}")]
    UnknownTitle(String),
    /// The movie was already played in this game.
    #[error("{0} has already been used")]
    AlreadyUsed(String),
}

/// Why the mover lost the game.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForfeitReason {
    /// The named movie shares nobody with the reference movie.
    #[error("{candidate} has no connection to {reference}")]
    NoConnection {
        /// Movie the move had to connect to.
        reference: String,
        /// Movie that was named.
        candidate: String,
    },
    /// Every connection to the named movie is used up.
    #[error("connection {0} is used up")]
    ConnectionExhausted(ConnectionKey),
    /// The turn countdown reached zero.
    #[error("time ran out")]
    TimeExpired,
}
