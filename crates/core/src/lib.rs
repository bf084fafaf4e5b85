#![warn(clippy::all, missing_docs)]

//! Core domain logic for the cinelink movie association game.
//!
//! This crate hosts the movie models, dataset ingestion, the connection
//! index, configuration handling and the turn engine used by the terminal
//! UI and any future frontends.

pub mod config;
pub mod error;
pub mod game;
pub mod index;
pub mod ingest;
pub mod models;

pub use config::AppConfig;
pub use error::{ConfigError, ForfeitReason, LoadError, MoveRejection};
pub use game::{
    ConnectionKey, GameController, GameState, GenreWinCondition, Player, PlayerSnapshot,
    TurnOutcome, WinCondition,
};
pub use index::{ConnectionIndex, MovieIndex};
pub use ingest::{load_dataset, DatasetPaths, LoadReport};
pub use models::{Movie, MovieId, MovieRole};
