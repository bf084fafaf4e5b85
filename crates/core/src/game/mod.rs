//! Turn engine: players, win conditions, connection bookkeeping and the turn countdown.

mod connection;
mod countdown;
mod engine;
mod player;
mod win_condition;

pub use connection::{
    all_connections, find_connection, ConnectionKey, ConnectionLedger, Resolution,
    CONNECTION_LIMIT,
};
pub use engine::{
    GameController, GameState, MoveRecord, TurnOutcome, DEFAULT_TURN_TIME_LIMIT,
    EXTRA_TIME_BONUS, WIN_TARGET,
};
pub use player::{Player, PlayerSnapshot};
pub use win_condition::{GenreWinCondition, WinCondition};
