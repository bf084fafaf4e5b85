use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    fmt::Write as _,
    sync::{Arc, Weak},
};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::{
    error::{ForfeitReason, MoveRejection},
    index::ConnectionIndex,
    models::{Movie, MovieId},
};

use super::{
    connection::{ConnectionKey, ConnectionLedger, Resolution},
    countdown::Countdown,
    player::{Player, PlayerSnapshot},
};

/// Seconds per turn unless configured otherwise.
pub const DEFAULT_TURN_TIME_LIMIT: i64 = 30;
/// Seconds granted by a player's one-shot extension.
pub const EXTRA_TIME_BONUS: i64 = 60;
/// Score a player needs, alongside a satisfied win condition, to win.
pub const WIN_TARGET: u32 = 5;

const PLAYER_COUNT: usize = 2;

/// Lifecycle of one game. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameState {
    /// Players and the initial movie are being set up.
    NotStarted,
    /// Turns are being played.
    InProgress,
    /// A winner was decided or the game was ended.
    Completed,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameState::NotStarted => "NOT_STARTED",
            GameState::InProgress => "IN_PROGRESS",
            GameState::Completed => "COMPLETED",
        })
    }
}

/// One accepted move.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    /// Turn count at which the move was made.
    pub turn: u32,
    /// Name of the mover.
    pub player: String,
    /// Movie named.
    pub movie: Arc<Movie>,
    /// Connection the move consumed.
    pub connection: ConnectionKey,
    /// Wall-clock time of the move.
    pub played_at: DateTime<Local>,
}

/// Result of [`GameController::play_turn`].
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Move accepted; play passes to the opponent.
    Accepted {
        /// Movie named.
        movie: Arc<Movie>,
        /// Connection consumed.
        connection: ConnectionKey,
        /// Points awarded for the move.
        points: u32,
    },
    /// Move accepted and it won the game for the mover.
    Won {
        /// Movie named.
        movie: Arc<Movie>,
        /// Connection consumed.
        connection: ConnectionKey,
        /// The mover.
        winner: PlayerSnapshot,
    },
    /// Input refused; nothing changed.
    Rejected(MoveRejection),
    /// The move broke a rule and the opponent won.
    Forfeited {
        /// Rule that was broken.
        reason: ForfeitReason,
        /// The opponent.
        winner: PlayerSnapshot,
    },
}

impl TurnOutcome {
    /// Whether the move was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, TurnOutcome::Accepted { .. } | TurnOutcome::Won { .. })
    }
}

/// Turn-resolution engine for a two-player game.
///
/// All state sits behind one mutex shared with the countdown task, so a
/// timeout and a move for the same turn are strictly ordered and only the
/// first one takes effect. The countdown only runs when the controller is
/// created inside a tokio runtime.
pub struct GameController {
    index: Arc<dyn ConnectionIndex>,
    shared: Arc<Mutex<GameInner>>,
}

impl GameController {
    /// Create a game over `index`, picking up the current tokio runtime if any.
    pub fn new(index: Arc<dyn ConnectionIndex>) -> Self {
        Self::with_runtime(index, Handle::try_current().ok())
    }

    /// Create a game whose countdown runs on `runtime`; `None` leaves the counter static.
    pub fn with_runtime(index: Arc<dyn ConnectionIndex>, runtime: Option<Handle>) -> Self {
        let shared = Arc::new_cyclic(|this| Mutex::new(GameInner::new(this.clone(), runtime)));
        Self { index, shared }
    }

    /// Register a player. Fails once two are registered, after start, or on a blank or duplicate name.
    pub fn add_player(&self, player: Player) -> bool {
        let mut inner = self.shared.lock();
        let name = player.name().trim();
        if inner.state != GameState::NotStarted
            || inner.players.len() >= PLAYER_COUNT
            || name.is_empty()
            || inner.players.iter().any(|p| p.name() == player.name())
        {
            return false;
        }
        info!(player = %player.name(), "Player joined");
        inner.players.push(player);
        true
    }

    /// Set the starting movie. Only the first call before start has any effect.
    pub fn set_initial_movie(&self, movie: Arc<Movie>) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != GameState::NotStarted || inner.initial.is_some() {
            return false;
        }
        info!(movie = %movie.title(), "Initial movie set");
        inner.used.insert(movie.id());
        inner.initial = Some(movie);
        true
    }

    /// Change the per-turn limit. Non-positive values are ignored.
    ///
    /// During a game the running countdown is left alone; the new limit applies
    /// from the next turn.
    pub fn set_turn_time_limit(&self, seconds: i64) -> bool {
        if seconds <= 0 {
            return false;
        }
        let mut inner = self.shared.lock();
        inner.turn_time_limit = seconds;
        if inner.state == GameState::NotStarted {
            inner.seconds_remaining = seconds;
        }
        true
    }

    /// Configured per-turn limit in seconds.
    pub fn turn_time_limit(&self) -> i64 {
        self.shared.lock().turn_time_limit
    }

    /// Begin play. Needs two players and an initial movie.
    pub fn start(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != GameState::NotStarted
            || inner.players.len() != PLAYER_COUNT
            || inner.initial.is_none()
        {
            return false;
        }
        inner.state = GameState::InProgress;
        inner.turn_count = 0;
        inner.started_at = Some(Local::now());
        inner.arm_turn();
        info!(
            first = %inner.players[0].name(),
            second = %inner.players[1].name(),
            limit = inner.turn_time_limit,
            "Game started"
        );
        true
    }

    /// Resolve a move for the current player. `true` only when accepted.
    ///
    /// A `false` return may still have ended the game (no connection or an
    /// exhausted one); check [`GameController::state`] afterwards.
    pub fn process_turn(&self, title: &str) -> bool {
        self.play_turn(title).is_accepted()
    }

    /// Resolve a move for the current player and report exactly what happened.
    pub fn play_turn(&self, title: &str) -> TurnOutcome {
        let mut inner = self.shared.lock();
        if inner.state != GameState::InProgress {
            return reject(MoveRejection::NotInProgress);
        }
        let title = title.trim();
        if title.is_empty() {
            return reject(MoveRejection::BlankTitle);
        }
        let Some(movie) = self.index.by_title(title) else {
            return reject(MoveRejection::UnknownTitle(title.to_string()));
        };
        if inner.used.contains(&movie.id()) {
            return reject(MoveRejection::AlreadyUsed(movie.title().to_string()));
        }
        let Some(reference) = inner.reference_movie() else {
            return reject(MoveRejection::NotInProgress);
        };

        match inner.ledger.resolve(&reference, &movie) {
            Resolution::Available(connection) => inner.accept(movie, connection),
            Resolution::Exhausted(connection) => {
                inner.forfeit(ForfeitReason::ConnectionExhausted(connection))
            }
            Resolution::Unconnected => inner.forfeit(ForfeitReason::NoConnection {
                reference: reference.title().to_string(),
                candidate: movie.title().to_string(),
            }),
        }
    }

    /// Unused movies reachable from the reference movie over a connection with uses left.
    pub fn possible_moves(&self) -> Vec<Arc<Movie>> {
        let (reference, used, ledger) = {
            let inner = self.shared.lock();
            if inner.state == GameState::Completed {
                return Vec::new();
            }
            let Some(reference) = inner.reference_movie() else {
                return Vec::new();
            };
            (reference, inner.used.clone(), inner.ledger.clone())
        };

        self.index
            .connected_to(&reference)
            .into_iter()
            .filter(|movie| !used.contains(&movie.id()))
            .filter(|movie| {
                matches!(
                    ledger.resolve(&reference, movie),
                    Resolution::Available(_)
                )
            })
            .collect()
    }

    /// Movie the next move must connect to.
    pub fn reference_movie(&self) -> Option<Arc<Movie>> {
        self.shared.lock().reference_movie()
    }

    /// Player to move; `None` unless a game is in progress.
    pub fn current_player(&self) -> Option<PlayerSnapshot> {
        let inner = self.shared.lock();
        if inner.state != GameState::InProgress {
            return None;
        }
        inner.players.get(inner.current_index()).map(Player::snapshot)
    }

    /// The other registered player.
    pub fn opponent_of(&self, name: &str) -> Option<PlayerSnapshot> {
        let inner = self.shared.lock();
        if inner.players.len() != PLAYER_COUNT {
            return None;
        }
        let position = inner.players.iter().position(|p| p.name() == name)?;
        Some(inner.players[1 - position].snapshot())
    }

    /// Winner once decided.
    pub fn winner(&self) -> Option<PlayerSnapshot> {
        let inner = self.shared.lock();
        inner.winner.map(|index| inner.players[index].snapshot())
    }

    /// Both players in registration order.
    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.shared
            .lock()
            .players
            .iter()
            .map(Player::snapshot)
            .collect()
    }

    /// Current state.
    pub fn state(&self) -> GameState {
        self.shared.lock().state
    }

    /// Accepted moves so far, excluding a winning one.
    pub fn turn_count(&self) -> u32 {
        self.shared.lock().turn_count
    }

    /// Seconds left in the current turn.
    pub fn seconds_remaining(&self) -> i64 {
        self.shared.lock().seconds_remaining
    }

    /// Add `seconds` to the running turn using the current player's one-shot extension.
    pub fn add_extra_time(&self, seconds: i64) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != GameState::InProgress || seconds <= 0 {
            return false;
        }
        let current = inner.current_index();
        let player = &mut inner.players[current];
        if !player.has_extra_time_available() {
            return false;
        }
        player.use_extra_time();
        info!(player = %player.name(), seconds, "Extra time granted");
        inner.seconds_remaining += seconds;
        true
    }

    /// [`GameController::add_extra_time`] with [`EXTRA_TIME_BONUS`].
    pub fn request_extra_time(&self) -> bool {
        self.add_extra_time(EXTRA_TIME_BONUS)
    }

    /// Forfeit the current player as if their countdown had run out.
    pub fn handle_time_expired(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != GameState::InProgress {
            return false;
        }
        inner.forfeit(ForfeitReason::TimeExpired);
        true
    }

    /// Uses per connection key.
    pub fn connection_usage(&self) -> BTreeMap<ConnectionKey, u32> {
        self.shared.lock().ledger.counts()
    }

    /// Accepted moves, oldest first.
    pub fn move_log(&self) -> Vec<MoveRecord> {
        self.shared.lock().moves.clone()
    }

    /// Starting movie, once set.
    pub fn initial_movie(&self) -> Option<Arc<Movie>> {
        self.shared.lock().initial.clone()
    }

    /// Multi-line status report.
    pub fn summary(&self) -> String {
        self.shared.lock().summary()
    }

    /// Stop an in-progress game. A player whose condition is met with a winning score is declared winner.
    pub fn end(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state != GameState::InProgress {
            return false;
        }
        let winner = inner.players.iter().position(|player| {
            player.win_condition().is_satisfied() && player.score() >= WIN_TARGET
        });
        inner.complete(winner);
        info!(
            winner = winner.map(|i| inner.players[i].name()).unwrap_or("none"),
            "Game ended manually"
        );
        true
    }

    /// Release the countdown task for good. The game state stays queryable and moves are
    /// still resolved, but no further timer is scheduled.
    pub fn dispose(&self) {
        self.shared.lock().countdown.release();
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn reject(reason: MoveRejection) -> TurnOutcome {
    debug!(%reason, "Move rejected");
    TurnOutcome::Rejected(reason)
}

pub(crate) struct GameInner {
    this: Weak<Mutex<GameInner>>,
    state: GameState,
    players: Vec<Player>,
    turn_count: u32,
    initial: Option<Arc<Movie>>,
    used: HashSet<MovieId>,
    ledger: ConnectionLedger,
    seconds_remaining: i64,
    turn_time_limit: i64,
    winner: Option<usize>,
    countdown: Countdown,
    moves: Vec<MoveRecord>,
    started_at: Option<DateTime<Local>>,
}

impl GameInner {
    fn new(this: Weak<Mutex<GameInner>>, runtime: Option<Handle>) -> Self {
        Self {
            this,
            state: GameState::NotStarted,
            players: Vec::with_capacity(PLAYER_COUNT),
            turn_count: 0,
            initial: None,
            used: HashSet::new(),
            ledger: ConnectionLedger::default(),
            seconds_remaining: DEFAULT_TURN_TIME_LIMIT,
            turn_time_limit: DEFAULT_TURN_TIME_LIMIT,
            winner: None,
            countdown: Countdown::new(runtime),
            moves: Vec::new(),
            started_at: None,
        }
    }

    /// Player A on even turns, player B on odd.
    fn current_index(&self) -> usize {
        self.turn_count as usize % PLAYER_COUNT
    }

    fn opponent_index(&self) -> usize {
        1 - self.current_index()
    }

    fn reference_movie(&self) -> Option<Arc<Movie>> {
        if self.turn_count == 0 {
            return self.initial.clone();
        }
        self.players
            .get(self.opponent_index())
            .and_then(|opponent| opponent.last_named_movie().cloned())
            .or_else(|| self.initial.clone())
    }

    fn arm_turn(&mut self) {
        self.seconds_remaining = self.turn_time_limit;
        let this = self.this.clone();
        self.countdown.arm(this);
    }

    fn accept(&mut self, movie: Arc<Movie>, connection: ConnectionKey) -> TurnOutcome {
        let uses = self.ledger.increment(&connection);
        self.used.insert(movie.id());
        self.countdown.disarm();

        let mover = self.current_index();
        let player = &mut self.players[mover];
        let points = u32::from(player.win_condition().awards_point(&movie));
        player.add_named_movie(movie.clone());
        player.add_score(points as i32);
        debug!(
            player = %player.name(),
            movie = %movie.title(),
            connection = %connection,
            uses,
            points,
            "Move accepted"
        );

        let won = player.win_condition().is_satisfied() && player.score() >= WIN_TARGET;
        self.moves.push(MoveRecord {
            turn: self.turn_count,
            player: player.name().to_string(),
            movie: movie.clone(),
            connection: connection.clone(),
            played_at: Local::now(),
        });

        if won {
            self.complete(Some(mover));
            let winner = self.players[mover].snapshot();
            info!(winner = %winner.name, score = winner.score, "Game won");
            return TurnOutcome::Won {
                movie,
                connection,
                winner,
            };
        }

        self.turn_count += 1;
        self.arm_turn();
        TurnOutcome::Accepted {
            movie,
            connection,
            points,
        }
    }

    fn forfeit(&mut self, reason: ForfeitReason) -> TurnOutcome {
        let loser = self.current_index();
        let winner = self.opponent_index();
        self.complete(Some(winner));
        info!(
            loser = %self.players[loser].name(),
            winner = %self.players[winner].name(),
            %reason,
            "Player forfeited"
        );
        TurnOutcome::Forfeited {
            reason,
            winner: self.players[winner].snapshot(),
        }
    }

    fn complete(&mut self, winner: Option<usize>) {
        self.state = GameState::Completed;
        self.winner = winner;
        self.countdown.disarm();
        if let Some(started) = self.started_at {
            let elapsed = Local::now().signed_duration_since(started);
            debug!(seconds = elapsed.num_seconds(), turns = self.turn_count, "Game completed");
        }
    }

    /// One countdown tick for `generation`. Returns whether the timer should keep running.
    pub(crate) fn tick(&mut self, generation: u64) -> bool {
        if generation != self.countdown.generation() || self.state != GameState::InProgress {
            return false;
        }
        self.seconds_remaining = (self.seconds_remaining - 1).max(0);
        if self.seconds_remaining > 0 {
            return true;
        }
        self.forfeit(ForfeitReason::TimeExpired);
        false
    }

    fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Game status: {}", self.state);
        let _ = writeln!(out, "Turn count: {}", self.turn_count);
        match self.state {
            GameState::InProgress => {
                if let Some(player) = self.players.get(self.current_index()) {
                    let _ = writeln!(out, "Current player: {}", player.name());
                }
                let _ = writeln!(out, "Time remaining: {}s", self.seconds_remaining);
            }
            GameState::Completed => match self.winner {
                Some(index) => {
                    let _ = writeln!(out, "Winner: {}", self.players[index].name());
                }
                None => {
                    let _ = writeln!(out, "Game ended with no winner");
                }
            },
            GameState::NotStarted => {}
        }

        let _ = writeln!(out, "\nPlayers:");
        for player in &self.players {
            let _ = writeln!(out, "- {player}");
        }

        if !self.ledger.is_empty() {
            let _ = writeln!(out, "\nConnection usage counts:");
            for (key, count) in self.ledger.counts() {
                let _ = writeln!(out, "- {key}: {count}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::GenreWinCondition, index::MovieIndex, models::MovieRole};

    fn controller() -> (MovieIndex, GameController) {
        let index = MovieIndex::new();
        let avatar = index.add_movie(
            Movie::new(1, "Avatar", 2009, ["Action", "Science Fiction"])
                .with_credit(MovieRole::Actor, "Sam Worthington"),
        );
        let game = GameController::with_runtime(Arc::new(index.clone()), None);
        game.add_player(Player::new("Ada", GenreWinCondition::new("Action", 5)));
        game.add_player(Player::new("Bo", GenreWinCondition::new("Drama", 5)));
        game.set_initial_movie(avatar);
        (index, game)
    }

    #[test]
    fn manual_end_declares_satisfied_player() {
        let (_, game) = controller();
        assert!(game.start());
        {
            let mut inner = game.shared.lock();
            let ada = &mut inner.players[0];
            for id in 0..5 {
                ada.add_named_movie(Arc::new(Movie::new(100 + id, "Filler", 2020, ["Action"])));
            }
            ada.add_score(5);
        }
        assert!(game.end());
        assert_eq!(game.winner().map(|w| w.name), Some("Ada".to_string()));
        assert!(game.summary().contains("Winner: Ada"));
        assert!(!game.end(), "completed games cannot end again");
    }

    #[test]
    fn manual_end_without_qualifier_has_no_winner() {
        let (_, game) = controller();
        assert!(!game.end(), "nothing to end before start");
        assert!(game.start());
        assert!(game.end());
        assert!(game.winner().is_none());
        assert!(game.summary().contains("Game ended with no winner"));
    }

    #[test]
    fn stale_generation_ticks_are_ignored() {
        let (_, game) = controller();
        game.set_turn_time_limit(2);
        assert!(game.start());
        let mut inner = game.shared.lock();
        let live = inner.countdown.generation();

        assert!(!inner.tick(live - 1));
        assert_eq!(inner.seconds_remaining, 2);
        assert!(inner.tick(live));
        assert_eq!(inner.seconds_remaining, 1);
        assert!(!inner.tick(live));
        assert_eq!(inner.state, GameState::Completed);
        assert_eq!(inner.winner, Some(1));
    }

    #[test]
    fn duplicate_and_blank_names_are_refused() {
        let game = GameController::with_runtime(Arc::new(MovieIndex::new()), None);
        assert!(game.add_player(Player::new("Ada", GenreWinCondition::new("Action", 5))));
        assert!(!game.add_player(Player::new("Ada", GenreWinCondition::new("Drama", 5))));
        assert!(!game.add_player(Player::new("  ", GenreWinCondition::new("Drama", 5))));
        assert_eq!(game.players().len(), 1);
    }
}
