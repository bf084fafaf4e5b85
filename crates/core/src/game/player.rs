use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::models::Movie;

use super::win_condition::WinCondition;

/// One participant with score, history and a one-shot time extension.
pub struct Player {
    name: String,
    score: u32,
    named_movies: Vec<Arc<Movie>>,
    win_condition: Box<dyn WinCondition>,
    extra_time_available: bool,
}

impl Player {
    /// Create a player. The win condition is fixed for the player's lifetime.
    pub fn new(name: impl Into<String>, win_condition: impl WinCondition + 'static) -> Self {
        Self {
            name: name.into(),
            score: 0,
            named_movies: Vec::new(),
            win_condition: Box::new(win_condition),
            extra_time_available: true,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Add `points`; non-positive deltas are ignored.
    pub fn add_score(&mut self, points: i32) {
        if points > 0 {
            self.score += points as u32;
        }
    }

    /// Append to the history and feed the win condition.
    pub fn add_named_movie(&mut self, movie: Arc<Movie>) {
        self.win_condition.record(&movie);
        self.named_movies.push(movie);
    }

    /// Most recently named movie.
    pub fn last_named_movie(&self) -> Option<&Arc<Movie>> {
        self.named_movies.last()
    }

    /// Movies named so far, oldest first.
    pub fn named_movies(&self) -> &[Arc<Movie>] {
        &self.named_movies
    }

    /// Zero the score.
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Clear the history. Win-condition progress and the extra-time flag are untouched.
    pub fn reset_named_movies(&mut self) {
        self.named_movies.clear();
    }

    /// The player's win condition.
    pub fn win_condition(&self) -> &dyn WinCondition {
        self.win_condition.as_ref()
    }

    /// Whether the one-shot extension is still unused.
    pub fn has_extra_time_available(&self) -> bool {
        self.extra_time_available
    }

    /// Consume the extension. Repeated calls change nothing.
    pub fn use_extra_time(&mut self) {
        self.extra_time_available = false;
    }

    /// Owned read model of the current state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            name: self.name.clone(),
            score: self.score,
            named_movies: self.named_movies.iter().map(|m| m.title().to_string()).collect(),
            extra_time_available: self.extra_time_available,
            win_condition: self.win_condition.description(),
            progress: self.win_condition.current_count(),
            target: self.win_condition.target_count(),
            satisfied: self.win_condition.is_satisfied(),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player: {} | Score: {} | Progress: {}",
            self.name,
            self.score,
            self.win_condition.progress_label()
        )
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("score", &self.score)
            .field("named_movies", &self.named_movies.len())
            .field("win_condition", &self.win_condition.progress_label())
            .field("extra_time_available", &self.extra_time_available)
            .finish()
    }
}

/// Point-in-time copy of a [`Player`] handed out by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    /// Display name.
    pub name: String,
    /// Score at snapshot time.
    pub score: u32,
    /// Titles named so far, oldest first.
    pub named_movies: Vec<String>,
    /// Whether the one-shot extension is unused.
    pub extra_time_available: bool,
    /// Win condition description.
    pub win_condition: String,
    /// Win condition progress.
    pub progress: u32,
    /// Win condition target.
    pub target: u32,
    /// Whether the win condition is met.
    pub satisfied: bool,
}

impl PlayerSnapshot {
    /// `"<description> [current/target]"`.
    pub fn progress_label(&self) -> String {
        format!("{} [{}/{}]", self.win_condition, self.progress, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GenreWinCondition;

    fn action_fan() -> Player {
        Player::new("Ada", GenreWinCondition::new("Action", 5))
    }

    #[test]
    fn score_ignores_non_positive_deltas() {
        let mut player = action_fan();
        player.add_score(0);
        player.add_score(-3);
        player.add_score(2);
        assert_eq!(player.score(), 2);
        player.reset_score();
        assert_eq!(player.score(), 0);
    }

    #[test]
    fn named_movies_feed_win_condition() {
        let mut player = action_fan();
        assert!(player.last_named_movie().is_none());
        player.add_named_movie(Arc::new(Movie::new(1, "Heat", 1995, ["Action"])));
        player.add_named_movie(Arc::new(Movie::new(2, "Amelie", 2001, ["Comedy"])));

        assert_eq!(player.last_named_movie().map(|m| m.title()), Some("Amelie"));
        assert_eq!(player.win_condition().current_count(), 1);
        assert_eq!(
            player.to_string(),
            "Player: Ada | Score: 0 | Progress: First to name 5 action movie(s) [1/5]"
        );
    }

    #[test]
    fn extra_time_is_one_shot_and_survives_resets() {
        let mut player = action_fan();
        assert!(player.has_extra_time_available());
        player.use_extra_time();
        player.use_extra_time();
        assert!(!player.has_extra_time_available());

        player.add_named_movie(Arc::new(Movie::new(1, "Heat", 1995, ["Action"])));
        player.reset_named_movies();
        player.reset_score();
        assert!(player.named_movies().is_empty());
        assert!(!player.has_extra_time_available());
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut player = action_fan();
        player.add_named_movie(Arc::new(Movie::new(1, "Heat", 1995, ["Action"])));
        player.add_score(1);

        let snapshot = player.snapshot();
        assert_eq!(snapshot.name, "Ada");
        assert_eq!(snapshot.named_movies, vec!["Heat"]);
        assert_eq!(snapshot.progress_label(), "First to name 5 action movie(s) [1/5]");
        assert!(!snapshot.satisfied);
    }
}
