use crate::models::Movie;

/// Per-player rule tracking progress toward victory.
pub trait WinCondition: Send {
    /// Feed one accepted move into the rule.
    fn record(&mut self, movie: &Movie);

    /// Whether the target has been reached.
    fn is_satisfied(&self) -> bool {
        self.current_count() >= self.target_count()
    }

    /// Human-readable goal.
    fn description(&self) -> String;

    /// Progress so far.
    fn current_count(&self) -> u32;

    /// Progress required.
    fn target_count(&self) -> u32;

    /// Whether naming `movie` earns the mover a point. Unconditional unless a rule narrows it.
    fn awards_point(&self, _movie: &Movie) -> bool {
        true
    }

    /// `"<description> [current/target]"`.
    fn progress_label(&self) -> String {
        format!(
            "{} [{}/{}]",
            self.description(),
            self.current_count(),
            self.target_count()
        )
    }
}

/// Win by naming `target` movies of one genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreWinCondition {
    genre: String,
    target: u32,
    count: u32,
}

impl GenreWinCondition {
    /// Track `genre` (stored lowercased) until `target` matches.
    pub fn new(genre: &str, target: u32) -> Self {
        Self {
            genre: genre.trim().to_lowercase(),
            target,
            count: 0,
        }
    }

    /// Lowercased target genre.
    pub fn genre(&self) -> &str {
        &self.genre
    }

    fn matches(&self, movie: &Movie) -> bool {
        !self.genre.is_empty() && movie.has_genre(&self.genre)
    }
}

impl WinCondition for GenreWinCondition {
    fn record(&mut self, movie: &Movie) {
        if self.matches(movie) {
            self.count += 1;
        }
    }

    fn description(&self) -> String {
        format!("First to name {} {} movie(s)", self.target, self.genre)
    }

    fn current_count(&self) -> u32 {
        self.count
    }

    fn target_count(&self) -> u32 {
        self.target
    }

    fn awards_point(&self, movie: &Movie) -> bool {
        self.matches(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_matching_genre() {
        let mut condition = GenreWinCondition::new("Action", 2);
        let heat = Movie::new(1, "Heat", 1995, ["Action", "Crime"]);
        let amelie = Movie::new(2, "Amelie", 2001, ["Comedy"]);

        condition.record(&amelie);
        assert_eq!(condition.current_count(), 0);
        condition.record(&heat);
        assert!(!condition.is_satisfied());
        condition.record(&heat);
        assert!(condition.is_satisfied());
        assert!(condition.awards_point(&heat));
        assert!(!condition.awards_point(&amelie));
    }

    #[test]
    fn description_lowercases_genre() {
        let condition = GenreWinCondition::new("Science Fiction", 5);
        assert_eq!(
            condition.description(),
            "First to name 5 science fiction movie(s)"
        );
        assert_eq!(
            condition.progress_label(),
            "First to name 5 science fiction movie(s) [0/5]"
        );
    }

    #[test]
    fn empty_genre_never_progresses() {
        let mut condition = GenreWinCondition::new("", 1);
        condition.record(&Movie::new(1, "Heat", 1995, ["Action"]));
        assert_eq!(condition.current_count(), 0);
        assert!(!condition.is_satisfied());
    }
}
