//! Shared domain models.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

/// Stable identifier of a movie inside the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MovieId(pub u32);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credited role that can link two movies together.
///
/// The declaration order is significant: connection searches walk the roles
/// in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MovieRole {
    /// Cast member.
    Actor,
    /// Director.
    Director,
    /// Screenplay or story credit.
    Writer,
    /// Director of photography.
    Cinematographer,
    /// Original music.
    Composer,
}

impl MovieRole {
    /// All roles in search order.
    pub const ALL: [MovieRole; 5] = [
        MovieRole::Actor,
        MovieRole::Director,
        MovieRole::Writer,
        MovieRole::Cinematographer,
        MovieRole::Composer,
    ];

    /// Human-readable role name.
    pub fn label(self) -> &'static str {
        match self {
            MovieRole::Actor => "Actor",
            MovieRole::Director => "Director",
            MovieRole::Writer => "Writer",
            MovieRole::Cinematographer => "Cinematographer",
            MovieRole::Composer => "Composer",
        }
    }

    /// Map a dataset job string onto a role, ignoring jobs that never link movies.
    pub fn from_job(job: &str) -> Option<Self> {
        let job = job.trim().to_lowercase();
        match job.as_str() {
            "actor" | "actress" | "cast" => Some(MovieRole::Actor),
            "director" => Some(MovieRole::Director),
            "writer" | "screenplay" | "story" | "story by" | "screenplay by" => {
                Some(MovieRole::Writer)
            }
            "director of photography" | "cinematographer" | "cinematography" => {
                Some(MovieRole::Cinematographer)
            }
            "original music composer" | "music" | "composer" | "music by" => {
                Some(MovieRole::Composer)
            }
            _ => None,
        }
    }
}

impl fmt::Display for MovieRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One film with its metadata and credited people.
///
/// Credits are only attached while the dataset is ingested; once a movie is
/// handed to the index it is shared read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    id: MovieId,
    title: String,
    release_year: u16,
    genres: Vec<String>,
    credits: BTreeMap<MovieRole, BTreeSet<String>>,
}

impl Movie {
    /// Build a movie without credits. Blank genres are dropped, the rest trimmed.
    pub fn new<I, S>(id: u32, title: impl Into<String>, release_year: u16, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let genres = genres
            .into_iter()
            .map(|genre| genre.as_ref().trim().to_string())
            .filter(|genre| !genre.is_empty())
            .collect();
        Self {
            id: MovieId(id),
            title: title.into().trim().to_string(),
            release_year,
            genres,
            credits: BTreeMap::new(),
        }
    }

    /// Attach a credited person. Blank names are ignored.
    pub fn add_credit(&mut self, role: MovieRole, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.credits
            .entry(role)
            .or_default()
            .insert(name.to_string());
    }

    /// Builder-style variant of [`Movie::add_credit`].
    pub fn with_credit(mut self, role: MovieRole, name: &str) -> Self {
        self.add_credit(role, name);
        self
    }

    /// Dataset identifier.
    pub fn id(&self) -> MovieId {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Release year, `0` when unknown.
    pub fn release_year(&self) -> u16 {
        self.release_year
    }

    /// Genre labels in dataset order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Case-insensitive genre membership test.
    pub fn has_genre(&self, genre: &str) -> bool {
        let needle = genre.to_lowercase();
        self.genres
            .iter()
            .any(|candidate| candidate.to_lowercase() == needle)
    }

    /// People credited in `role`, sorted by name.
    pub fn people_in_role(&self, role: MovieRole) -> impl Iterator<Item = &str> {
        self.credits
            .get(&role)
            .into_iter()
            .flat_map(|people| people.iter().map(String::as_str))
    }

    /// Whether `person` holds `role` on this movie.
    pub fn credits_person(&self, role: MovieRole, person: &str) -> bool {
        self.credits
            .get(&role)
            .map(|people| people.contains(person))
            .unwrap_or(false)
    }

    /// Every distinct person credited on the movie, in any role.
    pub fn people(&self) -> BTreeSet<&str> {
        self.credits
            .values()
            .flat_map(|people| people.iter().map(String::as_str))
            .collect()
    }

    /// Whether any credit was attached.
    pub fn has_credits(&self) -> bool {
        self.credits.values().any(|people| !people.is_empty())
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl std::hash::Hash for Movie {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}]",
            self.title,
            self.release_year,
            self.genres.join("/")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_genres_and_names_are_dropped() {
        let mut movie = Movie::new(1, " Heat ", 1995, ["Action", "  ", " Crime "]);
        movie.add_credit(MovieRole::Actor, "  ");
        movie.add_credit(MovieRole::Actor, " Al Pacino ");

        assert_eq!(movie.title(), "Heat");
        assert_eq!(movie.genres(), ["Action".to_string(), "Crime".to_string()]);
        assert_eq!(
            movie.people_in_role(MovieRole::Actor).collect::<Vec<_>>(),
            vec!["Al Pacino"]
        );
        assert!(movie.credits_person(MovieRole::Actor, "Al Pacino"));
        assert!(!movie.credits_person(MovieRole::Director, "Al Pacino"));
    }

    #[test]
    fn genre_lookup_ignores_case() {
        let movie = Movie::new(2, "Alien", 1979, ["Horror", "Science Fiction"]);
        assert!(movie.has_genre("horror"));
        assert!(movie.has_genre("SCIENCE FICTION"));
        assert!(!movie.has_genre(""));
    }

    #[test]
    fn people_in_role_are_sorted() {
        let movie = Movie::new(3, "Ensemble", 2001, ["Drama"])
            .with_credit(MovieRole::Actor, "Zoe")
            .with_credit(MovieRole::Actor, "Adam")
            .with_credit(MovieRole::Actor, "Mia");
        assert_eq!(
            movie.people_in_role(MovieRole::Actor).collect::<Vec<_>>(),
            vec!["Adam", "Mia", "Zoe"]
        );
    }

    #[test]
    fn maps_dataset_jobs_to_roles() {
        assert_eq!(MovieRole::from_job("Actress"), Some(MovieRole::Actor));
        assert_eq!(MovieRole::from_job("Screenplay"), Some(MovieRole::Writer));
        assert_eq!(
            MovieRole::from_job("Director of Photography"),
            Some(MovieRole::Cinematographer)
        );
        assert_eq!(
            MovieRole::from_job("Original Music Composer"),
            Some(MovieRole::Composer)
        );
        assert_eq!(MovieRole::from_job("Producer"), None);
        assert_eq!(MovieRole::from_job(""), None);
    }

    #[test]
    fn identity_is_by_id() {
        let a = Movie::new(7, "Same", 2000, ["Drama"]);
        let b = Movie::new(7, "Different Title", 2010, ["Comedy"]);
        assert_eq!(a, b);
    }
}
