//! Title, genre and shared-person lookups over the loaded movies.

mod trie;

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::debug;

use crate::models::{Movie, MovieId};

use self::trie::TitleTrie;

/// Read-side contract the turn engine relies on.
pub trait ConnectionIndex: Send + Sync {
    /// Exact, case-insensitive title match.
    fn by_title(&self, title: &str) -> Option<Arc<Movie>>;

    /// Every other movie sharing at least one credited person with `movie`, in any roles.
    fn connected_to(&self, movie: &Movie) -> Vec<Arc<Movie>>;

    /// Movies tagged with `genre` (case-insensitive).
    fn by_genre(&self, genre: &str) -> Vec<Arc<Movie>>;

    /// Titles starting with `prefix` (case-insensitive); empty for an empty or unknown prefix.
    fn suggest_titles(&self, prefix: &str) -> Vec<String>;

    /// All indexed movies ordered by id.
    fn all(&self) -> Vec<Arc<Movie>>;

    /// Number of indexed movies.
    fn len(&self) -> usize;

    /// Whether the index holds no movies.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe in-memory index. Clones share the same underlying data.
#[derive(Clone, Default)]
pub struct MovieIndex {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    movies: HashMap<MovieId, Arc<Movie>>,
    by_title: HashMap<String, Arc<Movie>>,
    by_genre: HashMap<String, Vec<Arc<Movie>>>,
    by_person: HashMap<String, BTreeSet<MovieId>>,
    titles: TitleTrie,
}

impl MovieIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a batch of movies.
    pub fn from_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let index = Self::new();
        for movie in movies {
            index.add_movie(movie);
        }
        index
    }

    /// Add a movie and return the shared handle stored in the index.
    ///
    /// A later movie with the same title (ignoring case) wins the title lookup.
    pub fn add_movie(&self, movie: Movie) -> Arc<Movie> {
        let movie = Arc::new(movie);
        let mut inner = self.inner.write();

        let repeated = inner
            .by_title
            .insert(movie.title().to_lowercase(), movie.clone())
            .is_some();
        if !repeated {
            inner.titles.insert(movie.title());
        }
        for genre in movie.genres() {
            inner
                .by_genre
                .entry(genre.to_lowercase())
                .or_default()
                .push(movie.clone());
        }
        for person in movie.people() {
            inner
                .by_person
                .entry(person.to_string())
                .or_default()
                .insert(movie.id());
        }
        inner.movies.insert(movie.id(), movie.clone());
        movie
    }

    /// Distinct genre labels, sorted case-insensitively, keeping the first spelling seen.
    pub fn genres(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut ids: Vec<_> = inner.movies.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Some(movie) = inner.movies.get(&id) {
                for genre in movie.genres() {
                    seen.entry(genre.to_lowercase())
                        .or_insert_with(|| genre.clone());
                }
            }
        }
        let mut genres: Vec<(String, String)> = seen.into_iter().collect();
        genres.sort_by(|a, b| a.0.cmp(&b.0));
        genres.into_iter().map(|(_, label)| label).collect()
    }

    /// Look up a movie by id.
    pub fn get(&self, id: MovieId) -> Option<Arc<Movie>> {
        self.inner.read().movies.get(&id).cloned()
    }
}

impl ConnectionIndex for MovieIndex {
    fn by_title(&self, title: &str) -> Option<Arc<Movie>> {
        let key = title.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.inner.read().by_title.get(&key).cloned()
    }

    fn connected_to(&self, movie: &Movie) -> Vec<Arc<Movie>> {
        let inner = self.inner.read();
        let ids: BTreeSet<MovieId> = movie
            .people()
            .into_iter()
            .filter_map(|person| inner.by_person.get(person))
            .flat_map(|ids| ids.iter().copied())
            .filter(|id| *id != movie.id())
            .collect();
        debug!(movie = %movie.title(), connected = ids.len(), "Connections computed");
        ids.into_iter()
            .filter_map(|id| inner.movies.get(&id).cloned())
            .collect()
    }

    fn by_genre(&self, genre: &str) -> Vec<Arc<Movie>> {
        self.inner
            .read()
            .by_genre
            .get(&genre.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn suggest_titles(&self, prefix: &str) -> Vec<String> {
        self.inner.read().titles.complete(prefix).to_vec()
    }

    fn all(&self) -> Vec<Arc<Movie>> {
        let inner = self.inner.read();
        let mut movies: Vec<_> = inner.movies.values().cloned().collect();
        movies.sort_by_key(|movie| movie.id());
        movies
    }

    fn len(&self) -> usize {
        self.inner.read().movies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRole;

    fn sample_index() -> MovieIndex {
        MovieIndex::from_movies([
            Movie::new(1, "Avatar", 2009, ["Action", "Science Fiction"])
                .with_credit(MovieRole::Actor, "Sam Worthington")
                .with_credit(MovieRole::Director, "James Cameron"),
            Movie::new(2, "Titanic", 1997, ["Drama", "Romance"])
                .with_credit(MovieRole::Actor, "Leonardo DiCaprio")
                .with_credit(MovieRole::Director, "James Cameron"),
            Movie::new(3, "Inception", 2010, ["Action", "Science Fiction"])
                .with_credit(MovieRole::Actor, "Leonardo DiCaprio")
                .with_credit(MovieRole::Director, "Christopher Nolan"),
            Movie::new(4, "Amelie", 2001, ["Comedy", "Romance"])
                .with_credit(MovieRole::Actor, "Audrey Tautou"),
        ])
    }

    #[test]
    fn title_lookup_is_case_insensitive() {
        let index = sample_index();
        assert_eq!(index.by_title("AVATAR").map(|m| m.id()), Some(MovieId(1)));
        assert_eq!(index.by_title("  titanic ").map(|m| m.id()), Some(MovieId(2)));
        assert!(index.by_title("").is_none());
        assert!(index.by_title("Nope").is_none());
    }

    #[test]
    fn connected_to_spans_roles_and_excludes_self() {
        let index = sample_index();
        let titanic = index.by_title("Titanic").expect("titanic");
        let ids: Vec<_> = index
            .connected_to(&titanic)
            .iter()
            .map(|m| m.id())
            .collect();
        assert_eq!(ids, vec![MovieId(1), MovieId(3)]);

        let amelie = index.by_title("Amelie").expect("amelie");
        assert!(index.connected_to(&amelie).is_empty());
    }

    #[test]
    fn genre_lookup_and_listing() {
        let index = sample_index();
        assert_eq!(index.by_genre("romance").len(), 2);
        assert_eq!(index.by_genre("SCIENCE FICTION").len(), 2);
        assert!(index.by_genre("western").is_empty());
        assert_eq!(
            index.genres(),
            vec!["Action", "Comedy", "Drama", "Romance", "Science Fiction"]
        );
    }

    #[test]
    fn suggestions_follow_prefix() {
        let index = sample_index();
        assert_eq!(index.suggest_titles("a"), vec!["Avatar", "Amelie"]);
        assert_eq!(index.suggest_titles("Ti"), vec!["Titanic"]);
        assert!(index.suggest_titles("").is_empty());
        assert!(index.suggest_titles("zz").is_empty());
    }

    #[test]
    fn repeated_titles_are_suggested_once() {
        let index = sample_index();
        index.add_movie(Movie::new(5, "Titanic", 1953, ["Drama"]));
        index.add_movie(Movie::new(6, "TITANIC", 1943, ["Drama"]));

        assert_eq!(index.suggest_titles("tit"), vec!["Titanic"]);
        assert_eq!(index.by_title("titanic").map(|m| m.id()), Some(MovieId(6)));
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn clones_observe_later_additions() {
        let index = sample_index();
        let shared = index.clone();
        index.add_movie(Movie::new(5, "Heat", 1995, ["Crime"]));
        assert_eq!(shared.len(), 5);
        assert!(shared.by_title("heat").is_some());
    }
}
