//! Dataset discovery and CSV ingestion into a [`MovieIndex`].

mod parse;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    config::AppConfig,
    error::LoadError,
    index::MovieIndex,
    models::{Movie, MovieRole},
};

/// Location of the two CSV exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Movie metadata export.
    pub movies: PathBuf,
    /// Cast and crew export.
    pub credits: PathBuf,
}

impl DatasetPaths {
    /// Explicit paths from configuration, falling back to discovery under `data_dir`.
    pub fn from_config(config: &AppConfig) -> Result<Self, LoadError> {
        match (&config.movies_csv, &config.credits_csv) {
            (Some(movies), Some(credits)) => Ok(Self {
                movies: movies.clone(),
                credits: credits.clone(),
            }),
            (movies, credits) => {
                let discovered = Self::discover(&config.data_dir)?;
                Ok(Self {
                    movies: movies.clone().unwrap_or(discovered.movies),
                    credits: credits.clone().unwrap_or(discovered.credits),
                })
            }
        }
    }

    /// Find `*movies*.csv` and `*credits*.csv` beneath `dir`, first match by path order.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(3)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        let find = |needle: &str| {
            candidates
                .iter()
                .find(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name.to_lowercase().contains(needle))
                        .unwrap_or(false)
                })
                .cloned()
        };

        let movies = find("movies").ok_or_else(|| LoadError::DatasetNotFound {
            kind: "movies",
            dir: dir.to_path_buf(),
        })?;
        let credits = find("credits").ok_or_else(|| LoadError::DatasetNotFound {
            kind: "credits",
            dir: dir.to_path_buf(),
        })?;
        Ok(Self { movies, credits })
    }
}

/// Row accounting for a completed load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Movies indexed.
    pub movies: usize,
    /// Movie rows dropped (bad id, blank title, short row).
    pub skipped_movie_rows: usize,
    /// Credit rows applied to a known movie.
    pub credited_movies: usize,
    /// Credit rows dropped (bad id, unknown movie, short row).
    pub skipped_credit_rows: usize,
}

/// Load both exports and build the index.
pub fn load_dataset(paths: &DatasetPaths) -> Result<(MovieIndex, LoadReport), LoadError> {
    let mut report = LoadReport::default();

    let (mut movies, skipped) = load_movies(&paths.movies)?;
    report.skipped_movie_rows = skipped;

    let (credited, skipped) = apply_credits(&paths.credits, &mut movies)?;
    report.credited_movies = credited;
    report.skipped_credit_rows = skipped;
    report.movies = movies.len();

    let index = MovieIndex::from_movies(movies.into_values());
    info!(
        movies = report.movies,
        skipped_movies = report.skipped_movie_rows,
        credited = report.credited_movies,
        skipped_credits = report.skipped_credit_rows,
        "Dataset loaded"
    );
    Ok((index, report))
}

/// Parse the movie metadata export. Returns the movies keyed by id and the skipped row count.
pub fn load_movies(path: &Path) -> Result<(BTreeMap<u32, Movie>, usize), LoadError> {
    let mut reader = open(path)?;
    let headers = headers(&mut reader, path)?;
    let id_idx = column(&headers, path, &["id"], "id")?;
    let title_idx = column(&headers, path, &["title"], "title")?;
    let genres_idx = column(&headers, path, &["genres"], "genres")?;
    let date_idx = column(&headers, path, &["release_date"], "release_date")?;

    let mut movies = BTreeMap::new();
    let mut skipped = 0;
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), line, "Skipping unreadable movie row: {err}");
                skipped += 1;
                continue;
            }
        };
        match movie_from_record(&record, id_idx, title_idx, genres_idx, date_idx) {
            Some(movie) => {
                movies.insert(movie.id().0, movie);
            }
            None => {
                warn!(path = %path.display(), line, "Skipping malformed movie row");
                skipped += 1;
            }
        }
    }
    Ok((movies, skipped))
}

/// Attach cast and crew to already-loaded movies. Returns `(credited, skipped)` row counts.
pub fn apply_credits(
    path: &Path,
    movies: &mut BTreeMap<u32, Movie>,
) -> Result<(usize, usize), LoadError> {
    let mut reader = open(path)?;
    let headers = headers(&mut reader, path)?;
    let id_idx = column(&headers, path, &["movie_id", "id"], "movie_id")?;
    let cast_idx = column(&headers, path, &["cast"], "cast")?;
    let crew_idx = column(&headers, path, &["crew"], "crew")?;

    let mut credited = 0;
    let mut skipped = 0;
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), line, "Skipping unreadable credit row: {err}");
                skipped += 1;
                continue;
            }
        };
        let Some(movie) = record
            .get(id_idx)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .and_then(|id| movies.get_mut(&id))
        else {
            skipped += 1;
            continue;
        };
        let (Some(cast), Some(crew)) = (record.get(cast_idx), record.get(crew_idx)) else {
            skipped += 1;
            continue;
        };

        for name in parse::names(cast) {
            movie.add_credit(MovieRole::Actor, &name);
        }
        for (job, name) in parse::jobs(crew) {
            if let Some(role) = MovieRole::from_job(&job) {
                movie.add_credit(role, &name);
            }
        }
        credited += 1;
    }
    Ok((credited, skipped))
}

fn movie_from_record(
    record: &StringRecord,
    id_idx: usize,
    title_idx: usize,
    genres_idx: usize,
    date_idx: usize,
) -> Option<Movie> {
    let id = record.get(id_idx)?.trim().parse::<u32>().ok()?;
    let title = record.get(title_idx)?.trim();
    if title.is_empty() {
        return None;
    }
    let year = parse::release_year(record.get(date_idx)?);
    let genres = parse::names(record.get(genres_idx)?);
    Some(Movie::new(id, title, year, genres))
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<StringRecord, LoadError> {
    reader
        .headers()
        .cloned()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn column(
    headers: &StringRecord,
    path: &Path,
    names: &[&str],
    required: &'static str,
) -> Result<usize, LoadError> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|header| header.trim() == *name))
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: required,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ConnectionIndex;
    use std::fs;
    use tempfile::tempdir;

    const MOVIES: &str = r#"budget,genres,id,title,release_date
237000000,"[{""id"": 28, ""name"": ""Action""}, {""id"": 878, ""name"": ""Science Fiction""}]",19995,Avatar,2009-12-10
200000000,"[{""id"": 18, ""name"": ""Drama""}]",597,Titanic,1997-11-18
0,"[]",oops,Broken Row,2000-01-01
0,"[]",42,,2000-01-01
"#;

    const CREDITS: &str = r#"movie_id,title,cast,crew
19995,Avatar,"[{""character"": ""Jake Sully"", ""name"": ""Sam Worthington""}]","[{""job"": ""Director"", ""name"": ""James Cameron""}, {""job"": ""Producer"", ""name"": ""Jon Landau""}]"
597,Titanic,"[{""name"": ""Leonardo DiCaprio""}]","[{""job"": ""Director"", ""name"": ""James Cameron""}]"
12345,Unknown,"[]","[]"
"#;

    #[test]
    fn loads_movies_and_credits() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let movies = dir.path().join("tmdb_5000_movies.csv");
        let credits = dir.path().join("tmdb_5000_credits.csv");
        fs::write(&movies, MOVIES)?;
        fs::write(&credits, CREDITS)?;

        let paths = DatasetPaths::discover(dir.path())?;
        assert_eq!(paths.movies, movies);
        assert_eq!(paths.credits, credits);

        let (index, report) = load_dataset(&paths)?;
        assert_eq!(
            report,
            LoadReport {
                movies: 2,
                skipped_movie_rows: 2,
                credited_movies: 2,
                skipped_credit_rows: 1,
            }
        );

        let avatar = index.by_title("avatar").expect("avatar loaded");
        assert_eq!(avatar.release_year(), 2009);
        assert!(avatar.has_genre("science fiction"));
        assert!(avatar.credits_person(MovieRole::Actor, "Sam Worthington"));
        assert!(avatar.credits_person(MovieRole::Director, "James Cameron"));
        assert_eq!(avatar.people().len(), 2, "producers are not linking credits");

        let titanic = index.by_title("Titanic").expect("titanic loaded");
        let connected = index.connected_to(&titanic);
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].title(), "Avatar");
        Ok(())
    }

    #[test]
    fn missing_column_fails_the_load() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let movies = dir.path().join("movies.csv");
        fs::write(&movies, "id,title\n1,Heat\n")?;

        let err = load_movies(&movies).expect_err("genres column is required");
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                column: "genres",
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn discovery_reports_missing_dataset() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("movies.csv"), MOVIES)?;

        let err = DatasetPaths::discover(dir.path()).expect_err("credits missing");
        assert!(matches!(err, LoadError::DatasetNotFound { kind: "credits", .. }));
        Ok(())
    }
}
