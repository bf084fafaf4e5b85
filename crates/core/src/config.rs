//! Application configuration layered from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::{error::ConfigError, game::WIN_TARGET};

const APP_DIR: &str = "cinelink";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "CINELINK";

const DEFAULT_CONFIG: &str = r#"# cinelink configuration
#
# Every key can also be set through the environment, e.g. CINELINK_TURN_TIME_LIMIT=45.

# Directory searched for *movies*.csv and *credits*.csv.
data_dir = "data"

# Explicit dataset files; these override discovery under data_dir.
# movies_csv = "data/tmdb_5000_movies.csv"
# credits_csv = "data/tmdb_5000_credits.csv"

# Seconds each player has to name a movie.
turn_time_limit = 30

# Movies of the chosen genre a player must name to win (5 or more).
genre_target = 5
"#;

/// Resolved runtime settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory searched for the datasets.
    pub data_dir: PathBuf,
    /// Explicit movies CSV, overriding discovery.
    #[serde(default)]
    pub movies_csv: Option<PathBuf>,
    /// Explicit credits CSV, overriding discovery.
    #[serde(default)]
    pub credits_csv: Option<PathBuf>,
    /// Seconds per turn.
    pub turn_time_limit: i64,
    /// Genre matches needed to win.
    pub genre_target: u32,
    /// Directory receiving `cinelink.log`.
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Load from the user config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load using `path` as the config file. A missing file falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default("data_dir", "data")?
            .set_default("turn_time_limit", 30)?
            .set_default("genre_target", 5)?
            .set_default("log_dir", default_log_dir().to_string_lossy().to_string())?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_time_limit <= 0 {
            return Err(ConfigError::InvalidTurnTimeLimit);
        }
        if self.genre_target < WIN_TARGET {
            return Err(ConfigError::InvalidGenreTarget);
        }
        Ok(())
    }
}

/// `<config_dir>/cinelink/config.toml`, or `./cinelink/config.toml` without a config dir.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default config to the user config path if it does not exist yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

/// Write the commented default config to `path` unless a file is already there.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_is_written_once_and_loads() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert!(write_default_config(&path)?);
        fs::write(&path, "turn_time_limit = 12\n")?;
        assert!(!write_default_config(&path)?, "existing file is kept");
        assert_eq!(AppConfig::load_from(&path)?.turn_time_limit, 12);
        Ok(())
    }

    #[test]
    fn defaults_apply_without_a_file() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.turn_time_limit, 30);
        assert_eq!(config.genre_target, 5);
        assert!(config.movies_csv.is_none());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "data_dir = \"/srv/films\"\nmovies_csv = \"/srv/films/m.csv\"\ngenre_target = 7\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.data_dir, PathBuf::from("/srv/films"));
        assert_eq!(config.movies_csv, Some(PathBuf::from("/srv/films/m.csv")));
        assert_eq!(config.genre_target, 7);
        Ok(())
    }

    #[test]
    fn non_positive_turn_limit_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "turn_time_limit = 0\n")?;

        let err = AppConfig::load_from(&path).expect_err("zero limit must fail");
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidTurnTimeLimit)
        );
        Ok(())
    }

    #[test]
    fn genre_target_below_win_target_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "genre_target = 3\n")?;

        let err = AppConfig::load_from(&path).expect_err("unreachable target must fail");
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidGenreTarget)
        );

        fs::write(&path, format!("genre_target = {WIN_TARGET}\n"))?;
        assert_eq!(AppConfig::load_from(&path)?.genre_target, WIN_TARGET);
        Ok(())
    }
}
