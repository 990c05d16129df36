//! Configuration management for crudsmith
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `CRUDSMITH_` prefix, `__` separates sections)
//! 2. `./crudsmith.toml`, or the file passed with `--config`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # crudsmith.toml
//! [projects]
//! root = "./projects"
//!
//! [database]
//! backend = "sqlite"
//!
//! [views]
//! layout = "layouts/admin.html"
//! number_filter = "format_number"
//! placeholder_options = ["Low", "Medium", "High"]
//! ```
//!
//! ```bash
//! CRUDSMITH_PROJECTS__ROOT=/srv/scaffolds crudsmith list
//! ```

use crate::error::Result;
use crate::scaffold::ScaffoldOptions;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "crudsmith.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CRUDSMITH_";

/// SQL dialect of the generated migration and model queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// `PostgreSQL` (default)
    #[default]
    Postgres,
    /// `SQLite`
    Sqlite,
}

impl DatabaseBackend {
    /// Bind placeholder for the 1-based parameter `index`
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::Sqlite => "?".to_string(),
        }
    }

    /// sqlx pool type used by generated code
    #[must_use]
    pub const fn pool_type(self) -> &'static str {
        match self {
            Self::Postgres => "sqlx::PgPool",
            Self::Sqlite => "sqlx::SqlitePool",
        }
    }

    /// Lowercase name, as written in configuration
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where run directories are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Directory holding one sub-directory per generation run
    pub root: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
        }
    }
}

/// Database settings for generated artifacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Target SQL dialect
    pub backend: DatabaseBackend,
}

/// Generated view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Layout template every generated page extends
    pub layout: String,

    /// Filter applied to integer and money values in lists and detail pages
    pub number_filter: String,

    /// Options offered by `select` and `radio` controls until edited by hand
    pub placeholder_options: Vec<String>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            layout: "layouts/app.html".to_string(),
            number_filter: "format_number".to_string(),
            placeholder_options: vec![
                "Option1".to_string(),
                "Option2".to_string(),
                "Option3".to_string(),
            ],
        }
    }
}

/// Complete crudsmith configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrudsmithConfig {
    /// Run directory settings
    #[serde(default)]
    pub projects: ProjectSettings,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// View settings
    #[serde(default)]
    pub views: ViewSettings,
}

impl CrudsmithConfig {
    /// Load configuration from `./crudsmith.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment value cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(config = %path.display(), "loading configuration");

        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Generator options derived from this configuration
    #[must_use]
    pub fn scaffold_options(&self) -> ScaffoldOptions {
        ScaffoldOptions {
            backend: self.database.backend,
            layout: self.views.layout.clone(),
            number_filter: self.views.number_filter.clone(),
            placeholder_options: self.views.placeholder_options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = CrudsmithConfig::default();
        assert_eq!(config.projects.root, PathBuf::from("projects"));
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(config.views.layout, "layouts/app.html");
        assert_eq!(config.views.placeholder_options.len(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crudsmith.toml");
        fs::write(
            &path,
            "[projects]\nroot = \"/srv/runs\"\n\n[database]\nbackend = \"sqlite\"\n",
        )
        .unwrap();

        let config = CrudsmithConfig::load_from(&path).unwrap();
        assert_eq!(config.projects.root, PathBuf::from("/srv/runs"));
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.views.number_filter, "format_number");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CrudsmithConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.views.layout, "layouts/app.html");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crudsmith.toml");
        fs::write(&path, "[database]\nbackend = \"oracle\"\n").unwrap();
        assert!(CrudsmithConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_scaffold_options() {
        let mut config = CrudsmithConfig::default();
        config.views.layout = "layouts/admin.html".to_string();
        let options = config.scaffold_options();
        assert_eq!(options.layout, "layouts/admin.html");
        assert_eq!(options.backend, DatabaseBackend::Postgres);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(DatabaseBackend::Postgres.placeholder(2), "$2");
        assert_eq!(DatabaseBackend::Sqlite.placeholder(2), "?");
    }
}
