use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use todolist_core::ViewQuery;
use todolist_store::DEFAULT_KEY;

use crate::filter_util::ViewQueryBuilder;

const CONFIG_DIR: &str = ".todolist";
const CONFIG_FILE: &str = "config.toml";
const DATA_DIR_NAME: &str = "todolist";
const STORE_FILE: &str = "store.json";

/// Top-level project configuration loaded from `.todolist/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Where the task collection lives.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Defaults applied to list views.
    #[serde(default)]
    pub view: ViewConfig,
}

impl ProjectConfig {
    /// Load configuration from `<dir>/.todolist/config.toml`, falling back to defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.storage.ensure_valid_key()?;
        self.view
            .query_builder()
            .map_err(|err| anyhow!("invalid [view] section: {}", err.describe_user_facing()))?;
        Ok(())
    }

    /// Resolve the store file, preferring `override_path`, then `[storage].path`
    /// (relative to `dir`), then the user data directory.
    ///
    /// # Errors
    /// Returns an error if no data directory can be determined.
    pub fn store_path(&self, dir: impl AsRef<Path>, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.storage.path {
            return Ok(dir.as_ref().join(path));
        }
        default_store_path().ok_or_else(|| anyhow!("failed to resolve a data directory for the task store"))
    }
}

/// Default location of the store file: `<data dir>/todolist/store.json`.
///
/// On Linux: `~/.local/share/todolist/store.json`
/// On macOS: `~/Library/Application Support/todolist/store.json`
#[must_use]
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME).join(STORE_FILE))
}

/// `[storage]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Store file, relative to the configured directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Key the task collection is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_key(),
        }
    }
}

impl StorageConfig {
    fn ensure_valid_key(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            bail!("storage key must not be empty");
        }
        Ok(())
    }
}

fn default_key() -> String {
    DEFAULT_KEY.to_owned()
}

/// `[view]` block: defaults for `ls` when no flags are given.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ViewConfig {
    /// Default sort key.
    #[serde(default)]
    pub sort: Option<String>,
    /// Default category filters.
    #[serde(default)]
    pub filters: Vec<String>,
}

impl ViewConfig {
    /// Builder seeded with these defaults.
    ///
    /// # Errors
    /// Returns an error if a configured token is not recognized.
    pub fn query_builder(&self) -> Result<ViewQueryBuilder, crate::FilterBuildError> {
        ViewQueryBuilder::new()
            .with_filters(&self.filters)?
            .with_sort(self.sort.as_deref())
    }

    /// Default view query without search text.
    ///
    /// # Errors
    /// Returns an error if a configured token is not recognized.
    pub fn default_query(&self) -> Result<ViewQuery, crate::FilterBuildError> {
        self.query_builder().map(ViewQueryBuilder::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use todolist_core::{FilterValue, Priority, SortKey};

    fn write_config(dir: &Path, body: &str) -> Result<()> {
        let cfg_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&cfg_dir)?;
        let mut file = fs::File::create(cfg_dir.join(CONFIG_FILE))?;
        writeln!(file, "{body}")?;
        Ok(())
    }

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = ProjectConfig::load(dir.path())?;
        assert_eq!(cfg.storage.key, DEFAULT_KEY);
        assert!(cfg.storage.path.is_none());
        assert_eq!(cfg.view.default_query()?, ViewQuery::default());
        Ok(())
    }

    #[test]
    fn load_config_with_storage_and_view() -> Result<()> {
        let dir = tempdir()?;
        write_config(
            dir.path(),
            "[storage]\npath = \"data/todos.json\"\nkey = \"tasks\"\n\n[view]\nsort = \"priority\"\nfilters = [\"urgent\", \"Overdue\"]",
        )?;

        let cfg = ProjectConfig::load(dir.path())?;
        assert_eq!(cfg.storage.key, "tasks");
        assert_eq!(
            cfg.store_path(dir.path(), None)?,
            dir.path().join("data/todos.json")
        );

        let query = cfg.view.default_query()?;
        assert_eq!(query.sort, Some(SortKey::Priority));
        assert!(query.filter.contains(FilterValue::Priority(Priority::Urgent)));
        Ok(())
    }

    #[test]
    fn override_path_wins() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[storage]\npath = \"configured.json\"")?;
        let cfg = ProjectConfig::load(dir.path())?;
        let explicit = dir.path().join("explicit.json");
        assert_eq!(cfg.store_path(dir.path(), Some(&explicit))?, explicit);
        Ok(())
    }

    #[test]
    fn empty_storage_key_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[storage]\nkey = \"  \"")?;

        let Err(err) = ProjectConfig::load(dir.path()) else {
            panic!("empty key should error");
        };
        assert!(err.to_string().contains("storage key must not be empty"));
        Ok(())
    }

    #[test]
    fn unknown_view_tokens_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        write_config(dir.path(), "[view]\nfilters = [\"someday\"]")?;

        let Err(err) = ProjectConfig::load(dir.path()) else {
            panic!("unknown filter should error");
        };
        assert!(err.to_string().contains("someday"));
        Ok(())
    }
}
