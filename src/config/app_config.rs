use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::providers::{DEFAULT_PAGE_SIZE, FindQuery, MAX_PAGE_SIZE, SortOrder};

/// Provides the default value for page_size.
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Provides the default value for locations_path.
fn default_locations_path() -> PathBuf {
    PathBuf::from("locations.yaml")
}

/// Application configuration for the inventory service.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite monitor store.
    pub database_url: String,

    /// Number of monitor records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Path to the location directory file. Relative paths are resolved
    /// against the configuration directory.
    #[serde(default = "default_locations_path")]
    pub locations_path: PathBuf,

    /// Path to the monitor import file.
    #[serde(skip_deserializing)]
    pub monitors_path: PathBuf,

    /// Search text applied when none is given on the command line.
    #[serde(default)]
    pub default_search: Option<String>,

    /// Sort field applied when none is given on the command line.
    #[serde(default)]
    pub default_sort_field: Option<String>,

    /// Sort order applied when none is given on the command line.
    #[serde(default)]
    pub default_sort_order: Option<SortOrder>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            page_size: default_page_size(),
            locations_path: default_locations_path(),
            monitors_path: PathBuf::new(),
            default_search: None,
            default_sort_field: None,
            default_sort_order: None,
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, overlaid by `INVENTORY__*` environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("INVENTORY").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Message(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let config_path = Path::new(config_dir_str);

        if config.locations_path.is_relative() {
            config.locations_path = config_path.join(&config.locations_path);
        }
        config.monitors_path = config_path.join("monitors.yaml");

        Ok(config)
    }

    /// Builds the monitor query described by the configured defaults.
    pub fn find_query(&self) -> FindQuery {
        let mut query = FindQuery::monitors().with_page_size(self.page_size);
        query.search = self.default_search.clone();
        query.sort_field = self.default_sort_field.clone();
        query.sort_order = self.default_sort_order;
        query
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database_url = url.to_string();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn default_search(mut self, search: &str) -> Self {
        self.config.default_search = Some(search.to_string());
        self
    }

    pub fn default_sort(mut self, field: &str, order: SortOrder) -> Self {
        self.config.default_sort_field = Some(field.to_string());
        self.config.default_sort_order = Some(order);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
