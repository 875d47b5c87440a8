//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    models::TaskOrder,
};

/// Main configuration structure for VisualMath.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Export settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Recovery pass settings.
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, rendered as the `<title>` suffix.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Public domain used for the sitemap, robots.txt and canonical links
    /// (e.g., "https://example.github.io").
    #[serde(default = "default_domain")]
    pub domain: String,

    /// URL prefix for every generated link (e.g., "/mysite"). `/` for root.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Document language code.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for the generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory of template overrides, read on every render.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Authoritative ordering of tasks inside a lesson.
    #[serde(default)]
    pub task_order: TaskOrder,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

/// Recovery pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Root of a previously generated site.
    #[serde(default = "default_output_dir")]
    pub source_dir: PathBuf,

    /// Grade assigned when a lesson page has no grade link.
    #[serde(default = "default_grade")]
    pub default_grade: i32,

    /// Domain the presentation iframe must point at.
    #[serde(default = "default_presentation_host")]
    pub presentation_host: String,
}

// Default value functions
fn default_site_name() -> String {
    "VisualMath".to_string()
}

fn default_domain() -> String {
    "https://meirbekashirbayev.github.io".to_string()
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_language() -> String {
    "kk".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("math_app.db")
}

fn default_grade() -> i32 {
    5
}

fn default_presentation_host() -> String {
    crate::models::PRESENTATION_HOST.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            domain: default_domain(),
            base_path: default_base_path(),
            language: default_language(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            templates_dir: None,
            task_order: TaskOrder::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            source_dir: default_output_dir(),
            default_grade: default_grade(),
            presentation_host: default_presentation_host(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, layering `VISUALMATH__*`
    /// environment variables over the file.
    ///
    /// A missing file is not an error here; defaults plus environment apply.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("VISUALMATH").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.name.trim().is_empty() {
            return Err(CoreError::config("site.name cannot be empty"));
        }

        if self.site.domain.trim_end_matches('/').is_empty() {
            return Err(CoreError::config("site.domain cannot be empty"));
        }

        if !self.site.base_path.starts_with('/') {
            return Err(CoreError::config(format!(
                "site.base_path must start with '/', got {:?}",
                self.site.base_path
            )));
        }

        if self.site.domain.ends_with('/') {
            tracing::warn!("site.domain should not have a trailing slash");
        }

        if self.recovery.default_grade <= 0 {
            return Err(CoreError::config("recovery.default_grade must be positive"));
        }

        Ok(())
    }

    /// Public domain without a trailing slash.
    pub fn domain(&self) -> &str {
        self.site.domain.trim_end_matches('/')
    }

    /// Absolute URL for a logical path on the public domain.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.domain())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
name = "Test Math"
domain = "https://example.com"
base_path = "/mysite"
language = "en"

[build]
output_dir = "dist"
templates_dir = "templates"
task_order = "explicit"

[database]
path = "data/app.db"

[recovery]
source_dir = "old-site"
default_grade = 7
presentation_host = "slides.example.com"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("visualmath.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.name, "Test Math");
        assert_eq!(config.site.domain, "https://example.com");
        assert_eq!(config.site.base_path, "/mysite");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.build.output_dir, PathBuf::from("dist"));
        assert_eq!(config.build.templates_dir, Some(PathBuf::from("templates")));
        assert_eq!(config.build.task_order, TaskOrder::Explicit);
        assert_eq!(config.database.path, PathBuf::from("data/app.db"));
        assert_eq!(config.recovery.source_dir, PathBuf::from("old-site"));
        assert_eq!(config.recovery.default_grade, 7);
        assert_eq!(config.recovery.presentation_host, "slides.example.com");
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("visualmath.toml");
        std::fs::write(&config_path, "").expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.name, "VisualMath");
        assert_eq!(config.site.base_path, "/");
        assert_eq!(config.build.output_dir, PathBuf::from("docs"));
        assert!(config.build.templates_dir.is_none());
        assert_eq!(config.build.task_order, TaskOrder::Insertion);
        assert_eq!(config.database.path, PathBuf::from("math_app.db"));
        assert_eq!(config.recovery.default_grade, 5);
        assert_eq!(config.recovery.presentation_host, "canva.com");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_url_for() {
        let mut config = Config::default();
        config.site.domain = "https://example.com/".to_string();

        assert_eq!(config.url_for("/lesson/3"), "https://example.com/lesson/3");
        assert_eq!(config.url_for("sitemap.xml"), "https://example.com/sitemap.xml");
    }

    #[test]
    fn test_config_validation_base_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("visualmath.toml");
        std::fs::write(&config_path, "[site]\nbase_path = \"mysite\"\n").expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_config_validation_empty_name() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("visualmath.toml");
        std::fs::write(&config_path, "[site]\nname = \"\"\n").expect("write");

        let result = Config::load(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("name cannot be empty")
        );
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/visualmath.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_with_env_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = Config::load_with_env(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config.site.name, "VisualMath");
    }

    #[test]
    fn test_load_with_env_override() {
        let dir = tempfile::tempdir().expect("create temp dir");
        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe { std::env::set_var("VISUALMATH__SITE__LANGUAGE", "ru") };
        let config = Config::load_with_env(&dir.path().join("absent.toml")).expect("load");
        unsafe { std::env::remove_var("VISUALMATH__SITE__LANGUAGE") };

        assert_eq!(config.site.language, "ru");
    }
}
