use super::{default_config_path, Config};
use crate::error::{CepDistError, ErrorCode, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reads the TOML config file and layers environment overrides on top
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader that looks for the user-level config file
    pub fn new() -> Self {
        Self {
            explicit_path: None,
        }
    }

    /// Loader for a file named on the command line; a missing file is an error
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: Some(path.into()),
        }
    }

    pub async fn load(&self) -> Result<Config> {
        self.load_with(|key| std::env::var(key).ok()).await
    }

    /// Same as [`load`](Self::load) with a custom variable lookup
    pub async fn load_with<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CepDistError::config_with_code(
                        ErrorCode::CONFIG_NOT_FOUND,
                        format!("Config file not found: {}", path.display()),
                    ));
                }
                Self::read_file(path).await?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read_file(&path).await?,
                _ => {
                    debug!("No config file found, using defaults");
                    Config::new()
                }
            },
        };

        config.merge_vars_from(lookup)?;
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Config> {
        debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path).await.map_err(|e| {
            CepDistError::config_with_code(
                ErrorCode::CONFIG_PATH_ERROR,
                format!("Cannot read {}", path.display()),
            )
            .with_source(e)
        })?;
        toml::from_str(&content).map_err(|e| {
            CepDistError::from(e).with_context(path.display())
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocationSource, PermissionPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "warn"

[http]
timeout_secs = 4

[location]
permission = "granted"
source = "fixed"
latitude = -23.5505
longitude = -46.6333
"#
        )
        .unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(no_env)
            .await
            .unwrap();
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.http.timeout_secs, 4);
        assert_eq!(config.location.permission, PermissionPolicy::Granted);
        assert_eq!(config.location.source, LocationSource::Fixed);
    }

    #[tokio::test]
    async fn test_env_wins_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[location]\npermission = \"denied\"").unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(|key| {
                (key == "CEPDIST_LOCATION_PERMISSION").then(|| "granted".to_string())
            })
            .await
            .unwrap();
        assert_eq!(config.location.permission, PermissionPolicy::Granted);
    }

    #[tokio::test]
    async fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::with_path(dir.path().join("absent.toml"))
            .load_with(no_env)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_toml_and_invalid_values() {
        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "[http\ntimeout_secs = ").unwrap();
        let err = ConfigLoader::with_path(broken.path())
            .load_with(no_env)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);

        let mut zero = NamedTempFile::new().unwrap();
        writeln!(zero, "[http]\ntimeout_secs = 0").unwrap();
        let err = ConfigLoader::with_path(zero.path())
            .load_with(no_env)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }
}
