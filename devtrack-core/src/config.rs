use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "DEVTRACK_CONFIG";

/// Environment variable naming a snapshot to import at startup
pub const DATA_ENV: &str = "DEVTRACK_DATA";

/// User settings, stored as YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file imported at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,
    /// Default reporter and uploader name in interactive sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// tracing filter directive, e.g. "devtrack_core=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Config {
    /// Loads the config from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Loads the config, or returns the defaults if the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the config to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Creates a default config file if it doesn't exist
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        if path.as_ref().exists() {
            return Ok(());
        }

        let config = Config {
            data_file: None,
            user_name: env::var("USER").ok(),
            log_filter: Some("warn".to_string()),
        };
        config.save(path)
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.devtrack.yaml
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".devtrack.yaml"))
}

/// Where the tracker's initial state comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Import this snapshot file
    Snapshot(PathBuf),
    /// Use the built-in demonstration requests
    Sample,
}

/// Determines the startup data source.
///
/// Priority: the `--data` flag, then `DEVTRACK_DATA`, then the config's
/// `data_file`, else the sample data.
pub fn determine_data_source(flag: Option<&Path>, config: &Config) -> DataSource {
    resolve_data_source(flag, env::var(DATA_ENV).ok(), config)
}

fn resolve_data_source(flag: Option<&Path>, env_value: Option<String>, config: &Config) -> DataSource {
    if let Some(path) = flag {
        return DataSource::Snapshot(path.to_path_buf());
    }

    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return DataSource::Snapshot(PathBuf::from(path));
    }

    match &config.data_file {
        Some(path) if !path.trim().is_empty() => DataSource::Snapshot(PathBuf::from(path)),
        _ => DataSource::Sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("devtrack.yaml");

        let config = Config {
            data_file: Some("/tmp/state.yaml".into()),
            user_name: Some("Priya Nair".into()),
            log_filter: None,
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_create_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devtrack.yaml");

        Config::create_default(&path).unwrap();
        let created = Config::load(&path).unwrap();
        assert_eq!(created.log_filter.as_deref(), Some("warn"));

        let custom = Config {
            user_name: Some("someone".into()),
            ..Default::default()
        };
        custom.save(&path).unwrap();
        Config::create_default(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), custom);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "data_file: [unclosed").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_data_source_priority() {
        let config = Config {
            data_file: Some("from-config.yaml".into()),
            ..Default::default()
        };
        let flag = PathBuf::from("from-flag.json");

        assert_eq!(
            resolve_data_source(Some(&flag), Some("from-env.yaml".into()), &config),
            DataSource::Snapshot(flag.clone())
        );
        assert_eq!(
            resolve_data_source(None, Some("from-env.yaml".into()), &config),
            DataSource::Snapshot(PathBuf::from("from-env.yaml"))
        );
        assert_eq!(
            resolve_data_source(None, None, &config),
            DataSource::Snapshot(PathBuf::from("from-config.yaml"))
        );
        assert_eq!(resolve_data_source(None, None, &Config::default()), DataSource::Sample);
        assert_eq!(resolve_data_source(None, Some("  ".into()), &Config::default()), DataSource::Sample);
    }
}
