//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::PollerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "POLLDANCER_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "polldancer.toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PollerConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the process configuration.
///
/// Uses the file named by `POLLDANCER_CONFIG`, else `./polldancer.toml` when
/// it exists, else built-in defaults. Environment overrides are applied on
/// top and the result is validated.
pub fn resolve_config() -> Result<PollerConfig, ConfigError> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let fallback = Path::new(DEFAULT_CONFIG_FILE);

    let mut config = match explicit {
        Some(path) => read_config(&path)?,
        None if fallback.exists() => read_config(fallback)?,
        None => PollerConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay selected settings from the environment.
///
/// Secrets such as the alert token are expected to arrive this way rather
/// than through the config file.
pub fn apply_env_overrides<F>(config: &mut PollerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let overrides: [(&str, &mut String); 4] = [
        ("POLLDANCER_SOURCE_URL", &mut config.source.url),
        ("POLLDANCER_SINK_URL", &mut config.sink.url),
        ("POLLDANCER_ALERT_TOKEN", &mut config.alert.token),
        ("POLLDANCER_ALERT_CHANNEL", &mut config.alert.channel),
    ];

    for (key, slot) in overrides {
        if let Some(value) = lookup(key) {
            *slot = value;
        }
    }
}

fn read_config(path: &Path) -> Result<PollerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("polldancer-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp(
            "valid",
            r#"
            [source]
            url = "http://upstream.local/feed"

            [sink]
            url = "http://downstream.local/hook"

            [schedule]
            interval_secs = 30

            [breaker]
            failure_window_secs = 300
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.sink.url, "http://downstream.local/hook");
        assert_eq!(config.schedule.interval_secs, 30);
        assert_eq!(config.breaker.failure_window_secs, 300);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = write_temp(
            "invalid",
            r#"
            [schedule]
            interval_secs = 0
            "#,
        );

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("schedule.interval_secs"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/polldancer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_toml() {
        let path = write_temp("malformed", "[source\nurl = ");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("POLLDANCER_ALERT_TOKEN", "xoxb-secret"),
            ("POLLDANCER_SINK_URL", "http://override.local/hook"),
        ]);

        let mut config = PollerConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.alert.token, "xoxb-secret");
        assert_eq!(config.sink.url, "http://override.local/hook");
        assert_eq!(config.source.url, PollerConfig::default().source.url);
    }
}
