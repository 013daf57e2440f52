use std::env;
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

use super::probe_config::Config;

pub const DEFAULT_CONFIG_FILE: &str = "probe.yml";

/// Load the application configuration from a YAML file and environment variables.
/// A `.env` file is honoured when present. The file named by `CONFIG_FILE`
/// (default `probe.yml`) is optional; when it does not exist the defaults are used.
/// Environment variables override whatever the file says, and the result is validated.
pub fn load_config() -> Result<Config, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let mut config = read_config_file(&config_file_location)?;
    apply_overrides(&mut config, |key| env::var(key).ok())?;
    config.validate()?;

    log::info!(
        "Probe target {} with {} tasks, launch delay {}us",
        config.probe.url,
        config.probe.task_count,
        config.probe.launch_delay_us
    );
    Ok(config)
}

fn read_config_file(location: &str) -> Result<Config, ConfigError> {
    let config_str = match std::fs::read_to_string(location) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config file at {location}, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: location.to_string(),
                source,
            });
        }
    };

    parse_config(location, &config_str)
}

fn parse_config(location: &str, config_str: &str) -> Result<Config, ConfigError> {
    // serde_yaml rejects an empty document, treat it as "all defaults"
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(config_str).map_err(|source| ConfigError::Parse {
        path: location.to_string(),
        source,
    })
}

/// Apply environment overrides on top of the file configuration.
/// `lookup` resolves a variable name to its value, `env::var` in production.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("PROBE_URL") {
        config.probe.url = url.trim().to_string();
    }
    if let Some(value) = lookup("PROBE_TASKS") {
        config.probe.task_count = parse_var("PROBE_TASKS", &value)?;
    }
    if let Some(value) = lookup("PROBE_LAUNCH_DELAY_US") {
        config.probe.launch_delay_us = parse_var("PROBE_LAUNCH_DELAY_US", &value)?;
    }
    if let Some(value) = lookup("PROBE_REQUEST_TIMEOUT_MS") {
        config.probe.request_timeout_ms = Some(parse_var("PROBE_REQUEST_TIMEOUT_MS", &value)?);
    }
    if let Some(value) = lookup("SERVER_PORT") {
        config.server.port = parse_var("SERVER_PORT", &value)?;
    }
    if let Some(value) = lookup("SERVER_BACKLOG") {
        config.server.backlog = parse_var("SERVER_BACKLOG", &value)?;
    }
    if let Some(value) = lookup("SERVER_ROOT") {
        config.server.root = PathBuf::from(value.trim());
    }
    if let Some(value) = lookup("SERVER_ACCEPT_DELAY_MS") {
        config.server.accept_delay_ms = parse_var("SERVER_ACCEPT_DELAY_MS", &value)?;
    }
    Ok(())
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("'{value}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("PROBE_URL", " http://10.0.0.1:9000/ "),
            ("PROBE_TASKS", "8"),
            ("PROBE_LAUNCH_DELAY_US", "500"),
            ("PROBE_REQUEST_TIMEOUT_MS", "2000"),
            ("SERVER_BACKLOG", "16"),
            ("SERVER_ROOT", "/tmp/site"),
        ]);

        apply_overrides(&mut config, lookup).expect("overrides should apply");

        assert_eq!(config.probe.url, "http://10.0.0.1:9000/");
        assert_eq!(config.probe.task_count, 8);
        assert_eq!(config.probe.launch_delay(), Duration::from_micros(500));
        assert_eq!(
            config.probe.request_timeout(),
            Some(Duration::from_millis(2000))
        );
        assert_eq!(config.server.backlog, 16);
        assert_eq!(config.server.root, PathBuf::from("/tmp/site"));
        assert_eq!(config.server.port, 6789);
    }

    #[test]
    fn no_overrides_keeps_config() {
        let mut config = Config::default();
        apply_overrides(&mut config, |_| None).expect("nothing to apply");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_number_is_reported_with_key() {
        let mut config = Config::default();
        let err = apply_overrides(&mut config, lookup_from(&[("PROBE_TASKS", "two")]))
            .expect_err("non numeric task count");

        match err {
            ConfigError::Invalid { key, reason } => {
                assert_eq!(key, "PROBE_TASKS");
                assert!(reason.contains("two"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_means_defaults() {
        let config = parse_config("probe.yml", "   \n").expect("empty file");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = parse_config("probe.yml", "probe: [1, 2").expect_err("broken yaml");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_means_defaults() {
        let config =
            read_config_file("definitely/not/here/probe.yml").expect("missing file is fine");
        assert_eq!(config, Config::default());
    }
}
