//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` and applies environment overrides.

use crate::paths::TarotPaths;
use std::sync::Arc;
use tarot_core::Result;
use tarot_core::config::AppConfig;

pub const PORT_ENV: &str = "TAROT_PORT";

/// Environment lookup, injectable so tests never touch the process env.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the real process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key| std::env::var(key).ok())
}

/// Loads the root configuration.
#[derive(Clone)]
pub struct ConfigService {
    paths: TarotPaths,
    env: EnvLookup,
}

impl ConfigService {
    pub fn new(paths: TarotPaths, env: EnvLookup) -> Self {
        Self { paths, env }
    }

    /// Reads `config.toml`, falling back to defaults when it is missing or empty.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.paths.config_file();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                AppConfig::default()
            } else {
                toml::from_str(&content)?
            }
        } else {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            AppConfig::default()
        };

        self.apply_env(&mut config);
        Ok(config)
    }

    /// Writes the configuration back to `config.toml`.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        std::fs::create_dir_all(self.paths.config_dir())?;
        std::fs::write(self.paths.config_file(), toml::to_string_pretty(config)?)?;
        Ok(())
    }

    fn apply_env(&self, config: &mut AppConfig) {
        if let Some(raw) = (self.env)(PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!("[Config] Ignoring invalid {}={}", PORT_ENV, raw),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(TarotPaths::at(dir.path()), env(&[]));
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_env_port_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[server]\nport = 8080\n").unwrap();

        let service = ConfigService::new(TarotPaths::at(dir.path()), env(&[]));
        assert_eq!(service.load().unwrap().server.port, 8080);

        let service = ConfigService::new(TarotPaths::at(dir.path()), env(&[(PORT_ENV, "9090")]));
        assert_eq!(service.load().unwrap().server.port, 9090);

        let service = ConfigService::new(TarotPaths::at(dir.path()), env(&[(PORT_ENV, "nope")]));
        assert_eq!(service.load().unwrap().server.port, 8080);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(TarotPaths::at(dir.path().join("nested")), env(&[]));
        let mut config = AppConfig::default();
        config.reading.model = "gemini-2.0-flash".into();
        service.save(&config).unwrap();
        assert_eq!(service.load().unwrap(), config);
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[server\nport = ").unwrap();
        let service = ConfigService::new(TarotPaths::at(dir.path()), env(&[]));
        let err = service.load().unwrap_err();
        assert!(matches!(err, tarot_core::TarotError::Serialization { ref format, .. } if format == "TOML"));
    }
}
