//! Unified path management for tarot configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tarot/             # Config directory (or $TAROT_CONFIG_DIR)
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── resume/                  # Drafts awaiting payment, one file per resume id
//! │   └── claimed/             # Checkout sessions already resumed
//! └── logs/                    # Application logs
//!     └── tarot-readline.log.YYYY-MM-DD
//! ```

use crate::config_service::EnvLookup;
use std::path::{Path, PathBuf};
use tarot_core::config::{GeminiConfig, SecretConfig, StripeConfig};
use tarot_core::{Result, TarotError};

pub const CONFIG_DIR_ENV: &str = "TAROT_CONFIG_DIR";

/// Resolved locations of every file the service reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarotPaths {
    config_dir: PathBuf,
}

impl TarotPaths {
    /// Uses `base` when given, else `$TAROT_CONFIG_DIR`, else `~/.config/tarot`.
    pub fn resolve(base: Option<&Path>, env: &EnvLookup) -> Result<Self> {
        if let Some(base) = base {
            return Ok(Self::at(base));
        }
        if let Some(dir) = env(CONFIG_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            return Ok(Self::at(dir));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| TarotError::config("Cannot find home directory"))?;
        Ok(Self::at(home.join(".config").join("tarot")))
    }

    /// Paths rooted at an explicit directory.
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn resume_dir(&self) -> PathBuf {
        self.config_dir.join("resume")
    }

    pub fn claimed_dir(&self) -> PathBuf {
        self.resume_dir().join("claimed")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    /// Creates `secret.json` with empty placeholders if it is missing.
    ///
    /// On Unix the file is restricted to mode 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }
        std::fs::create_dir_all(&self.config_dir)?;

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(tarot_core::config::DEFAULT_GEMINI_MODEL.to_string()),
            }),
            stripe: Some(StripeConfig {
                secret_key: String::new(),
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn env_with(dir: Option<&'static str>) -> EnvLookup {
        Arc::new(move |key| (key == CONFIG_DIR_ENV).then(|| dir.map(String::from)).flatten())
    }

    #[test]
    fn test_explicit_base_wins() {
        let paths = TarotPaths::resolve(Some(Path::new("/tmp/a")), &env_with(Some("/tmp/b"))).unwrap();
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/a/config.toml"));
    }

    #[test]
    fn test_env_dir_used_without_base() {
        let paths = TarotPaths::resolve(None, &env_with(Some("/srv/tarot"))).unwrap();
        assert_eq!(paths.secret_file(), PathBuf::from("/srv/tarot/secret.json"));
        assert_eq!(paths.claimed_dir(), PathBuf::from("/srv/tarot/resume/claimed"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = TarotPaths::at(dir.path());
        let path = paths.ensure_secret_file().unwrap();
        let secrets: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(secrets.gemini_api_key(), None);

        std::fs::write(&path, r#"{"gemini":{"api_key":"k"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"k\""));
    }
}
