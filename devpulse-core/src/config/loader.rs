//! Configuration loading and management

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use super::schema::{Account, Config};
use super::validate::{validate_accounts, validate_config};
use crate::error::Error;

/// Configuration loader over a config directory
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".devpulse"))
            .unwrap_or_else(|| PathBuf::from(".devpulse"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration, merging `config.json` over defaults if present
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_dir.join("config.json");
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("invalid config.json: {}", e)))?;
            merge_values(&mut merged, file_value);
        }

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load the account list from `accounts.json`
    ///
    /// A missing or malformed file is fatal: there is nothing to run without
    /// credentials.
    pub fn load_accounts(&self) -> crate::Result<Vec<Account>> {
        let path = self.config_dir.join("accounts.json");
        if !path.exists() {
            return Err(Error::Config(format!(
                "accounts file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let accounts: Vec<Account> = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid accounts.json: {}", e)))?;

        validate_accounts(&accounts)?;
        Ok(accounts)
    }

    /// Load the proxy list from `proxies.txt`
    ///
    /// One endpoint per line; blank lines and `#` comments are skipped.
    /// A missing file is a warning, not an error.
    pub fn load_proxies(&self) -> Vec<String> {
        let path = self.config_dir.join("proxies.txt");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("No proxy list at {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ToString::to_string)
            .collect()
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.fleet.cycle_interval_s, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_merges_config_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{"fleet":{"cycle_interval_s":10}}"#,
        )
        .unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();

        assert_eq!(config.fleet.cycle_interval_s, 10);
        // untouched sections keep their defaults
        assert_eq!(config.fleet.api_base, "https://www.aeropres.in");
    }

    #[test]
    fn test_load_rejects_malformed_config_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.json"), "{not json").unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let err = loader.load().unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_load_accounts_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        let err = loader.load_accounts().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_accounts_malformed_is_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("accounts.json"), "[{]").unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let err = loader.load_accounts().unwrap_err();
        assert!(err.to_string().contains("accounts.json"));
    }

    #[test]
    fn test_load_accounts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("accounts.json"),
            r#"[
                {"walletAddress":"0xA","token":"t1","deviceHash":"d1"},
                {"walletAddress":"0xB","token":"t2","deviceHash":"d2"}
            ]"#,
        )
        .unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let accounts = loader.load_accounts().unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].wallet_address, "0xA");
        assert_eq!(accounts[1].device_hash, "d2");
    }

    #[test]
    fn test_load_proxies_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        assert!(loader.load_proxies().is_empty());
    }

    #[test]
    fn test_load_proxies_skips_blanks_and_comments() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("proxies.txt"),
            "# fleet proxies\n1.2.3.4:8080\n\n  socks5://5.6.7.8:1080  \n# eof\n",
        )
        .unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let proxies = loader.load_proxies();

        assert_eq!(proxies, vec!["1.2.3.4:8080", "socks5://5.6.7.8:1080"]);
    }
}
