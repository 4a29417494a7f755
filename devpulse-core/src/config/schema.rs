//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration for devpulse
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Fleet behavior settings
    #[serde(default)]
    pub fleet: FleetConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fleet behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Base URL of the rewards API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Seconds between cycle ticks
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_s: u64,
}

fn default_api_base() -> String {
    "https://www.aeropres.in".to_string()
}

fn default_cycle_interval() -> u64 {
    60
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            cycle_interval_s: default_cycle_interval(),
        }
    }
}

/// One device account: immutable once loaded, owned by a single agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Reward wallet address
    pub wallet_address: String,
    /// Bearer token for the rewards API
    pub token: String,
    /// Registered device hash
    pub device_hash: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_config_defaults() {
        let config = FleetConfig::default();
        assert_eq!(config.api_base, "https://www.aeropres.in");
        assert_eq!(config.cycle_interval_s, 60);
    }

    #[test]
    fn test_account_deserializes_camel_case() {
        let account: Account = serde_json::from_str(
            r#"{"walletAddress":"0xA","token":"t1","deviceHash":"d1"}"#,
        )
        .unwrap();
        assert_eq!(account.wallet_address, "0xA");
        assert_eq!(account.token, "t1");
        assert_eq!(account.device_hash, "d1");
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"fleet":{"cycleIntervalS":30}}"#).unwrap_or_default();
        // snake_case key is the schema; unknown camelCase key above is ignored
        assert_eq!(config.fleet.cycle_interval_s, 60);

        let config: Config = serde_json::from_str(r#"{"fleet":{"cycle_interval_s":30}}"#).unwrap();
        assert_eq!(config.fleet.cycle_interval_s, 30);
        assert_eq!(config.fleet.api_base, "https://www.aeropres.in");
    }
}
