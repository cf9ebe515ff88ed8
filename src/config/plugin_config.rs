use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::bno055;
use crate::sensors::DriverSelection;

pub const DEFAULT_MOTION_PERIOD_MS: u64 = 1000;
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_SELF_ID: &str = "self";

/// Root of `imu.toml`; plugin options sit at the top level like the host would pass them
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Options exposed through the plugin's settings schema
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PluginConfig {
    /// Milliseconds between motion readings
    #[serde(rename = "motionPeriod", default = "default_motion_period")]
    pub motion_period: u64,
}

impl PluginConfig {
    pub fn motion_interval(&self) -> Duration {
        Duration::from_millis(self.motion_period)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.motion_period == 0 {
            return Err(ConfigError::InvalidValue {
                field: "motionPeriod".to_string(),
                reason: "must be a positive number of milliseconds".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self { motion_period: DEFAULT_MOTION_PERIOD_MS }
    }
}

/// Values the host provides to every plugin
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Vessel identity used to build the delta context
    #[serde(default = "default_self_id")]
    pub self_id: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { self_id: default_self_id() }
    }
}

/// Where to find the sensor
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub driver: DriverSelection,
    #[serde(default = "default_bus")]
    pub bus: String,
    #[serde(default = "default_address")]
    pub address: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            driver: DriverSelection::default(),
            bus: default_bus(),
            address: default_address(),
        }
    }
}

fn default_motion_period() -> u64 {
    DEFAULT_MOTION_PERIOD_MS
}

fn default_self_id() -> String {
    DEFAULT_SELF_ID.to_string()
}

fn default_bus() -> String {
    DEFAULT_I2C_BUS.to_string()
}

fn default_address() -> u8 {
    bno055::DEFAULT_ADDRESS
}

/// Parse and validate TOML config text
pub fn parse_config(content: &str) -> ConfigResult<AppConfig> {
    let parsed: AppConfig = toml::from_str(content)?;
    parsed.plugin.validate()?;
    Ok(parsed)
}

/// Loads config from TOML file
pub fn load_config(path: &str) -> ConfigResult<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadError {
        path: path.to_string(),
        source: e,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.plugin.motion_period, 1000);
        assert_eq!(config.plugin.motion_interval(), Duration::from_secs(1));
        assert_eq!(config.host.self_id, "self");
        assert_eq!(config.device.driver, DriverSelection::Auto);
        assert_eq!(config.device.bus, "/dev/i2c-1");
        assert_eq!(config.device.address, 0x28);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            motionPeriod = 250

            [host]
            self_id = "urn:mrn:imo:mmsi:230099999"

            [device]
            driver = "fake"
            bus = "/dev/i2c-3"
            address = 0x29
            "#,
        )
        .unwrap();

        assert_eq!(config.plugin.motion_period, 250);
        assert_eq!(config.host.self_id, "urn:mrn:imo:mmsi:230099999");
        assert_eq!(config.device.driver, DriverSelection::Fake);
        assert_eq!(config.device.bus, "/dev/i2c-3");
        assert_eq!(config.device.address, 0x29);
    }

    #[test]
    fn test_zero_period_rejected() {
        match parse_config("motionPeriod = 0") {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "motionPeriod"),
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_period_is_format_error() {
        assert!(matches!(parse_config("motionPeriod = -5"), Err(ConfigError::FormatError(_))));
    }

    #[test]
    fn test_unknown_driver_is_format_error() {
        let result = parse_config("[device]\ndriver = \"mpu6050\"");
        assert!(matches!(result, Err(ConfigError::FormatError(_))));
    }

    #[test]
    fn test_missing_file() {
        match load_config("/nonexistent/imu.toml") {
            Err(ConfigError::LoadError { path, .. }) => assert_eq!(path, "/nonexistent/imu.toml"),
            other => panic!("expected load error, got {:?}", other),
        }
    }
}
