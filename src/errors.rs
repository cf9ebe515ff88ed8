use thiserror::Error;
use crate::bus::i2c::I2CError;
use crate::sensors::SensorRead;

/// Errors raised by an IMU device while initializing or reading
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C communication failed: {0}")]
    I2cError(#[from] I2CError),

    #[error("Sensor '{sensor}' initialization failed: {reason}")]
    InitError { sensor: String, reason: String },

    #[error("Sensor '{sensor}' read failed: {reason}")]
    ReadError { sensor: String, reason: String },

    #[error("Sensor '{sensor}' wrong chip ID: expected {expected:#04x}, got {actual:#04x}")]
    WrongChipId { sensor: String, expected: u8, actual: u8 },

    #[error("Bus '{bus}' not found or unavailable: {reason}")]
    BusNotFound { bus: String, reason: String },
}

/// A single poll cycle that was abandoned before a delta could be built
#[derive(Error, Debug)]
pub enum TickError {
    #[error("failed to read {read}: {source}")]
    ReadFailed {
        read: SensorRead,
        #[source]
        source: SensorError,
    },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors raised by a message sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to publish delta from '{plugin_id}': {reason}")]
    PublishError { plugin_id: String, reason: String },
}

/// Plugin lifecycle errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("IMU failed to start: {0}")]
    Init(#[source] SensorError),

    #[error("Plugin '{0}' is already running")]
    AlreadyRunning(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type aliases for convenience
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type SinkResult<T> = Result<T, SinkError>;
pub type PluginResult<T> = Result<T, PluginError>;
