pub mod plugin_config;

pub use plugin_config::{load_config, parse_config, AppConfig, DeviceConfig, HostConfig, PluginConfig};
