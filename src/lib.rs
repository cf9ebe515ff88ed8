// Public modules
pub mod bus;
pub mod calibration;
pub mod config;
pub mod delta;
pub mod errors;
pub mod plugin;
pub mod poller;
pub mod schema;
pub mod sensors;
pub mod sink;

// Re-export commonly used types
pub use config::{load_config, AppConfig, PluginConfig};
pub use delta::Delta;
pub use errors::{PluginError, PluginResult, SensorError, SensorResult};
pub use plugin::ImuPlugin;
pub use sink::{DeltaHub, MessageSink};

use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Run the plugin standalone against an in-process hub, writing each delta to stdout
/// as a JSON line until Ctrl-C
pub async fn run_standalone(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config_file = format!("{}/imu.toml", config_path);
    let config = load_config(&config_file)?;
    info!(
        "[config] loaded {} (motionPeriod={}ms, driver={:?})",
        config_file, config.plugin.motion_period, config.device.driver
    );

    let hub = DeltaHub::new();
    let mut deltas = hub.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(published) = deltas.next().await {
            match published.delta.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => error!("[main] failed to encode delta from {}: {}", published.plugin_id, e),
            }
        }
    });

    let mut plugin = ImuPlugin::new(config.host, config.device, Arc::new(hub.clone()));
    info!("[main] starting {} ({})", plugin.name(), plugin.id());
    plugin.start(config.plugin).await?;

    tokio::signal::ctrl_c().await?;
    info!("[main] shutting down");
    plugin.stop();
    printer.abort();

    if let Some(stats) = hub.stats(plugin.id()).await {
        info!("[main] {} published {} deltas", plugin.id(), stats.messages_sent);
    }
    Ok(())
}
