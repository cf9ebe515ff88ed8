use crate::config::{DeviceConfig, HostConfig, PluginConfig};
use crate::errors::{PluginError, PluginResult};
use crate::poller::{spawn_poll_task, Poller};
use crate::schema::{self, PLUGIN_DESCRIPTION, PLUGIN_ID, PLUGIN_NAME};
use crate::sensors::{create_imu_device, ImuDevice};
use crate::sink::MessageSink;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The IMU source plugin as the host sees it: identity, settings schema, start and stop
pub struct ImuPlugin {
    host: HostConfig,
    device: DeviceConfig,
    sink: Arc<dyn MessageSink>,
    motion_task: Option<JoinHandle<()>>,
}

impl ImuPlugin {
    pub fn new(host: HostConfig, device: DeviceConfig, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            host,
            device,
            sink,
            motion_task: None,
        }
    }

    pub fn id(&self) -> &'static str {
        PLUGIN_ID
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn description(&self) -> &'static str {
        PLUGIN_DESCRIPTION
    }

    pub fn schema(&self) -> Value {
        schema::schema()
    }

    pub fn ui_schema(&self) -> Value {
        schema::ui_schema()
    }

    pub fn is_running(&self) -> bool {
        self.motion_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Build the platform's device and start polling it
    pub async fn start(&mut self, config: PluginConfig) -> PluginResult<()> {
        let device = create_imu_device(&self.device).map_err(|e| {
            error!("[plugin] IMU failed to start: {}", e);
            PluginError::Init(e)
        })?;
        self.start_with_device(config, device).await
    }

    /// Start polling an already constructed device.
    ///
    /// Initialization failures are logged once and returned; no timer is started and
    /// nothing is retried.
    pub async fn start_with_device(
        &mut self,
        config: PluginConfig,
        mut device: Box<dyn ImuDevice>,
    ) -> PluginResult<()> {
        if self.is_running() {
            return Err(PluginError::AlreadyRunning(PLUGIN_ID.to_string()));
        }
        config.validate()?;

        if let Err(e) = device.begin_continuous_fusion().await {
            error!("[plugin] IMU failed to start: {}", e);
            return Err(PluginError::Init(e));
        }
        info!(
            "[plugin] {} started fusion mode, polling every {}ms",
            device.name(),
            config.motion_period
        );

        let poller = Poller::new(
            PLUGIN_ID.to_string(),
            self.host.self_id.clone(),
            device,
            self.sink.clone(),
        );
        self.motion_task = Some(spawn_poll_task(poller, config.motion_interval()));
        Ok(())
    }

    /// Cancel polling. Safe to call when never started or already stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.motion_task.take() {
            task.abort();
            info!("[plugin] {} stopped", PLUGIN_ID);
        }
    }
}

impl Drop for ImuPlugin {
    fn drop(&mut self) {
        self.stop();
    }
}
