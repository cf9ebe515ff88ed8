use crate::calibration::{CalibrationReport, CalibrationTracker};
use crate::delta::{Delta, Measurement};
use crate::errors::TickError;
use crate::sensors::{ImuDevice, SensorRead};
use crate::sink::MessageSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error};

/// Result of one successful poll cycle
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub calibration: CalibrationReport,
    pub measurement: Measurement,
}

/// Owns the device and the session calibration state, and turns readings into deltas
pub struct Poller {
    plugin_id: String,
    self_id: String,
    device: Box<dyn ImuDevice>,
    calibration: CalibrationTracker,
    sink: Arc<dyn MessageSink>,
}

impl Poller {
    pub fn new(
        plugin_id: String,
        self_id: String,
        device: Box<dyn ImuDevice>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            plugin_id,
            self_id,
            device,
            calibration: CalibrationTracker::new(),
            sink,
        }
    }

    pub fn calibration(&self) -> &CalibrationTracker {
        &self.calibration
    }

    /// Read everything the delta needs. Reads run in order and the first failure ends the cycle.
    pub async fn read(&mut self) -> Result<TickOutput, TickError> {
        let device = self.device.as_mut();

        let calibration = self.calibration.check(device).await
            .map_err(|source| TickError::ReadFailed { read: SensorRead::Calibration, source })?;
        let celsius = device.read_temperature().await
            .map_err(|source| TickError::ReadFailed { read: SensorRead::Temperature, source })?;
        let euler = device.read_euler().await
            .map_err(|source| TickError::ReadFailed { read: SensorRead::Euler, source })?;
        let linear_acceleration = device.read_linear_acceleration().await
            .map_err(|source| TickError::ReadFailed { read: SensorRead::LinearAcceleration, source })?;
        let gyro = device.read_gyroscope().await
            .map_err(|source| TickError::ReadFailed { read: SensorRead::Gyroscope, source })?;

        Ok(TickOutput {
            calibration,
            measurement: Measurement::new(celsius, euler, gyro, linear_acceleration),
        })
    }

    /// One full cycle: read, build the delta, hand it to the sink.
    /// Returns whether a delta was published; failures are logged here exactly once.
    pub async fn tick(&mut self) -> bool {
        let output = match self.read().await {
            Ok(output) => output,
            Err(e) => {
                error!("[poller] Failed to read IMU: {}", e);
                return false;
            }
        };

        let delta = Delta::from_measurement(
            &self.self_id,
            &self.plugin_id,
            self.device.name(),
            &output.measurement,
        );
        debug!("[poller] {} got motion delta: {:?}", self.plugin_id, delta);

        match self.sink.handle_message(&self.plugin_id, delta).await {
            Ok(()) => true,
            Err(e) => {
                error!("[poller] Failed to publish: {}", e);
                false
            }
        }
    }
}

/// Drive the poller from a fixed-period timer on its own task.
///
/// Ticks run one at a time on that task. A tick that overruns the period makes the
/// timer skip the firings it missed instead of queueing them.
pub fn spawn_poll_task(mut poller: Poller, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; readings start one period after start
        timer.tick().await;

        loop {
            timer.tick().await;
            poller.tick().await;
        }
    })
}
