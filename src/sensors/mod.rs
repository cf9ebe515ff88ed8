pub mod bno055;
pub mod fake;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tracing::info;

use crate::bus::i2c::{self, I2CBus};
use crate::config::DeviceConfig;
use crate::errors::{SensorError, SensorResult};

pub use bno055::Bno055;
pub use fake::FakeImu;

/// Raw per-axis calibration codes, 0 (uncalibrated) to 3 (fully calibrated)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationStatus {
    pub system: u8,
    pub gyroscope: u8,
    pub accelerometer: u8,
    pub magnetometer: u8,
}

/// Fused orientation
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub heading: f64,
    pub roll: f64,
    pub pitch: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The individual reads a poll cycle issues, in the order it issues them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorRead {
    Calibration,
    Temperature,
    Euler,
    LinearAcceleration,
    Gyroscope,
}

impl fmt::Display for SensorRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorRead::Calibration => "calibration status",
            SensorRead::Temperature => "temperature",
            SensorRead::Euler => "euler angles",
            SensorRead::LinearAcceleration => "linear acceleration",
            SensorRead::Gyroscope => "gyroscope",
        };
        f.write_str(name)
    }
}

/// Capability set of a fusion IMU as seen by the poller.
///
/// Euler angles are radians, gyroscope rates radians per second, linear
/// acceleration metres per second squared and temperature degrees Celsius.
#[async_trait]
pub trait ImuDevice: Send {
    /// Put the device into continuous fusion (NDOF) mode
    async fn begin_continuous_fusion(&mut self) -> SensorResult<()>;
    async fn read_calibration_status(&mut self) -> SensorResult<CalibrationStatus>;
    async fn read_temperature(&mut self) -> SensorResult<f64>;
    async fn read_euler(&mut self) -> SensorResult<EulerAngles>;
    async fn read_linear_acceleration(&mut self) -> SensorResult<Vector3>;
    async fn read_gyroscope(&mut self) -> SensorResult<Vector3>;
    /// Short device name, used as the delta source
    fn name(&self) -> &str;
}

/// Which driver the factory should build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverSelection {
    /// Real hardware when an I2C adapter is present, otherwise the fake device
    #[default]
    Auto,
    Bno055,
    Fake,
}

/// Build the device for this platform
pub fn create_imu_device(config: &DeviceConfig) -> SensorResult<Box<dyn ImuDevice>> {
    create_imu_device_with(config, i2c::adapter_present())
}

pub(crate) fn create_imu_device_with(
    config: &DeviceConfig,
    adapter_present: bool,
) -> SensorResult<Box<dyn ImuDevice>> {
    let use_hardware = match config.driver {
        DriverSelection::Bno055 => true,
        DriverSelection::Fake => false,
        DriverSelection::Auto => adapter_present,
    };

    if use_hardware {
        let bus = I2CBus::new(&config.bus).map_err(|e| SensorError::BusNotFound {
            bus: config.bus.clone(),
            reason: e.to_string(),
        })?;
        info!("[factory] BNO055 available on {} at {:#04x}", config.bus, config.address);
        Ok(Box::new(Bno055::new(bus, config.address)))
    } else {
        info!("[factory] BNO055 not available, created fake sensor");
        Ok(Box::new(FakeImu::new()))
    }
}
