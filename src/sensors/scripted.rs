//! Test double that counts reads and fails on demand.

use super::{CalibrationStatus, EulerAngles, ImuDevice, SensorRead, Vector3};
use crate::errors::{SensorError, SensorResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const SCRIPTED_DEVICE_NAME: &str = "scripted";

#[derive(Default)]
struct Script {
    begin_fails: bool,
    failing: Option<SensorRead>,
    calibrations: VecDeque<CalibrationStatus>,
    last_calibration: CalibrationStatus,
    calls: HashMap<SensorRead, usize>,
}

/// Cloneable handle; clones share the same script so a test can keep one after moving the device
#[derive(Clone, Default)]
pub struct ScriptedImu {
    script: Arc<Mutex<Script>>,
}

impl ScriptedImu {
    pub fn calibrated() -> Self {
        let imu = Self::default();
        imu.push_calibration(CalibrationStatus { system: 3, gyroscope: 3, accelerometer: 3, magnetometer: 3 });
        imu
    }

    /// Queue a calibration reading; the last one queued repeats once the queue drains
    pub fn push_calibration(&self, status: CalibrationStatus) {
        self.script.lock().unwrap().calibrations.push_back(status);
    }

    pub fn fail_begin(&self) {
        self.script.lock().unwrap().begin_fails = true;
    }

    pub fn fail_on(&self, read: Option<SensorRead>) {
        self.script.lock().unwrap().failing = read;
    }

    pub fn calls(&self, read: SensorRead) -> usize {
        self.script.lock().unwrap().calls.get(&read).copied().unwrap_or(0)
    }

    fn record(&self, read: SensorRead) -> SensorResult<()> {
        let mut script = self.script.lock().unwrap();
        *script.calls.entry(read).or_default() += 1;
        if script.failing == Some(read) {
            return Err(SensorError::ReadError {
                sensor: SCRIPTED_DEVICE_NAME.to_string(),
                reason: format!("scripted {} failure", read),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ImuDevice for ScriptedImu {
    async fn begin_continuous_fusion(&mut self) -> SensorResult<()> {
        if self.script.lock().unwrap().begin_fails {
            return Err(SensorError::InitError {
                sensor: SCRIPTED_DEVICE_NAME.to_string(),
                reason: "scripted init failure".to_string(),
            });
        }
        Ok(())
    }

    async fn read_calibration_status(&mut self) -> SensorResult<CalibrationStatus> {
        self.record(SensorRead::Calibration)?;
        let mut script = self.script.lock().unwrap();
        if let Some(next) = script.calibrations.pop_front() {
            script.last_calibration = next;
        }
        Ok(script.last_calibration)
    }

    async fn read_temperature(&mut self) -> SensorResult<f64> {
        self.record(SensorRead::Temperature)?;
        Ok(20.0)
    }

    async fn read_euler(&mut self) -> SensorResult<EulerAngles> {
        self.record(SensorRead::Euler)?;
        Ok(EulerAngles { heading: 3.0, roll: 0.1, pitch: -0.2 })
    }

    async fn read_linear_acceleration(&mut self) -> SensorResult<Vector3> {
        self.record(SensorRead::LinearAcceleration)?;
        Ok(Vector3::new(0.5, -0.25, 9.0))
    }

    async fn read_gyroscope(&mut self) -> SensorResult<Vector3> {
        self.record(SensorRead::Gyroscope)?;
        Ok(Vector3::new(0.01, 0.02, 0.03))
    }

    fn name(&self) -> &str {
        SCRIPTED_DEVICE_NAME
    }
}
