use super::{CalibrationStatus, EulerAngles, ImuDevice, Vector3};
use crate::errors::SensorResult;
use async_trait::async_trait;

pub const FAKE_DEVICE_NAME: &str = "BNO055-fake";

const FULLY_CALIBRATED: CalibrationStatus = CalibrationStatus {
    system: 3,
    gyroscope: 3,
    accelerometer: 3,
    magnetometer: 3,
};

/// Stand-in for a BNO055 on hosts without an I2C adapter. Always returns the same readings.
pub struct FakeImu {
    calibration: CalibrationStatus,
    temperature: f64,
    euler: EulerAngles,
    linear_acceleration: Vector3,
    gyroscope: Vector3,
}

impl FakeImu {
    pub fn new() -> Self {
        Self {
            calibration: FULLY_CALIBRATED,
            temperature: 20.0,
            euler: EulerAngles { heading: 1.5708, roll: 0.0349, pitch: -0.0175 },
            linear_acceleration: Vector3::new(0.01, -0.02, 0.03),
            gyroscope: Vector3::new(0.001, -0.002, 0.0035),
        }
    }

    pub fn with_calibration(mut self, calibration: CalibrationStatus) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = celsius;
        self
    }
}

impl Default for FakeImu {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImuDevice for FakeImu {
    async fn begin_continuous_fusion(&mut self) -> SensorResult<()> {
        Ok(())
    }

    async fn read_calibration_status(&mut self) -> SensorResult<CalibrationStatus> {
        Ok(self.calibration)
    }

    async fn read_temperature(&mut self) -> SensorResult<f64> {
        Ok(self.temperature)
    }

    async fn read_euler(&mut self) -> SensorResult<EulerAngles> {
        Ok(self.euler)
    }

    async fn read_linear_acceleration(&mut self) -> SensorResult<Vector3> {
        Ok(self.linear_acceleration)
    }

    async fn read_gyroscope(&mut self) -> SensorResult<Vector3> {
        Ok(self.gyroscope)
    }

    fn name(&self) -> &str {
        FAKE_DEVICE_NAME
    }
}
