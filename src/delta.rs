use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::sensors::{EulerAngles, Vector3};

pub const PATH_INSIDE_TEMPERATURE: &str = "environment.inside.temperature";
pub const PATH_RATE_OF_TURN: &str = "navigation.rateOfTurn";
pub const PATH_GYRO_ROLL: &str = "navigation.gyro.roll";
pub const PATH_GYRO_PITCH: &str = "navigation.gyro.pitch";
pub const PATH_GYRO_YAW: &str = "navigation.gyro.yaw";
pub const PATH_ACCEL_X: &str = "navigation.accel.x";
pub const PATH_ACCEL_Y: &str = "navigation.accel.y";
pub const PATH_ACCEL_Z: &str = "navigation.accel.z";
pub const PATH_HEADING_MAGNETIC: &str = "navigation.headingMagnetic";
pub const PATH_ATTITUDE_ROLL: &str = "navigation.attitude.roll";
pub const PATH_ATTITUDE_PITCH: &str = "navigation.attitude.pitch";

const CELSIUS_TO_KELVIN: f64 = 273.15;

pub fn to_kelvin(celsius: f64) -> f64 {
    celsius + CELSIUS_TO_KELVIN
}

/// One poll cycle's worth of readings, already in output units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Kelvin
    pub temperature: f64,
    pub euler: EulerAngles,
    pub gyro: Vector3,
    pub linear_acceleration: Vector3,
}

impl Measurement {
    pub fn new(celsius: f64, euler: EulerAngles, gyro: Vector3, linear_acceleration: Vector3) -> Self {
        Self {
            temperature: to_kelvin(celsius),
            euler,
            gyro,
            linear_acceleration,
        }
    }

    /// Flatten into Signal K path/value pairs. Gyro z feeds both rate of turn and yaw.
    pub fn values(&self) -> Vec<PathValue> {
        vec![
            PathValue::new(PATH_INSIDE_TEMPERATURE, self.temperature),
            PathValue::new(PATH_RATE_OF_TURN, self.gyro.z),
            PathValue::new(PATH_GYRO_ROLL, self.gyro.x),
            PathValue::new(PATH_GYRO_PITCH, self.gyro.y),
            PathValue::new(PATH_GYRO_YAW, self.gyro.z),
            PathValue::new(PATH_ACCEL_X, self.linear_acceleration.x),
            PathValue::new(PATH_ACCEL_Y, self.linear_acceleration.y),
            PathValue::new(PATH_ACCEL_Z, self.linear_acceleration.z),
            PathValue::new(PATH_HEADING_MAGNETIC, self.euler.heading),
            PathValue::new(PATH_ATTITUDE_ROLL, self.euler.roll),
            PathValue::new(PATH_ATTITUDE_PITCH, self.euler.pitch),
        ]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PathValue {
    pub path: String,
    pub value: f64,
}

impl PathValue {
    pub fn new(path: &str, value: f64) -> Self {
        Self { path: path.to_string(), value }
    }
}

/// Origin of an update
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Source {
    /// Plugin identifier
    pub label: String,
    /// Device that produced the values
    pub src: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Update {
    pub source: Source,
    /// ISO 8601 UTC, millisecond precision
    pub timestamp: String,
    pub values: Vec<PathValue>,
}

/// Signal K delta message
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Delta {
    /// Vessel the update applies to, e.g. `vessels.urn:mrn:imo:mmsi:230099999`
    pub context: String,
    pub updates: Vec<Update>,
}

impl Delta {
    /// Build a single-update delta stamped with the current wall-clock time
    pub fn from_measurement(self_id: &str, plugin_id: &str, device: &str, measurement: &Measurement) -> Self {
        Self {
            context: format!("vessels.{}", self_id),
            updates: vec![Update {
                source: Source {
                    label: plugin_id.to_string(),
                    src: device.to_string(),
                },
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                values: measurement.values(),
            }],
        }
    }

    /// Look up a value by path across all updates
    pub fn value(&self, path: &str) -> Option<f64> {
        self.updates
            .iter()
            .flat_map(|u| u.values.iter())
            .find(|v| v.path == path)
            .map(|v| v.value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
