use serde_json::{json, Value};

use crate::config::plugin_config::DEFAULT_MOTION_PERIOD_MS;

pub const PLUGIN_ID: &str = "sk-imu";
pub const PLUGIN_NAME: &str = "IMU Source";
pub const PLUGIN_DESCRIPTION: &str = "Plugin that reads IMU data";

const SCHEMA_DESCRIPTION: &str = "This plugin reads data from an I2C attached BNO055 device. \
The device should be set up so that the BNO055 on the chip is towards the bow.";

/// JSON schema the host uses to render the plugin's settings form
pub fn schema() -> Value {
    json!({
        "title": PLUGIN_NAME,
        "description": SCHEMA_DESCRIPTION,
        "type": "object",
        "properties": {
            "motionPeriod": {
                "title": "Period of motion readings in ms",
                "type": "integer",
                "default": DEFAULT_MOTION_PERIOD_MS
            }
        }
    })
}

/// Display hints for the settings form
pub fn ui_schema() -> Value {
    json!({
        "ui:order": ["motionPeriod"]
    })
}
