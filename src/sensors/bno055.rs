use super::{CalibrationStatus, EulerAngles, ImuDevice, Vector3};
use crate::bus::i2c::I2CBus;
use crate::errors::{SensorError, SensorResult};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};

pub const DEFAULT_ADDRESS: u8 = 0x28;
pub const DEVICE_NAME: &str = "BNO055";

// Register addresses for the BNO055 (page 0)
const CHIP_ID: u8 = 0x00;
const PAGE_ID: u8 = 0x07;
const GYR_DATA_X_LSB: u8 = 0x14;
const EUL_HEADING_LSB: u8 = 0x1A;
const LIA_DATA_X_LSB: u8 = 0x28;
const TEMP: u8 = 0x34;
const CALIB_STAT: u8 = 0x35;
const UNIT_SEL: u8 = 0x3B;
const OPR_MODE: u8 = 0x3D;
const PWR_MODE: u8 = 0x3E;
const SYS_TRIGGER: u8 = 0x3F;

const BNO055_CHIP_ID: u8 = 0xA0;

const OPR_MODE_CONFIG: u8 = 0x00;
const OPR_MODE_NDOF: u8 = 0x0C;
const PWR_MODE_NORMAL: u8 = 0x00;

// Bit 1: gyro rad/s, bit 2: euler radians, bit 4: temperature Celsius (0),
// bit 0: acceleration m/s^2 (0), bit 7: Windows orientation (0)
const UNIT_SEL_RADIANS: u8 = 0b0000_0110;

// Scale factors with UNIT_SEL_RADIANS
const EULER_LSB_PER_RAD: f64 = 900.0;
const GYRO_LSB_PER_RAD_S: f64 = 900.0;
const ACCEL_LSB_PER_MS2: f64 = 100.0;

// Datasheet table 3-6, rounded up
const CONFIG_TO_FUSION_DELAY: Duration = Duration::from_millis(10);
const ANY_TO_CONFIG_DELAY: Duration = Duration::from_millis(25);

pub struct Bno055 {
    bus: I2CBus,
    address: u8,
}

impl Bno055 {
    pub fn new(bus: I2CBus, address: u8) -> Self {
        Self { bus, address }
    }

    async fn write(&mut self, reg: u8, value: u8, what: &str) -> SensorResult<()> {
        self.bus.write_byte(self.address, reg, value).await
            .map_err(|e| SensorError::InitError {
                sensor: DEVICE_NAME.to_string(),
                reason: format!("Failed to {}: {}", what, e),
            })
    }

    async fn read_block(&mut self, reg: u8, buf: &mut [u8], what: &str) -> SensorResult<()> {
        self.bus.read_bytes(self.address, reg, buf).await
            .map_err(|e| SensorError::ReadError {
                sensor: DEVICE_NAME.to_string(),
                reason: format!("Failed to read {} on {}: {}", what, self.bus.path(), e),
            })
    }

    async fn read_triple(&mut self, reg: u8, what: &str) -> SensorResult<[i16; 3]> {
        let mut buf = [0u8; 6];
        self.read_block(reg, &mut buf, what).await?;
        Ok(decode_triple(&buf))
    }
}

/// Three little-endian i16 values, as laid out by every BNO055 vector register block
fn decode_triple(buf: &[u8; 6]) -> [i16; 3] {
    [
        i16::from_le_bytes([buf[0], buf[1]]),
        i16::from_le_bytes([buf[2], buf[3]]),
        i16::from_le_bytes([buf[4], buf[5]]),
    ]
}

/// CALIB_STAT packs sys/gyr/acc/mag as 2-bit fields, most significant first
fn decode_calibration(byte: u8) -> CalibrationStatus {
    CalibrationStatus {
        system: (byte >> 6) & 0x03,
        gyroscope: (byte >> 4) & 0x03,
        accelerometer: (byte >> 2) & 0x03,
        magnetometer: byte & 0x03,
    }
}

fn scale(raw: [i16; 3], lsb_per_unit: f64) -> [f64; 3] {
    [
        raw[0] as f64 / lsb_per_unit,
        raw[1] as f64 / lsb_per_unit,
        raw[2] as f64 / lsb_per_unit,
    ]
}

#[async_trait]
impl ImuDevice for Bno055 {
    async fn begin_continuous_fusion(&mut self) -> SensorResult<()> {
        // Verify device identity
        let mut chip_id = [0u8; 1];
        self.bus.read_bytes(self.address, CHIP_ID, &mut chip_id).await?;
        if chip_id[0] != BNO055_CHIP_ID {
            return Err(SensorError::WrongChipId {
                sensor: DEVICE_NAME.to_string(),
                expected: BNO055_CHIP_ID,
                actual: chip_id[0],
            });
        }

        // Register writes other than OPR_MODE are only honoured in config mode
        self.write(OPR_MODE, OPR_MODE_CONFIG, "enter config mode").await?;
        sleep(ANY_TO_CONFIG_DELAY).await;

        self.write(PAGE_ID, 0x00, "select page 0").await?;
        self.write(PWR_MODE, PWR_MODE_NORMAL, "set normal power mode").await?;
        self.write(UNIT_SEL, UNIT_SEL_RADIANS, "select output units").await?;
        // Internal oscillator, no self test
        self.write(SYS_TRIGGER, 0x00, "clear system trigger").await?;

        self.write(OPR_MODE, OPR_MODE_NDOF, "enter NDOF fusion mode").await?;
        sleep(CONFIG_TO_FUSION_DELAY).await;

        Ok(())
    }

    async fn read_calibration_status(&mut self) -> SensorResult<CalibrationStatus> {
        let mut buf = [0u8; 1];
        self.read_block(CALIB_STAT, &mut buf, "calibration status").await?;
        Ok(decode_calibration(buf[0]))
    }

    async fn read_temperature(&mut self) -> SensorResult<f64> {
        let mut buf = [0u8; 1];
        self.read_block(TEMP, &mut buf, "temperature").await?;
        // Two's complement, 1 degree C per LSB
        Ok(buf[0] as i8 as f64)
    }

    async fn read_euler(&mut self) -> SensorResult<EulerAngles> {
        let raw = self.read_triple(EUL_HEADING_LSB, "euler angles").await?;
        let [heading, roll, pitch] = scale(raw, EULER_LSB_PER_RAD);
        Ok(EulerAngles { heading, roll, pitch })
    }

    async fn read_linear_acceleration(&mut self) -> SensorResult<Vector3> {
        let raw = self.read_triple(LIA_DATA_X_LSB, "linear acceleration").await?;
        let [x, y, z] = scale(raw, ACCEL_LSB_PER_MS2);
        Ok(Vector3::new(x, y, z))
    }

    async fn read_gyroscope(&mut self) -> SensorResult<Vector3> {
        let raw = self.read_triple(GYR_DATA_X_LSB, "gyroscope").await?;
        let [x, y, z] = scale(raw, GYRO_LSB_PER_RAD_S);
        Ok(Vector3::new(x, y, z))
    }

    fn name(&self) -> &str {
        DEVICE_NAME
    }
}
