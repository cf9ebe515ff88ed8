use std::fmt;
use tracing::{info, warn};

use crate::errors::SensorResult;
use crate::sensors::{CalibrationStatus, ImuDevice};

/// Raw code an axis reports once it is fully calibrated
pub const FULLY_CALIBRATED: u8 = 0x03;

// Bits of `CalibrationReport::needs_calibration`
pub const SYSTEM_UNCALIBRATED: u8 = 0x01;
pub const GYRO_UNCALIBRATED: u8 = 0x02;
pub const ACCEL_UNCALIBRATED: u8 = 0x04;
pub const MAG_UNCALIBRATED: u8 = 0x08;

pub const SYSTEM_HINT: &str = "System needs calibration.";
pub const GYRO_HINT: &str = "Gyro needs calibrating, keep sensor still for a few seconds.";
pub const ACCEL_HINT: &str =
    "Accelerometer needs calibrating, slowly move between 6 stable positions and hold for > 2s in each.";
pub const MAG_HINT: &str = "Magnetometer needs calibrating, perform figure of 8 movements.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCalibration {
    Calibrated,
    /// Carries the remediation hint for the axis
    NeedsCalibration(&'static str),
}

impl AxisCalibration {
    fn classify(code: u8, hint: &'static str) -> Self {
        if code == FULLY_CALIBRATED {
            AxisCalibration::Calibrated
        } else {
            AxisCalibration::NeedsCalibration(hint)
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, AxisCalibration::Calibrated)
    }
}

impl fmt::Display for AxisCalibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisCalibration::Calibrated => f.write_str("Ok"),
            AxisCalibration::NeedsCalibration(hint) => f.write_str(hint),
        }
    }
}

/// Interpreted calibration status of all four axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationReport {
    pub status: CalibrationStatus,
    pub system: AxisCalibration,
    pub gyro: AxisCalibration,
    pub accel: AxisCalibration,
    pub mag: AxisCalibration,
    /// One bit per uncalibrated axis, zero when fully calibrated
    pub needs_calibration: u8,
}

impl CalibrationReport {
    pub fn from_status(status: CalibrationStatus) -> Self {
        let system = AxisCalibration::classify(status.system, SYSTEM_HINT);
        let gyro = AxisCalibration::classify(status.gyroscope, GYRO_HINT);
        let accel = AxisCalibration::classify(status.accelerometer, ACCEL_HINT);
        let mag = AxisCalibration::classify(status.magnetometer, MAG_HINT);

        let mut needs_calibration = 0;
        for (axis, bit) in [
            (system, SYSTEM_UNCALIBRATED),
            (gyro, GYRO_UNCALIBRATED),
            (accel, ACCEL_UNCALIBRATED),
            (mag, MAG_UNCALIBRATED),
        ] {
            if !axis.is_calibrated() {
                needs_calibration |= bit;
            }
        }

        Self { status, system, gyro, accel, mag, needs_calibration }
    }

    pub fn is_calibrated(&self) -> bool {
        self.needs_calibration == 0
    }
}

impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "system: {} gyro: {} accel: {} mag: {} (mask {:#04x})",
            self.system, self.gyro, self.accel, self.mag, self.needs_calibration
        )
    }
}

/// What the tracker wants logged after observing a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationNotice {
    /// All axes calibrated, emitted once per session
    Calibrated,
    /// The set of uncalibrated axes changed
    Required(u8),
}

/// Session calibration state owned by the poller. Reset only by building a new one.
#[derive(Debug, Default)]
pub struct CalibrationTracker {
    calibrated: bool,
    latest: Option<CalibrationReport>,
}

impl CalibrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn latest(&self) -> Option<&CalibrationReport> {
        self.latest.as_ref()
    }

    /// Record a fresh report and decide whether it deserves a log line
    pub fn observe(&mut self, report: CalibrationReport) -> Option<CalibrationNotice> {
        let previous_mask = self.latest.map(|r| r.needs_calibration);
        self.latest = Some(report);

        if report.is_calibrated() {
            self.calibrated = true;
            return Some(CalibrationNotice::Calibrated);
        }

        if previous_mask == Some(report.needs_calibration) {
            None
        } else {
            Some(CalibrationNotice::Required(report.needs_calibration))
        }
    }

    /// Current report, reading the device only until the session is calibrated
    pub async fn check(&mut self, device: &mut dyn ImuDevice) -> SensorResult<CalibrationReport> {
        if let (true, Some(cached)) = (self.calibrated, self.latest) {
            return Ok(cached);
        }

        let status = device.read_calibration_status().await?;
        let report = CalibrationReport::from_status(status);

        match self.observe(report) {
            Some(CalibrationNotice::Calibrated) => {
                info!("[calibration] {} calibration ok", device.name());
            }
            Some(CalibrationNotice::Required(_)) => {
                warn!("[calibration] {} calibration may be required: {}", device.name(), report);
            }
            None => {}
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::scripted::ScriptedImu;
    use crate::sensors::SensorRead;

    fn status(system: u8, gyroscope: u8, accelerometer: u8, magnetometer: u8) -> CalibrationStatus {
        CalibrationStatus { system, gyroscope, accelerometer, magnetometer }
    }

    #[test]
    fn test_fully_calibrated_has_empty_mask() {
        let report = CalibrationReport::from_status(status(3, 3, 3, 3));
        assert!(report.is_calibrated());
        assert_eq!(report.needs_calibration, 0);
        assert_eq!(report.system, AxisCalibration::Calibrated);
        assert_eq!(report.mag.to_string(), "Ok");
    }

    #[test]
    fn test_each_axis_sets_its_own_bit_and_hint() {
        let cases = [
            (status(2, 3, 3, 3), SYSTEM_UNCALIBRATED, SYSTEM_HINT),
            (status(3, 0, 3, 3), GYRO_UNCALIBRATED, GYRO_HINT),
            (status(3, 3, 1, 3), ACCEL_UNCALIBRATED, ACCEL_HINT),
            (status(3, 3, 3, 2), MAG_UNCALIBRATED, MAG_HINT),
        ];

        for (raw, bit, hint) in cases {
            let report = CalibrationReport::from_status(raw);
            assert_eq!(report.needs_calibration, bit);
            let axes = [report.system, report.gyro, report.accel, report.mag];
            let flagged: Vec<_> = axes.iter().filter(|a| !a.is_calibrated()).collect();
            assert_eq!(flagged, vec![&AxisCalibration::NeedsCalibration(hint)]);
        }
    }

    #[test]
    fn test_nothing_calibrated_sets_all_bits() {
        let report = CalibrationReport::from_status(status(0, 0, 0, 0));
        assert_eq!(report.needs_calibration, 0x0F);
        assert_eq!(report.gyro.to_string(), GYRO_HINT);
    }

    #[test]
    fn test_identical_masks_are_not_repeated() {
        let mut tracker = CalibrationTracker::new();
        let partial = CalibrationReport::from_status(status(0, 3, 3, 1));

        assert_eq!(tracker.observe(partial), Some(CalibrationNotice::Required(0x09)));
        assert_eq!(tracker.observe(partial), None);
        // Different raw codes, same set of uncalibrated axes
        assert_eq!(tracker.observe(CalibrationReport::from_status(status(1, 3, 3, 2))), None);
    }

    #[test]
    fn test_changed_mask_produces_one_notice() {
        let mut tracker = CalibrationTracker::new();
        tracker.observe(CalibrationReport::from_status(status(0, 0, 3, 3)));

        let changed = CalibrationReport::from_status(status(0, 3, 3, 3));
        assert_eq!(tracker.observe(changed), Some(CalibrationNotice::Required(SYSTEM_UNCALIBRATED)));
        assert_eq!(tracker.observe(changed), None);
        assert!(!tracker.is_calibrated());
    }

    #[test]
    fn test_full_calibration_marks_session() {
        let mut tracker = CalibrationTracker::new();
        tracker.observe(CalibrationReport::from_status(status(0, 3, 3, 3)));
        let notice = tracker.observe(CalibrationReport::from_status(status(3, 3, 3, 3)));
        assert_eq!(notice, Some(CalibrationNotice::Calibrated));
        assert!(tracker.is_calibrated());
    }

    #[tokio::test]
    async fn test_check_stops_reading_once_calibrated() {
        let mut imu = ScriptedImu::default();
        imu.push_calibration(status(3, 0, 3, 3));
        imu.push_calibration(status(3, 3, 3, 3));
        let mut tracker = CalibrationTracker::new();

        let first = tracker.check(&mut imu).await.unwrap();
        assert_eq!(first.needs_calibration, GYRO_UNCALIBRATED);
        let second = tracker.check(&mut imu).await.unwrap();
        assert!(second.is_calibrated());

        for _ in 0..3 {
            assert_eq!(tracker.check(&mut imu).await.unwrap(), second);
        }
        assert_eq!(imu.calls(SensorRead::Calibration), 2);
    }

    #[tokio::test]
    async fn test_check_keeps_reading_while_uncalibrated() {
        let mut imu = ScriptedImu::default();
        imu.push_calibration(status(1, 1, 1, 1));
        let mut tracker = CalibrationTracker::new();

        for _ in 0..3 {
            tracker.check(&mut imu).await.unwrap();
        }
        assert_eq!(imu.calls(SensorRead::Calibration), 3);
        assert_eq!(tracker.latest().map(|r| r.needs_calibration), Some(0x0F));
    }

    #[tokio::test]
    async fn test_check_propagates_read_error() {
        let mut imu = ScriptedImu::default();
        imu.fail_on(Some(SensorRead::Calibration));
        let mut tracker = CalibrationTracker::new();

        assert!(tracker.check(&mut imu).await.is_err());
        assert!(tracker.latest().is_none());
    }
}
