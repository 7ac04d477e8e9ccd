//! Servo calibration
//!
//! Maps raw servo ticks to joint angles and back. Each servo is calibrated
//! with three captured positions: `zero` (0°), `min` (-90°) and `max`
//! (+90°). The two halves are mapped linearly and independently, so a servo
//! whose zero is off-centre still reaches ±90° at its end stops. A servo
//! mounted backwards has `min > max` and its angles are mirrored.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use thiserror::Error;

/// Degrees covered by each half of the calibrated range.
const HALF_RANGE_DEGREES: f32 = 90.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("unknown servo id {0}")]
    UnknownServo(u8),

    #[error("servo {0} has min == max")]
    DegenerateRange(u8),

    #[error("invalid calibration point `{0}`, expected zero, min or max")]
    InvalidPoint(String),

    #[error("no calibration in progress")]
    NotInProgress,

    #[error("servo {0} is missing calibration points")]
    Incomplete(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPoint {
    Zero,
    Min,
    Max,
}

impl FromStr for CalibrationPoint {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(CalibrationPoint::Zero),
            "min" => Ok(CalibrationPoint::Min),
            "max" => Ok(CalibrationPoint::Max),
            other => Err(CalibrationError::InvalidPoint(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    zero: i32,
    min: i32,
    max: i32,
}

impl ServoCalibration {
    pub fn new(id: u8, zero: i32, min: i32, max: i32) -> Result<Self, CalibrationError> {
        if min == max {
            return Err(CalibrationError::DegenerateRange(id));
        }
        Ok(Self { zero, min, max })
    }

    pub fn zero(&self) -> i32 {
        self.zero
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_reversed(&self) -> bool {
        self.min > self.max
    }

    /// Ticks below and above zero: `(low_end, high_end)`.
    fn ends(&self) -> (i32, i32) {
        if self.is_reversed() {
            (self.max, self.min)
        } else {
            (self.min, self.max)
        }
    }

    pub fn position_to_degrees(&self, position: i32) -> f32 {
        if position == self.zero {
            return 0.0;
        }

        let (low, high) = self.ends();
        let sign = if self.is_reversed() { -1.0 } else { 1.0 };

        if position > self.zero {
            let span = (high - self.zero).abs();
            if span == 0 {
                return 0.0;
            }
            sign * HALF_RANGE_DEGREES * (position - self.zero).abs() as f32 / span as f32
        } else {
            let span = (self.zero - low).abs();
            if span == 0 {
                return 0.0;
            }
            -sign * HALF_RANGE_DEGREES * (self.zero - position).abs() as f32 / span as f32
        }
    }

    /// Inverse of [`position_to_degrees`](Self::position_to_degrees),
    /// truncated toward zero. Angles beyond ±90° extrapolate linearly.
    pub fn degrees_to_position(&self, degrees: f32) -> i32 {
        if degrees == 0.0 {
            return self.zero;
        }

        let (low, high) = self.ends();
        let working = if self.is_reversed() { -degrees } else { degrees };

        if working > 0.0 {
            let span = (high - self.zero).abs() as f32;
            (self.zero as f32 + working / HALF_RANGE_DEGREES * span) as i32
        } else {
            let span = (self.zero - low).abs() as f32;
            (self.zero as f32 - working.abs() / HALF_RANGE_DEGREES * span) as i32
        }
    }

    pub fn position_to_radians(&self, position: i32) -> f32 {
        self.position_to_degrees(position).to_radians()
    }

    pub fn radians_to_position(&self, radians: f32) -> i32 {
        self.degrees_to_position(radians.to_degrees())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DraftEntry {
    zero: Option<i32>,
    min: Option<i32>,
    max: Option<i32>,
}

/// Calibrations for a fixed set of servos, with a draft that can be filled
/// point by point and then committed or thrown away.
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
    servo_ids: BTreeSet<u8>,
    committed: BTreeMap<u8, ServoCalibration>,
    draft: Option<BTreeMap<u8, DraftEntry>>,
}

impl CalibrationTable {
    pub fn new(servo_ids: impl IntoIterator<Item = u8>) -> Self {
        Self {
            servo_ids: servo_ids.into_iter().collect(),
            committed: BTreeMap::new(),
            draft: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn in_progress(&self) -> bool {
        self.draft.is_some()
    }

    pub fn get(&self, id: u8) -> Result<&ServoCalibration, CalibrationError> {
        self.committed.get(&id).ok_or(CalibrationError::UnknownServo(id))
    }

    pub fn insert(&mut self, id: u8, calibration: ServoCalibration) -> Result<(), CalibrationError> {
        self.check_known(id)?;
        self.committed.insert(id, calibration);
        Ok(())
    }

    /// Starts a new draft. A draft already in progress is kept.
    pub fn begin(&mut self) {
        if self.draft.is_some() {
            log::debug!("calibration already in progress");
            return;
        }
        self.draft = Some(BTreeMap::new());
    }

    pub fn set_point(&mut self, id: u8, point: CalibrationPoint, position: i32) -> Result<(), CalibrationError> {
        self.check_known(id)?;
        let draft = self.draft.as_mut().ok_or(CalibrationError::NotInProgress)?;
        let entry = draft.entry(id).or_default();
        match point {
            CalibrationPoint::Zero => entry.zero = Some(position),
            CalibrationPoint::Min => entry.min = Some(position),
            CalibrationPoint::Max => entry.max = Some(position),
        }
        log::debug!("servo {}: {:?} = {}", id, point, position);
        Ok(())
    }

    /// Validates the draft and replaces the committed entries it covers.
    /// Returns how many servos were committed; an empty draft commits
    /// nothing and just ends the session.
    pub fn commit(&mut self) -> Result<usize, CalibrationError> {
        let draft = self.draft.as_ref().ok_or(CalibrationError::NotInProgress)?;

        let mut validated = Vec::with_capacity(draft.len());
        for (&id, entry) in draft {
            let (Some(zero), Some(min), Some(max)) = (entry.zero, entry.min, entry.max) else {
                return Err(CalibrationError::Incomplete(id));
            };
            validated.push((id, ServoCalibration::new(id, zero, min, max)?));
        }

        self.draft = None;
        let count = validated.len();
        self.committed.extend(validated);
        Ok(count)
    }

    pub fn cancel(&mut self) -> Result<(), CalibrationError> {
        self.draft
            .take()
            .map(|_| ())
            .ok_or(CalibrationError::NotInProgress)
    }

    pub fn position_to_joint_value(&self, id: u8, position: i32) -> Result<f32, CalibrationError> {
        Ok(self.get(id)?.position_to_radians(position))
    }

    pub fn joint_value_to_position(&self, id: u8, radians: f32) -> Result<i32, CalibrationError> {
        Ok(self.get(id)?.radians_to_position(radians))
    }

    fn check_known(&self, id: u8) -> Result<(), CalibrationError> {
        if self.servo_ids.contains(&id) {
            Ok(())
        } else {
            Err(CalibrationError::UnknownServo(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn normal() -> ServoCalibration {
        ServoCalibration::new(1, 2048, 1024, 3072).unwrap()
    }

    fn reversed() -> ServoCalibration {
        ServoCalibration::new(2, 2048, 3072, 1024).unwrap()
    }

    #[test]
    fn normal_servo_maps_ends_to_ninety() {
        let cal = normal();
        assert_eq!(cal.position_to_degrees(2048), 0.0);
        assert_abs_diff_eq!(cal.position_to_degrees(3072), 90.0);
        assert_abs_diff_eq!(cal.position_to_degrees(1024), -90.0);
        assert_abs_diff_eq!(cal.position_to_degrees(2560), 45.0);
    }

    #[test]
    fn reversed_servo_mirrors() {
        let cal = reversed();
        assert!(cal.is_reversed());
        assert_abs_diff_eq!(cal.position_to_degrees(3072), -90.0);
        assert_abs_diff_eq!(cal.position_to_degrees(1024), 90.0);
        assert_eq!(cal.degrees_to_position(90.0), 1024);
        assert_eq!(cal.degrees_to_position(-45.0), 2560);
    }

    #[test]
    fn asymmetric_halves_are_independent() {
        let cal = ServoCalibration::new(3, 2000, 1000, 2500).unwrap();
        assert_abs_diff_eq!(cal.position_to_degrees(2250), 45.0);
        assert_abs_diff_eq!(cal.position_to_degrees(1500), -45.0);
        assert_eq!(cal.degrees_to_position(45.0), 2250);
        assert_eq!(cal.degrees_to_position(-45.0), 1500);
    }

    #[test]
    fn zero_width_half_reads_as_zero() {
        let cal = ServoCalibration::new(4, 3000, 1000, 3000).unwrap();
        assert_eq!(cal.position_to_degrees(3500), 0.0);
    }

    #[test]
    fn radians_round_trip_through_ticks() {
        let cal = normal();
        let pos = cal.radians_to_position(std::f32::consts::FRAC_PI_4);
        assert!((pos - 2560).abs() <= 1, "got {pos}");
        assert_abs_diff_eq!(cal.position_to_radians(pos), std::f32::consts::FRAC_PI_4, epsilon = 2e-3);
    }

    #[test]
    fn degenerate_range_is_rejected() {
        assert_eq!(
            ServoCalibration::new(9, 10, 5, 5),
            Err(CalibrationError::DegenerateRange(9))
        );
    }

    #[test]
    fn point_names_parse() {
        assert_eq!("min".parse::<CalibrationPoint>(), Ok(CalibrationPoint::Min));
        assert!(matches!(
            "middle".parse::<CalibrationPoint>(),
            Err(CalibrationError::InvalidPoint(_))
        ));
    }

    #[test]
    fn draft_workflow() {
        let mut table = CalibrationTable::new([1, 2]);
        assert_eq!(
            table.set_point(1, CalibrationPoint::Zero, 2048),
            Err(CalibrationError::NotInProgress)
        );

        table.begin();
        table.set_point(1, CalibrationPoint::Zero, 2048).unwrap();
        table.set_point(1, CalibrationPoint::Min, 1024).unwrap();
        assert_eq!(table.commit(), Err(CalibrationError::Incomplete(1)));

        table.set_point(1, CalibrationPoint::Max, 3072).unwrap();
        assert_eq!(
            table.set_point(7, CalibrationPoint::Max, 1),
            Err(CalibrationError::UnknownServo(7))
        );
        assert_eq!(table.commit(), Ok(1));
        assert!(table.is_calibrated());
        assert!(!table.in_progress());
        assert_abs_diff_eq!(table.position_to_joint_value(1, 3072).unwrap(), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
        assert_eq!(table.get(2), Err(CalibrationError::UnknownServo(2)));
    }

    #[test]
    fn cancel_keeps_previous_calibration() {
        let mut table = CalibrationTable::new([1]);
        table.insert(1, normal()).unwrap();

        table.begin();
        table.set_point(1, CalibrationPoint::Zero, 100).unwrap();
        table.cancel().unwrap();

        assert_eq!(table.get(1), Ok(&normal()));
        assert_eq!(table.cancel(), Err(CalibrationError::NotInProgress));
    }
}
