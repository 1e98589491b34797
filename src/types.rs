//! Data containers for health queries.
//!
//! Two groups live here: the raw records a [`crate::HealthDataSource`] hands
//! back (`Raw*`), and the display records produced by the aggregator and the
//! flattener. Display records are immutable values built fresh per query.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Query Windows
// ============================================================================

/// A local-time window used to scope a query.
///
/// `start` is inclusive. `end` is the last covered second, so a whole day is
/// `00:00:00..=23:59:59` rather than ending at the next midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Health data types this crate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum HealthDataType {
    Steps,
    Exercise,
}

impl HealthDataType {
    /// Upper-case name used as the key in permission status maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthDataType::Steps => "STEPS",
            HealthDataType::Exercise => "EXERCISE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum AccessType {
    Read,
}

/// A single (data type, access) grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Permission {
    pub data_type: HealthDataType,
    pub access: AccessType,
}

impl Permission {
    pub const fn read(data_type: HealthDataType) -> Self {
        Self {
            data_type,
            access: AccessType::Read,
        }
    }
}

// ============================================================================
// Raw Source Records
// ============================================================================

/// Exercise type as reported by the source: numeric code plus name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseType {
    pub code: i32,
    pub name: String,
}

/// One entry of a session's exercise log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExerciseLog {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Heart rate in bpm, if the device measured one at this instant
    #[serde(default)]
    pub heart_rate: Option<f32>,
}

/// One logged exercise activity inside a data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSession {
    pub exercise_type: ExerciseType,
    /// Epoch milliseconds
    pub start_time: i64,
    /// Epoch milliseconds
    pub end_time: i64,
    /// Duration in milliseconds
    pub duration: i64,
    pub calories: f32,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f32>,
    #[serde(default)]
    pub mean_heart_rate: Option<f32>,
    #[serde(default)]
    pub max_heart_rate: Option<f32>,
    /// Speed in m/s
    #[serde(default)]
    pub mean_speed: Option<f32>,
    #[serde(default)]
    pub max_speed: Option<f32>,
    #[serde(default)]
    pub log: Option<Vec<RawExerciseLog>>,
}

/// One record returned by an exercise query. A multi-sport entry bundles
/// several sessions under a single uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataPoint {
    pub uid: String,
    #[serde(default)]
    pub sessions: Vec<RawSession>,
}

// ============================================================================
// Display Records
// ============================================================================

/// Total steps for one calendar day. Never built with a zero count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStepRecord {
    pub date: NaiveDate,
    pub step_count: u64,
}

/// Total steps for one hour of a day (0-23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct HourlyStepRecord {
    pub hour: u32,
    pub step_count: u64,
}

/// Heart rate measured during an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct HeartRateSample {
    /// Epoch milliseconds
    pub timestamp_millis: i64,
    pub heart_rate_bpm: i32,
}

/// A flattened exercise session ready for display.
///
/// Optional source metrics are stored as `0.0` when absent, so zero means
/// either "measured zero" or "not measured". Use the `has_*` helpers to
/// decide whether to show a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ExerciseRecord {
    /// `{data point uid}_{session index}`
    pub unique_id: String,
    pub exercise_type_code: i32,
    pub exercise_type_name: String,
    /// Epoch milliseconds
    pub start_time: i64,
    /// Epoch milliseconds
    pub end_time: i64,
    pub duration_millis: i64,
    pub calorie_count: f32,
    pub distance_meters: f32,
    pub mean_heart_rate: f32,
    pub max_heart_rate: f32,
    pub mean_speed: f32,
    pub max_speed: f32,
    /// `None` when the session had no log or no log entry carried a heart rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_samples: Option<Vec<HeartRateSample>>,
}

impl ExerciseRecord {
    /// Whole minutes, truncated.
    pub fn duration_minutes(&self) -> i64 {
        duration_minutes(self.duration_millis)
    }

    pub fn distance_km(&self) -> f32 {
        distance_km(self.distance_meters)
    }

    pub fn has_distance(&self) -> bool {
        self.distance_meters > 0.0
    }

    pub fn has_heart_rate(&self) -> bool {
        self.mean_heart_rate > 0.0 || self.max_heart_rate > 0.0
    }

    pub fn has_speed(&self) -> bool {
        self.mean_speed > 0.0 || self.max_speed > 0.0
    }
}

/// Convert a duration in milliseconds to whole minutes (truncating).
pub fn duration_minutes(duration_millis: i64) -> i64 {
    duration_millis / 60_000
}

/// Convert meters to kilometers.
pub fn distance_km(distance_meters: f32) -> f32 {
    distance_meters / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance_meters: f32, duration_millis: i64) -> ExerciseRecord {
        ExerciseRecord {
            unique_id: "abc_0".to_string(),
            exercise_type_code: 1,
            exercise_type_name: "RUNNING".to_string(),
            start_time: 0,
            end_time: duration_millis,
            duration_millis,
            calorie_count: 120.0,
            distance_meters,
            mean_heart_rate: 0.0,
            max_heart_rate: 0.0,
            mean_speed: 0.0,
            max_speed: 0.0,
            heart_rate_samples: None,
        }
    }

    #[test]
    fn test_duration_minutes_truncates() {
        assert_eq!(duration_minutes(125_000), 2);
        assert_eq!(duration_minutes(59_999), 0);
        assert_eq!(record(0.0, 125_000).duration_minutes(), 2);
    }

    #[test]
    fn test_distance_km() {
        assert_eq!(distance_km(1500.0), 1.5);
        assert_eq!(record(1500.0, 0).distance_km(), 1.5);
    }

    #[test]
    fn test_display_helpers_treat_zero_as_missing() {
        let r = record(0.0, 60_000);
        assert!(!r.has_distance());
        assert!(!r.has_heart_rate());
        assert!(!r.has_speed());

        let r = ExerciseRecord {
            max_heart_rate: 150.0,
            ..record(10.0, 60_000)
        };
        assert!(r.has_distance());
        assert!(r.has_heart_rate());
    }

    #[test]
    fn test_raw_session_optional_fields_default() {
        let json = r#"{
            "exerciseType": {"code": 1002, "name": "RUNNING"},
            "startTime": 1000,
            "endTime": 61000,
            "duration": 60000,
            "calories": 12.5
        }"#;
        let session: RawSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.distance, None);
        assert_eq!(session.log, None);
        assert_eq!(session.exercise_type.name, "RUNNING");
    }

    #[test]
    fn test_absent_samples_not_serialized() {
        let json = serde_json::to_string(&record(0.0, 0)).unwrap();
        assert!(!json.contains("heartRateSamples"));
        assert!(json.contains("uniqueId"));
    }

    #[test]
    fn test_permissions_are_read_only() {
        let json = serde_json::to_string(&Permission::read(HealthDataType::Steps)).unwrap();
        assert!(json.contains("\"Read\""));
        assert!(serde_json::from_str::<AccessType>("\"Write\"").is_err());
    }
}
