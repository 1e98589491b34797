//! FFI bindings for mobile platforms (iOS/Android).
//!
//! The host implements [`HealthBridge`] on top of the vendor health SDK and
//! drives an [`FfiHealthController`]. Local datetimes cross the boundary as
//! ISO-8601 strings (`2024-01-01T23:59:59`), dates as `2024-01-01`.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::background::{BackgroundRefresher, RefreshKind, RefreshRequest};
use crate::error::{HealthError, Result, UNKNOWN_ERROR_CODE};
use crate::init_logging;
use crate::source::HealthDataSource;
use crate::state::{HealthController, HealthSnapshot};
use crate::types::{
    distance_km, duration_minutes, ExerciseRecord, ExerciseType, HourlyStepRecord, Permission,
    RawDataPoint, RawExerciseLog, RawSession, TimeWindow,
};
use crate::HealthConfig;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| HealthError::InvalidRequest {
        code: UNKNOWN_ERROR_CODE,
        detail: format!("invalid date '{}': {}", value, e),
    })
}

impl From<uniffi::UnexpectedUniFFICallbackError> for HealthError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        HealthError::data_access(format!("callback failed: {}", e.reason))
    }
}

// ============================================================================
// Callback Interfaces
// ============================================================================

/// Health SDK access implemented by the host app.
/// Every call is blocking; the crate only calls it from worker threads.
#[uniffi::export(callback_interface)]
pub trait HealthBridge: Send + Sync {
    fn is_available(&self) -> bool;

    fn granted_permissions(
        &self,
        permissions: Vec<Permission>,
    ) -> std::result::Result<Vec<Permission>, HealthError>;

    fn request_permissions(
        &self,
        permissions: Vec<Permission>,
    ) -> std::result::Result<Vec<Permission>, HealthError>;

    /// Summed steps between two local datetimes (both inclusive).
    fn query_step_total(
        &self,
        window_start: String,
        window_end: String,
    ) -> std::result::Result<u64, HealthError>;

    /// Exercise data points between two local datetimes (both inclusive).
    fn query_exercise_data_points(
        &self,
        window_start: String,
        window_end: String,
    ) -> std::result::Result<Vec<FfiRawDataPoint>, HealthError>;
}

/// Runs the SDK's recovery action for a resolvable error.
#[uniffi::export(callback_interface)]
pub trait ErrorResolver: Send + Sync {
    /// Returns true when the user completed the recovery flow.
    fn resolve(&self, error_code: i32) -> bool;
}

/// Adapts a host bridge to [`HealthDataSource`].
pub struct BridgeSource {
    bridge: Box<dyn HealthBridge>,
}

impl HealthDataSource for BridgeSource {
    fn is_available(&self) -> bool {
        self.bridge.is_available()
    }

    fn granted_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>> {
        self.bridge.granted_permissions(permissions.to_vec())
    }

    fn request_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>> {
        self.bridge.request_permissions(permissions.to_vec())
    }

    fn query_step_total(&self, window: &TimeWindow) -> Result<u64> {
        self.bridge
            .query_step_total(format_datetime(&window.start), format_datetime(&window.end))
    }

    fn query_exercise_data_points(&self, window: &TimeWindow) -> Result<Vec<RawDataPoint>> {
        let points = self.bridge.query_exercise_data_points(
            format_datetime(&window.start),
            format_datetime(&window.end),
        )?;
        Ok(points.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// FFI Types
// ============================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRawExerciseLog {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub heart_rate: Option<f32>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRawSession {
    pub exercise_type_code: i32,
    pub exercise_type_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub calories: f32,
    pub distance: Option<f32>,
    pub mean_heart_rate: Option<f32>,
    pub max_heart_rate: Option<f32>,
    pub mean_speed: Option<f32>,
    pub max_speed: Option<f32>,
    pub log: Option<Vec<FfiRawExerciseLog>>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRawDataPoint {
    pub uid: String,
    pub sessions: Vec<FfiRawSession>,
}

impl From<FfiRawExerciseLog> for RawExerciseLog {
    fn from(l: FfiRawExerciseLog) -> Self {
        Self {
            timestamp: l.timestamp,
            heart_rate: l.heart_rate,
        }
    }
}

impl From<FfiRawSession> for RawSession {
    fn from(s: FfiRawSession) -> Self {
        Self {
            exercise_type: ExerciseType {
                code: s.exercise_type_code,
                name: s.exercise_type_name,
            },
            start_time: s.start_time,
            end_time: s.end_time,
            duration: s.duration,
            calories: s.calories,
            distance: s.distance,
            mean_heart_rate: s.mean_heart_rate,
            max_heart_rate: s.max_heart_rate,
            mean_speed: s.mean_speed,
            max_speed: s.max_speed,
            log: s.log.map(|log| log.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<FfiRawDataPoint> for RawDataPoint {
    fn from(p: FfiRawDataPoint) -> Self {
        Self {
            uid: p.uid,
            sessions: p.sessions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDailyStepRecord {
    /// `YYYY-MM-DD`
    pub date: String,
    pub step_count: u64,
}

/// Snapshot for FFI. Errors are flattened into plain fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHealthSnapshot {
    pub version: u64,
    pub permissions_granted: bool,
    pub today_steps: u64,
    pub week_steps: u64,
    pub hourly_steps: Vec<HourlyStepRecord>,
    pub daily_steps: Vec<FfiDailyStepRecord>,
    pub exercises: Vec<ExerciseRecord>,
    pub exercise_date_label: String,
    pub status_message: String,
    pub error_category: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
    pub error_recoverable: bool,
    pub is_loading: bool,
}

impl From<&HealthSnapshot> for FfiHealthSnapshot {
    fn from(s: &HealthSnapshot) -> Self {
        Self {
            version: s.version,
            permissions_granted: s.permissions_granted,
            today_steps: s.today_steps,
            week_steps: s.week_steps,
            hourly_steps: s.hourly_steps.clone(),
            daily_steps: s
                .daily_steps
                .iter()
                .map(|d| FfiDailyStepRecord {
                    date: d.date.format(DATE_FORMAT).to_string(),
                    step_count: d.step_count,
                })
                .collect(),
            exercises: s.exercises.clone(),
            exercise_date_label: s.exercise_date_label.clone(),
            status_message: s.status_message.clone(),
            error_category: s.error.as_ref().map(|e| e.category().to_string()),
            error_code: s.error.as_ref().map(HealthError::code),
            error_message: s.error.as_ref().map(|e| e.message().to_string()),
            error_recoverable: s.error.as_ref().is_some_and(HealthError::is_recoverable),
            is_loading: s.is_loading,
        }
    }
}

// ============================================================================
// Controller Object
// ============================================================================

/// Controller handle for the host. Action methods return immediately;
/// poll [`FfiHealthController::snapshot`] or
/// [`FfiHealthController::is_active`] for results.
#[derive(uniffi::Object)]
pub struct FfiHealthController {
    refresher: BackgroundRefresher<BridgeSource>,
}

impl FfiHealthController {
    fn start(&self, request: RefreshRequest) -> bool {
        let started = self.refresher.spawn(request).is_some();
        debug!("[HealthAggregator] {:?} started: {}", request, started);
        started
    }
}

#[uniffi::export]
impl FfiHealthController {
    #[uniffi::constructor]
    pub fn new(bridge: Box<dyn HealthBridge>, config: HealthConfig) -> Arc<Self> {
        init_logging();
        info!(
            "[HealthAggregator] Controller created (week lookback {} days)",
            config.week_lookback_days
        );
        let controller = HealthController::new(BridgeSource { bridge }, config);
        Arc::new(Self {
            refresher: BackgroundRefresher::new(Arc::new(controller)),
        })
    }

    pub fn snapshot(&self) -> FfiHealthSnapshot {
        FfiHealthSnapshot::from(self.refresher.controller().snapshot().as_ref())
    }

    pub fn is_active(&self, kind: RefreshKind) -> bool {
        self.refresher.is_active(kind)
    }

    pub fn check_permissions(&self) -> bool {
        self.start(RefreshRequest::CheckPermissions)
    }

    pub fn request_permissions(&self) -> bool {
        self.start(RefreshRequest::RequestPermissions)
    }

    pub fn read_steps(&self) -> bool {
        self.start(RefreshRequest::Steps)
    }

    pub fn read_daily_steps(
        &self,
        start_date: String,
        end_date: String,
    ) -> std::result::Result<bool, HealthError> {
        let start = parse_date(&start_date)?;
        let end = parse_date(&end_date)?;
        Ok(self.start(RefreshRequest::DailySteps { start, end }))
    }

    pub fn read_exercises(&self) -> bool {
        self.start(RefreshRequest::TodayExercises)
    }

    pub fn read_exercises_for_range(
        &self,
        start_date: String,
        end_date: String,
    ) -> std::result::Result<bool, HealthError> {
        let start = parse_date(&start_date)?;
        let end = parse_date(&end_date)?;
        Ok(self.start(RefreshRequest::ExercisesForRange { start, end }))
    }

    /// Blocks while the host runs its recovery flow.
    pub fn resolve_error(&self, resolver: Box<dyn ErrorResolver>) -> bool {
        self.refresher.controller().resolve_error(|error| {
            if resolver.resolve(error.code()) {
                Ok(())
            } else {
                Err(HealthError::data_access("recovery was not completed"))
            }
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[uniffi::export]
pub fn default_health_config() -> HealthConfig {
    HealthConfig::default()
}

/// Whole minutes in `duration_millis`, truncated.
#[uniffi::export]
pub fn ffi_duration_minutes(duration_millis: i64) -> i64 {
    duration_minutes(duration_millis)
}

#[uniffi::export]
pub fn ffi_distance_km(distance_meters: f32) -> f32 {
    distance_km(distance_meters)
}
