//! Permission-gated access to a [`HealthDataSource`].
//!
//! The manager builds query windows, checks that the user granted read
//! access, and hands raw results to the step aggregator or the exercise
//! flattener. Missing permissions produce neutral values (zero steps, empty
//! lists); source failures are returned to the caller unchanged.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::error::Result;
use crate::exercise::flatten_exercises;
use crate::source::HealthDataSource;
use crate::steps::{aggregate_daily_steps, aggregate_hourly_steps, range_window, today_window};
use crate::types::{
    DailyStepRecord, ExerciseRecord, HealthDataType, HourlyStepRecord, Permission,
};

/// Read permissions every query needs.
pub const REQUIRED_PERMISSIONS: [Permission; 2] = [
    Permission::read(HealthDataType::Steps),
    Permission::read(HealthDataType::Exercise),
];

/// Wrapper around a health data source.
pub struct HealthManager<S> {
    source: S,
}

impl<S: HealthDataSource> HealthManager<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_available(&self) -> bool {
        let available = self.source.is_available();
        if !available {
            warn!("[HealthManager] Health platform is not available");
        }
        available
    }

    /// Ask the user for every required permission.
    pub fn request_permissions(&self) -> Result<Vec<Permission>> {
        match self.source.request_permissions(&REQUIRED_PERMISSIONS) {
            Ok(granted) => {
                let names: Vec<String> = granted
                    .iter()
                    .map(|p| format!("{}/{:?}", p.data_type.as_str(), p.access))
                    .collect();
                debug!(
                    "[HealthManager] Permission request result: [{}]",
                    names.join(", ")
                );
                Ok(granted)
            }
            Err(e) => {
                warn!("[HealthManager] Failed to request permissions: {}", e);
                Err(e)
            }
        }
    }

    /// Whether every required permission is granted. A failed check counts
    /// as not granted.
    pub fn has_all_permissions(&self) -> bool {
        match self.source.granted_permissions(&REQUIRED_PERMISSIONS) {
            Ok(granted) => {
                let result = REQUIRED_PERMISSIONS.iter().all(|p| granted.contains(p));
                debug!(
                    "[HealthManager] has_all_permissions: {} (granted: {}/{})",
                    result,
                    granted.len(),
                    REQUIRED_PERMISSIONS.len()
                );
                result
            }
            Err(e) => {
                warn!("[HealthManager] Failed to check permissions: {}", e);
                false
            }
        }
    }

    /// Grant status per data type, keyed `STEPS` / `EXERCISE`.
    pub fn permissions_status(&self) -> BTreeMap<String, bool> {
        let granted = self
            .source
            .granted_permissions(&REQUIRED_PERMISSIONS)
            .unwrap_or_else(|e| {
                warn!("[HealthManager] Failed to get permissions status: {}", e);
                Vec::new()
            });

        REQUIRED_PERMISSIONS
            .iter()
            .map(|p| (p.data_type.as_str().to_string(), granted.contains(p)))
            .collect()
    }

    fn ensure_permissions(&self) -> bool {
        let granted = self.has_all_permissions();
        if !granted {
            warn!("[HealthManager] Health permissions not granted");
        }
        granted
    }

    /// Steps from the start of today until `now`.
    pub fn today_steps(&self, now: NaiveDateTime) -> Result<u64> {
        if !self.ensure_permissions() {
            return Ok(0);
        }
        let window = today_window(now);
        debug!(
            "[HealthManager] Querying steps for today: {} .. {}",
            window.start, window.end
        );
        let steps = self.source.query_step_total(&window)?;
        debug!("[HealthManager] Total steps today: {}", steps);
        Ok(steps)
    }

    /// Total steps from `start` through `end` as one window.
    pub fn steps_for_range(&self, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        if !self.ensure_permissions() {
            return Ok(0);
        }
        self.source.query_step_total(&range_window(start, end))
    }

    /// Per-day step totals from `start` through `end`, skipping empty days.
    pub fn daily_steps_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStepRecord>> {
        if !self.ensure_permissions() {
            return Ok(Vec::new());
        }
        let days = aggregate_daily_steps(start, end, |w| self.source.query_step_total(w))?;
        info!(
            "[HealthManager] Daily steps retrieved: {} days with data",
            days.len()
        );
        Ok(days)
    }

    /// Per-hour step totals for `date`, up to the current hour of `now`.
    pub fn hourly_steps_for_day(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<HourlyStepRecord>> {
        if !self.ensure_permissions() {
            return Ok(Vec::new());
        }
        aggregate_hourly_steps(date, now, |w| self.source.query_step_total(w))
    }

    /// Exercise sessions recorded from `start` through `end`.
    pub fn exercises_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExerciseRecord>> {
        if !self.ensure_permissions() {
            return Ok(Vec::new());
        }
        debug!(
            "[HealthManager] Querying exercises for {} .. {}",
            start, end
        );
        let points = self
            .source
            .query_exercise_data_points(&range_window(start, end))?;
        let exercises = flatten_exercises(&points);
        info!(
            "[HealthManager] Found {} exercises for date range",
            exercises.len()
        );
        Ok(exercises)
    }

    pub fn today_exercises(&self, today: NaiveDate) -> Result<Vec<ExerciseRecord>> {
        self.exercises_for_range(today, today)
    }
}
