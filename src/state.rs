//! Presentation state for the health screen.
//!
//! The controller publishes [`HealthSnapshot`] values. A snapshot is never
//! mutated after it is published: every action builds a new one from the
//! previous and swaps it in under the lock. Readers keep whatever `Arc` they
//! got and see a consistent view.

use std::sync::{Arc, RwLock};

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::HealthConfig;
use crate::error::{HealthError, Result, UNKNOWN_ERROR_CODE};
use crate::manager::{HealthManager, REQUIRED_PERMISSIONS};
use crate::source::HealthDataSource;
use crate::types::{DailyStepRecord, ExerciseRecord, HourlyStepRecord};

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Clock backed by the system's local time zone.
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Everything the health screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Bumped on every publish, so pollers can tell snapshots apart.
    pub version: u64,
    pub permissions_granted: bool,
    pub today_steps: u64,
    pub week_steps: u64,
    pub hourly_steps: Vec<HourlyStepRecord>,
    pub daily_steps: Vec<DailyStepRecord>,
    pub exercises: Vec<ExerciseRecord>,
    pub exercise_date_label: String,
    pub status_message: String,
    pub error: Option<HealthError>,
    pub is_loading: bool,
}

impl HealthSnapshot {
    fn initial(config: &HealthConfig) -> Self {
        Self {
            version: 0,
            permissions_granted: false,
            today_steps: 0,
            week_steps: 0,
            hourly_steps: Vec::new(),
            daily_steps: Vec::new(),
            exercises: Vec::new(),
            exercise_date_label: config.today_label.clone(),
            status_message: "Health data ready".to_string(),
            error: None,
            is_loading: false,
        }
    }
}

/// Drives the manager and publishes snapshots.
pub struct HealthController<S> {
    manager: HealthManager<S>,
    config: HealthConfig,
    clock: Clock,
    state: RwLock<Arc<HealthSnapshot>>,
}

impl<S: HealthDataSource> HealthController<S> {
    pub fn new(source: S, config: HealthConfig) -> Self {
        Self::with_clock(source, config, system_clock())
    }

    pub fn with_clock(source: S, config: HealthConfig, clock: Clock) -> Self {
        let initial = HealthSnapshot::initial(&config);
        Self {
            manager: HealthManager::new(source),
            config,
            clock,
            state: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn manager(&self) -> &HealthManager<S> {
        &self.manager
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<HealthSnapshot> {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Publish a new snapshot derived from the current one.
    fn publish<F>(&self, f: F)
    where
        F: FnOnce(&mut HealthSnapshot),
    {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        let mut next = HealthSnapshot::clone(&guard);
        f(&mut next);
        next.version = guard.version + 1;
        *guard = Arc::new(next);
    }

    fn start_loading(&self) {
        self.publish(|s| s.is_loading = true);
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date()
    }

    /// Record a failure and apply `reset` in the same snapshot.
    fn fail_with<F>(&self, error: HealthError, reset: F)
    where
        F: FnOnce(&mut HealthSnapshot),
    {
        if error.is_recoverable() {
            info!(
                "[HealthController] Resolvable error; message: {}",
                error.message()
            );
        } else {
            info!("[HealthController] {} error: {}", error.category(), error);
        }
        let status = format!("Error: {} (code: {})", error.message(), error.code());
        self.publish(|s| {
            reset(s);
            s.status_message = status;
            s.error = Some(error);
            s.is_loading = false;
        });
    }

    /// Returns false and publishes a hint when permissions are missing.
    fn require_permissions(&self) -> bool {
        if self.manager.has_all_permissions() {
            return true;
        }
        self.publish(|s| {
            s.status_message = "Permissions required. Request permissions first.".to_string();
            s.is_loading = false;
        });
        false
    }

    fn require_available(&self) -> bool {
        if self.manager.is_available() {
            return true;
        }
        self.publish(|s| {
            s.status_message = "Health platform is not available".to_string();
            s.is_loading = false;
        });
        false
    }

    pub fn check_permissions(&self) {
        debug!("[HealthController] check_permissions()");
        if !self.require_available() {
            return;
        }
        let granted = self.manager.has_all_permissions();
        self.publish(|s| {
            s.permissions_granted = granted;
            s.status_message = if granted {
                "Permissions granted".to_string()
            } else {
                "Permissions required".to_string()
            };
            s.error = None;
        });
    }

    pub fn request_permissions(&self) {
        debug!("[HealthController] request_permissions()");
        self.start_loading();
        if !self.require_available() {
            return;
        }

        match self.manager.request_permissions() {
            Ok(granted) => {
                let all = REQUIRED_PERMISSIONS.iter().all(|p| granted.contains(p));
                let counts = format!("{}/{}", granted.len(), REQUIRED_PERMISSIONS.len());
                self.publish(|s| {
                    s.permissions_granted = all;
                    s.status_message = if all {
                        format!("Permissions granted ({})", counts)
                    } else {
                        format!("Permissions denied. Granted: {}", counts)
                    };
                    s.error = None;
                    s.is_loading = false;
                });
            }
            Err(e) => self.fail_with(e, |_| {}),
        }
    }

    /// Read today's total, the weekly total and today's hourly breakdown.
    pub fn read_steps(&self) {
        debug!("[HealthController] read_steps()");
        self.start_loading();
        if !self.require_permissions() {
            return;
        }

        match self.fetch_steps() {
            Ok((today_steps, week_steps, hourly_steps)) => self.publish(|s| {
                s.today_steps = today_steps;
                s.week_steps = week_steps;
                s.hourly_steps = hourly_steps;
                s.status_message = "Step data loaded".to_string();
                s.error = None;
                s.is_loading = false;
            }),
            Err(e) => self.fail_with(e, |s| {
                s.today_steps = 0;
                s.week_steps = 0;
                s.hourly_steps = Vec::new();
            }),
        }
    }

    fn fetch_steps(&self) -> Result<(u64, u64, Vec<HourlyStepRecord>)> {
        let now = (self.clock)();
        let today = now.date();
        let week_start = today
            .checked_sub_days(Days::new(u64::from(self.config.week_lookback_days)))
            .ok_or_else(|| HealthError::InvalidRequest {
                code: UNKNOWN_ERROR_CODE,
                detail: format!(
                    "week lookback of {} days from {} is out of range",
                    self.config.week_lookback_days, today
                ),
            })?;

        let today_steps = self.manager.today_steps(now)?;
        let week_steps = self.manager.steps_for_range(week_start, today)?;
        let hourly_steps = self.manager.hourly_steps_for_day(today, now)?;
        Ok((today_steps, week_steps, hourly_steps))
    }

    /// Read per-day totals for `start` through `end`.
    pub fn read_daily_steps(&self, start: NaiveDate, end: NaiveDate) {
        debug!("[HealthController] read_daily_steps({} ~ {})", start, end);
        self.start_loading();
        if !self.require_permissions() {
            return;
        }

        match self.manager.daily_steps_for_range(start, end) {
            Ok(days) => self.publish(|s| {
                s.status_message = format!("{} ~ {} steps ({} days)", start, end, days.len());
                s.daily_steps = days;
                s.error = None;
                s.is_loading = false;
            }),
            Err(e) => self.fail_with(e, |s| s.daily_steps = Vec::new()),
        }
    }

    /// Read today's exercise sessions.
    pub fn read_exercises(&self) {
        debug!("[HealthController] read_exercises()");
        let today = self.today();
        let label = self.config.today_label.clone();
        self.load_exercises(today, today, label);
    }

    /// Read exercise sessions for `start` through `end`.
    pub fn read_exercises_for_range(&self, start: NaiveDate, end: NaiveDate) {
        debug!(
            "[HealthController] read_exercises_for_range({} ~ {})",
            start, end
        );
        self.load_exercises(start, end, format!("{} ~ {}", start, end));
    }

    fn load_exercises(&self, start: NaiveDate, end: NaiveDate, label: String) {
        self.start_loading();
        if !self.require_permissions() {
            return;
        }

        match self.manager.exercises_for_range(start, end) {
            Ok(exercises) => self.publish(|s| {
                s.status_message = format!("{}: {} exercises", label, exercises.len());
                s.exercises = exercises;
                s.exercise_date_label = label;
                s.error = None;
                s.is_loading = false;
            }),
            Err(e) => self.fail_with(e, |s| {
                s.exercises = Vec::new();
                s.exercise_date_label = label;
            }),
        }
    }

    /// Run the host's recovery action for the current error, if it has one.
    ///
    /// Returns true when the error was resolved and cleared.
    pub fn resolve_error<F>(&self, resolve: F) -> bool
    where
        F: FnOnce(&HealthError) -> Result<()>,
    {
        let current = self.snapshot();
        let Some(error) = current.error.as_ref() else {
            return false;
        };
        if !error.is_recoverable() {
            return false;
        }

        match resolve(error) {
            Ok(()) => {
                self.publish(|s| s.error = None);
                true
            }
            Err(e) => {
                warn!("[HealthController] Failed to resolve error: {}", e);
                false
            }
        }
    }
}
