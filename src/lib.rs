//! # Health Aggregator
//!
//! Step and exercise aggregation for on-device health data.
//!
//! This library provides:
//! - Per-day and per-hour step totals over calendar ranges
//! - Flattening of multi-session exercise records with heart-rate samples
//! - Permission-gated access to a host-implemented health data source
//! - Immutable presentation snapshots and background refresh
//!
//! ## Features
//!
//! - **`ffi`** - Enable UniFFI bindings for mobile platforms (iOS/Android)
//!
//! ## Quick Start
//!
//! ```rust
//! use health_aggregator::{flatten_exercises, ExerciseType, RawDataPoint, RawSession};
//!
//! let session = RawSession {
//!     exercise_type: ExerciseType { code: 1002, name: "RUNNING".to_string() },
//!     start_time: 0,
//!     end_time: 600_000,
//!     duration: 600_000,
//!     calories: 80.0,
//!     distance: Some(1500.0),
//!     mean_heart_rate: None,
//!     max_heart_rate: None,
//!     mean_speed: None,
//!     max_speed: None,
//!     log: None,
//! };
//! let points = vec![RawDataPoint { uid: "abc".to_string(), sessions: vec![session] }];
//!
//! let records = flatten_exercises(&points);
//! assert_eq!(records[0].unique_id, "abc_0");
//! assert_eq!(records[0].duration_minutes(), 10);
//! assert_eq!(records[0].distance_km(), 1.5);
//! ```

// Unified error handling
pub mod error;
pub use error::{HealthError, Result};

// Query windows, raw source records, display records
pub mod types;
pub use types::{
    AccessType, DailyStepRecord, ExerciseRecord, ExerciseType, HealthDataType, HeartRateSample,
    HourlyStepRecord, Permission, RawDataPoint, RawExerciseLog, RawSession, TimeWindow,
};

pub mod config;
pub use config::HealthConfig;

// Host-implemented data store capability
pub mod source;
pub use source::HealthDataSource;

// Range aggregation over calendar days
pub mod steps;
pub use steps::{aggregate_daily_steps, aggregate_hourly_steps, day_window};

// Session flattening
pub mod exercise;
pub use exercise::flatten_exercises;

// Permission-gated source access
pub mod manager;
pub use manager::{HealthManager, REQUIRED_PERMISSIONS};

// Presentation snapshots
pub mod state;
pub use state::{HealthController, HealthSnapshot};

// Off-thread refresh
pub mod background;
pub use background::{BackgroundRefresher, RefreshKind, RefreshRequest};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("HealthAggregator"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}
