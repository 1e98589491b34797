//! Capability interface to the on-device health data store.
//!
//! The vendor SDK lives on the host side. The host implements
//! [`HealthDataSource`] as thin blocking calls; everything above it in this
//! crate is synchronous data shaping.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{Permission, RawDataPoint, TimeWindow};

/// Queries the host's health data store.
///
/// Every method is a single blocking call. Callers are expected to run them
/// off the UI thread (see [`crate::background`]).
pub trait HealthDataSource: Send + Sync {
    /// Whether the health platform is installed and reachable.
    fn is_available(&self) -> bool;

    /// Return the subset of `permissions` the user has granted.
    fn granted_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>>;

    /// Ask the user for `permissions`, returning what ended up granted.
    fn request_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>>;

    /// Summed step count over `window`.
    fn query_step_total(&self, window: &TimeWindow) -> Result<u64>;

    /// Session-bearing exercise records over `window`.
    fn query_exercise_data_points(&self, window: &TimeWindow) -> Result<Vec<RawDataPoint>>;
}

impl<S: HealthDataSource + ?Sized> HealthDataSource for Arc<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn granted_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>> {
        (**self).granted_permissions(permissions)
    }

    fn request_permissions(&self, permissions: &[Permission]) -> Result<Vec<Permission>> {
        (**self).request_permissions(permissions)
    }

    fn query_step_total(&self, window: &TimeWindow) -> Result<u64> {
        (**self).query_step_total(window)
    }

    fn query_exercise_data_points(&self, window: &TimeWindow) -> Result<Vec<RawDataPoint>> {
        (**self).query_exercise_data_points(window)
    }
}
