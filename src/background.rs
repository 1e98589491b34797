//! Run controller actions off the caller's thread.
//!
//! Health queries block, so the UI hands them to a [`BackgroundRefresher`]
//! and polls [`BackgroundRefresher::is_active`] / the controller snapshot.
//! At most one request per [`RefreshKind`] runs at a time. A request that
//! arrives while its kind is running is rejected; the running one is not
//! cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, info};

use crate::source::HealthDataSource;
use crate::state::HealthController;

/// Category of background work. One in-flight request per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RefreshKind {
    Permissions,
    Steps,
    DailySteps,
    Exercises,
}

const KIND_COUNT: usize = 4;

impl RefreshKind {
    fn index(self) -> usize {
        match self {
            RefreshKind::Permissions => 0,
            RefreshKind::Steps => 1,
            RefreshKind::DailySteps => 2,
            RefreshKind::Exercises => 3,
        }
    }
}

/// A controller action to run in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    CheckPermissions,
    RequestPermissions,
    Steps,
    DailySteps { start: NaiveDate, end: NaiveDate },
    TodayExercises,
    ExercisesForRange { start: NaiveDate, end: NaiveDate },
}

impl RefreshRequest {
    pub fn kind(&self) -> RefreshKind {
        match self {
            RefreshRequest::CheckPermissions | RefreshRequest::RequestPermissions => {
                RefreshKind::Permissions
            }
            RefreshRequest::Steps => RefreshKind::Steps,
            RefreshRequest::DailySteps { .. } => RefreshKind::DailySteps,
            RefreshRequest::TodayExercises | RefreshRequest::ExercisesForRange { .. } => {
                RefreshKind::Exercises
            }
        }
    }

    fn run<S: HealthDataSource>(self, controller: &HealthController<S>) {
        match self {
            RefreshRequest::CheckPermissions => controller.check_permissions(),
            RefreshRequest::RequestPermissions => controller.request_permissions(),
            RefreshRequest::Steps => controller.read_steps(),
            RefreshRequest::DailySteps { start, end } => controller.read_daily_steps(start, end),
            RefreshRequest::TodayExercises => controller.read_exercises(),
            RefreshRequest::ExercisesForRange { start, end } => {
                controller.read_exercises_for_range(start, end)
            }
        }
    }
}

/// Clears the in-flight flag when the worker finishes, even on panic.
struct ActiveGuard {
    flags: Arc<[AtomicBool; KIND_COUNT]>,
    index: usize,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.flags[self.index].store(false, Ordering::Release);
    }
}

/// Spawns worker threads for controller actions.
pub struct BackgroundRefresher<S> {
    controller: Arc<HealthController<S>>,
    active: Arc<[AtomicBool; KIND_COUNT]>,
}

impl<S: HealthDataSource + 'static> BackgroundRefresher<S> {
    pub fn new(controller: Arc<HealthController<S>>) -> Self {
        Self {
            controller,
            active: Arc::new(std::array::from_fn(|_| AtomicBool::new(false))),
        }
    }

    pub fn controller(&self) -> &Arc<HealthController<S>> {
        &self.controller
    }

    /// Whether a request of `kind` is running.
    pub fn is_active(&self, kind: RefreshKind) -> bool {
        self.active[kind.index()].load(Ordering::Acquire)
    }

    /// Start `request` on a new thread.
    ///
    /// Returns `None` without spawning when a request of the same kind is
    /// still running.
    pub fn spawn(&self, request: RefreshRequest) -> Option<JoinHandle<()>> {
        let kind = request.kind();
        let index = kind.index();

        if self.active[index]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("[BackgroundRefresher] {:?} already in flight, ignoring", kind);
            return None;
        }

        let guard = ActiveGuard {
            flags: Arc::clone(&self.active),
            index,
        };
        let controller = Arc::clone(&self.controller);

        Some(std::thread::spawn(move || {
            let _guard = guard;
            let start = Instant::now();
            request.run(&controller);
            info!(
                "[BackgroundRefresher] {:?} finished in {} ms",
                request,
                start.elapsed().as_millis()
            );
        }))
    }
}
