//! The per-session lifecycle state machine.
//!
//! `SessionState` owns the progress flags; the pure guard functions
//! encode the transition table so the controller never scatters guard
//! logic across its methods. A session is single-use: state is never
//! reset.

use serde::{Deserialize, Serialize};

use crate::error::PreconditionError;
use crate::launch_data::LaunchMode;

/// The five lifecycle transitions, each emitting one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleTransition {
    Initialized,
    Terminated,
    Completed,
    Passed,
    Failed,
}

/// Mutable progress flags, owned exclusively by the lifecycle
/// controller.
///
/// `passed_count` and `failed_count` are counters rather than booleans:
/// they double as "has this ever happened" checks for the shared
/// pass/fail guard and as a record of repeat attempts when
/// `passIsFinal` is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub initialized: bool,
    pub in_progress: bool,
    pub completed: bool,
    pub terminated: bool,
    pub passed_count: u32,
    pub failed_count: u32,
}

impl SessionState {
    /// Whether either pass or fail has ever been reported.
    pub fn has_final_result(&self) -> bool {
        self.passed_count > 0 || self.failed_count > 0
    }

    /// initialize: preferences loaded; not already initialized.
    pub fn guard_initialize(&self, preferences_loaded: bool) -> Result<(), PreconditionError> {
        if !preferences_loaded {
            return Err(PreconditionError::PreferencesNotLoaded);
        }
        if self.initialized {
            return Err(PreconditionError::AlreadyInitialized);
        }
        Ok(())
    }

    /// terminate: initialized; not already terminated.
    pub fn guard_terminate(&self) -> Result<(), PreconditionError> {
        if !self.initialized {
            return Err(PreconditionError::NotInitialized);
        }
        if self.terminated {
            return Err(PreconditionError::AlreadyTerminated);
        }
        Ok(())
    }

    /// completed: in progress; Normal launch mode; not already
    /// completed.
    pub fn guard_completed(
        &self,
        launch_mode: Option<LaunchMode>,
    ) -> Result<(), PreconditionError> {
        self.guard_active_normal(launch_mode)?;
        if self.completed {
            return Err(PreconditionError::AlreadyCompleted);
        }
        Ok(())
    }

    /// passed/failed share one guard: in progress; Normal launch mode;
    /// and once either has fired, any further call to either is
    /// rejected while `passIsFinal` holds.
    pub fn guard_result(
        &self,
        launch_mode: Option<LaunchMode>,
        pass_is_final: bool,
    ) -> Result<(), PreconditionError> {
        self.guard_active_normal(launch_mode)?;
        if self.has_final_result() && pass_is_final {
            return Err(PreconditionError::AlreadyFinal);
        }
        Ok(())
    }

    fn guard_active_normal(&self, launch_mode: Option<LaunchMode>) -> Result<(), PreconditionError> {
        if !self.in_progress {
            return Err(PreconditionError::NotActive);
        }
        match launch_mode {
            Some(LaunchMode::Normal) => Ok(()),
            Some(other) => Err(PreconditionError::WrongLaunchMode(other)),
            None => Err(PreconditionError::LaunchDataNotLoaded),
        }
    }

    /// Apply a transition's effect. Callers must have consulted the
    /// matching guard first.
    pub fn apply(&mut self, transition: LifecycleTransition) {
        match transition {
            LifecycleTransition::Initialized => {
                self.initialized = true;
                self.in_progress = true;
            }
            LifecycleTransition::Terminated => {
                self.terminated = true;
                self.in_progress = false;
            }
            LifecycleTransition::Completed => {
                self.completed = true;
            }
            LifecycleTransition::Passed => {
                self.passed_count += 1;
            }
            LifecycleTransition::Failed => {
                self.failed_count += 1;
            }
        }
    }
}
