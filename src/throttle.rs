//! Submission throttling for mood logging.
//!
//! This module provides the building blocks for the gate:
//! - [`ThrottleConfig`]: the fixed-window policy and its pure decision step.
//! - [`SubmissionThrottle`]: the stateful gate wiring the policy to a store.
//! - [`Decision`]: the result of one admission attempt (Allowed/Denied).
//!
//! # Architecture
//!
//! The pieces are deliberately separable:
//! - **Policy**: [`ThrottleConfig::decide`] is pure arithmetic over
//!   `{now, state}` and cannot fail.
//! - **Storage**: [`store::StateStore`] owns durability of the persisted
//!   pair, enabling in-memory or on-disk backends.
//! - **Middleware**: [`ThrottleLayer`] puts the gate in front of a
//!   service-shaped caller without knowing how the decision is made.
//!
//! A window admits a bounded number of submissions. The first attempt after
//! the window expires opens a fresh window and counts as its first
//! admission; attempts inside a live window are admitted until the
//! per-window limit is reached, then denied until the window runs out.

use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub mod middleware;
pub mod store;

pub use middleware::{ThrottleLayer, ThrottleService};
pub use store::{JsonStateStore, MemoryStateStore, StateStore, StoreError};

/// Persisted throttle record: when the current window opened and how many
/// submissions it has admitted.
///
/// The pair is only meaningful together; once the window has expired the
/// record is stale and is replaced wholesale by the next admission. The
/// zero value (`Default`) means no submission was ever admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThrottleState {
    /// Wall-clock start of the current window, milliseconds since the epoch.
    pub window_start_millis: u64,
    /// Admissions recorded since `window_start_millis`. Denials never
    /// increment this.
    pub count_in_window: u32,
}

/// The decision returned by the throttle for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The submission may proceed.
    Allowed {
        /// Admissions left in the current window after this one.
        remaining: u32,
    },
    /// The current window is exhausted.
    Denied {
        /// Time until the window expires. A hint for "try again later"
        /// messaging, not a guarantee.
        retry_after: Duration,
    },
}

impl Decision {
    /// Helper to check if allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Errors produced when validating throttle configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ThrottleConfigError {
    /// Window duration must be > 0.
    #[error("window must be > 0 (got {0:?})")]
    InvalidWindow(Duration),
    /// Per-window admission limit must be > 0.
    #[error("max_per_window must be > 0 (got {provided})")]
    InvalidLimit {
        /// Value provided by caller.
        provided: u32,
    },
}

/// Validated fixed-window throttle configuration.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    window: Duration,
    max_per_window: u32,
}

impl Default for ThrottleConfig {
    /// The journal app's shipped policy: a 10-minute window, and after the
    /// admission that opens a window one further admission before denial.
    fn default() -> Self {
        Self { window: Duration::from_secs(600), max_per_window: 2 }
    }
}

impl ThrottleConfig {
    /// Create a config with validation.
    pub fn new(window: Duration, max_per_window: u32) -> Result<Self, ThrottleConfigError> {
        if window == Duration::ZERO {
            return Err(ThrottleConfigError::InvalidWindow(window));
        }
        if max_per_window == 0 {
            return Err(ThrottleConfigError::InvalidLimit { provided: max_per_window });
        }
        Ok(Self { window, max_per_window })
    }

    /// Duration of one admission window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admissions allowed inside a live window.
    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    fn window_millis(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }

    /// Pure decision step for one attempt at `now_millis`.
    ///
    /// Returns the decision together with the successor state the caller
    /// must persist on admission. A window that expired before `now_millis`
    /// resets to a fresh window with this admission counted as its first,
    /// regardless of how exhausted the stale window was. Inside a live
    /// window, admissions continue until `max_per_window` is reached; after
    /// that the attempt is denied and the state comes back unchanged.
    ///
    /// This is arithmetic only; it cannot fail.
    pub fn decide(&self, now_millis: u64, state: ThrottleState) -> (Decision, ThrottleState) {
        // `window_start < now - window`, rearranged so unsigned arithmetic
        // cannot underflow. Exact for non-negative operands.
        let window_deadline = state.window_start_millis.saturating_add(self.window_millis());

        if window_deadline < now_millis {
            let next = ThrottleState { window_start_millis: now_millis, count_in_window: 1 };
            return (Decision::Allowed { remaining: self.max_per_window - 1 }, next);
        }

        if state.count_in_window < self.max_per_window {
            let next = ThrottleState {
                window_start_millis: state.window_start_millis,
                count_in_window: state.count_in_window + 1,
            };
            return (
                Decision::Allowed { remaining: self.max_per_window - next.count_in_window },
                next,
            );
        }

        let retry_after = Duration::from_millis(window_deadline.saturating_sub(now_millis));
        (Decision::Denied { retry_after }, state)
    }
}

/// Stateful gate deciding whether a submission may proceed right now.
///
/// The gate reads the persisted state, applies the pure policy step, and
/// persists the successor state before reporting an admission. The whole
/// read-compute-write sequence runs under an internal mutex so racing
/// callers cannot both observe a non-exhausted window and overshoot the
/// limit.
#[derive(Debug)]
pub struct SubmissionThrottle<S> {
    store: Arc<S>,
    config: ThrottleConfig,
    clock: Arc<dyn Clock>,
    gate: Mutex<()>,
}

impl<S> SubmissionThrottle<S>
where
    S: StateStore,
{
    /// Gate backed by `store` with the default journal policy.
    pub fn new(store: S) -> Self {
        Self::with_config(store, ThrottleConfig::default())
    }

    /// Gate backed by `store` with an explicit configuration.
    pub fn with_config(store: S, config: ThrottleConfig) -> Self {
        Self { store: Arc::new(store), config, clock: Arc::new(SystemClock), gate: Mutex::new(()) }
    }

    /// Override the clock (useful for deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Borrow the active configuration.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Attempt to consume one submission slot.
    ///
    /// # Behavior
    /// - **Admitted**: the successor state is durably persisted before the
    ///   decision is returned.
    /// - **Denied**: the stored record is left untouched; denying is
    ///   idempotent.
    ///
    /// # Errors
    /// Storage failures bubble to the caller unmodified. A denial is an
    /// `Ok` outcome, never an error.
    pub async fn try_consume(&self) -> Result<Decision, S::Error> {
        let _guard = self.gate.lock().await;

        let state = self.store.load().await?;
        let now = self.clock.now_millis();
        let (decision, next) = self.config.decide(now, state);

        match decision {
            Decision::Allowed { remaining } => {
                self.store.save(next).await?;
                if next.window_start_millis != state.window_start_millis {
                    tracing::info!(remaining, "submission window reset");
                } else {
                    tracing::debug!(remaining, "submission admitted");
                }
            }
            Decision::Denied { retry_after } => {
                tracing::warn!(
                    retry_after_ms = retry_after.as_millis() as u64,
                    "submission denied, window exhausted"
                );
            }
        }

        Ok(decision)
    }
}
