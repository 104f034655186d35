//! The journal's submit flow: gate the attempt, then record the mood.
//!
//! Mirrors what a journal app's action handler does when the user taps
//! "save my mood": ask the throttle whether the submission may proceed,
//! and only then bump the per-mood tally. A denial records nothing and
//! tells the user to try again later.

use crate::mood::Mood;
use crate::throttle::{Decision, StateStore, SubmissionThrottle};
use std::collections::HashMap;
use std::time::Duration;

pub mod store;

pub use store::{JsonTallyStore, MemoryTallyStore, TallyStore};

/// Outcome of one logging attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// The mood was recorded.
    Recorded {
        /// Total times this mood has been logged.
        count: u32,
    },
    /// The submission throttle is exhausted; nothing was recorded.
    RateLimited {
        /// Time until the current window expires.
        retry_after: Duration,
    },
}

impl LogOutcome {
    /// Helper to check if the mood was recorded.
    pub fn is_recorded(&self) -> bool {
        matches!(self, LogOutcome::Recorded { .. })
    }
}

/// Errors from [`MoodJournal`], naming which store failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JournalError<G, T>
where
    G: std::error::Error + 'static,
    T: std::error::Error + 'static,
{
    /// The throttle state store failed; the attempt was neither admitted
    /// nor denied.
    #[error("throttle state store: {0}")]
    Throttle(#[source] G),
    /// The attempt was admitted but the tally store failed to record it.
    #[error("mood tally store: {0}")]
    Tally(#[source] T),
}

/// Mood journal: a throttled recorder of mood submissions.
#[derive(Debug)]
pub struct MoodJournal<G, T> {
    throttle: SubmissionThrottle<G>,
    tally: T,
}

impl<G, T> MoodJournal<G, T>
where
    G: StateStore,
    T: TallyStore,
{
    /// Journal combining a submission gate with a tally store.
    pub fn new(throttle: SubmissionThrottle<G>, tally: T) -> Self {
        Self { throttle, tally }
    }

    /// Attempt to log `mood`.
    ///
    /// The tally is written only after the throttle admits the attempt; a
    /// denial leaves both stores untouched.
    pub async fn log(&self, mood: Mood) -> Result<LogOutcome, JournalError<G::Error, T::Error>> {
        match self.throttle.try_consume().await.map_err(JournalError::Throttle)? {
            Decision::Allowed { .. } => {
                let count = self.tally.increment(mood).await.map_err(JournalError::Tally)?;
                tracing::info!(mood = %mood, count, "mood recorded");
                Ok(LogOutcome::Recorded { count })
            }
            Decision::Denied { retry_after } => Ok(LogOutcome::RateLimited { retry_after }),
        }
    }

    /// Tally for every mood, moods never logged reporting zero.
    pub async fn counts(&self) -> Result<HashMap<Mood, u32>, JournalError<G::Error, T::Error>> {
        self.tally.counts().await.map_err(JournalError::Tally)
    }
}
