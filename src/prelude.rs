//! Convenient re-exports for common moodgate types.
pub use crate::{
    clock::{Clock, SystemClock},
    error::GateError,
    journal::{JournalError, JsonTallyStore, LogOutcome, MemoryTallyStore, MoodJournal, TallyStore},
    mood::Mood,
    throttle::{
        Decision, JsonStateStore, MemoryStateStore, StateStore, StoreError, SubmissionThrottle,
        ThrottleConfig, ThrottleConfigError, ThrottleLayer, ThrottleState,
    },
};
