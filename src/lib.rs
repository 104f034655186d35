#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Moodgate
//!
//! The mood-logging core of a personal well-being journal: a fixed-window
//! submission throttle, pluggable state persistence, and the gate-then-tally
//! submit flow.
//!
//! ## Features
//!
//! - **Submission throttle** with an exact fixed-window policy (a window
//!   reset counts as the window's first admission)
//! - **Pluggable stores** for the persisted window state and per-mood
//!   tallies (in-memory and JSON-file backends included)
//! - **Injectable clock** for deterministic tests
//! - **Tower middleware** to gate service-shaped callers
//! - Denial ("try again later") kept distinct from storage failure at every
//!   layer
//!
//! ## Quick Start
//!
//! ```rust
//! use moodgate::{LogOutcome, Mood, MoodJournal, SubmissionThrottle};
//! use moodgate::journal::MemoryTallyStore;
//! use moodgate::throttle::MemoryStateStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let throttle = SubmissionThrottle::new(MemoryStateStore::new());
//!     let journal = MoodJournal::new(throttle, MemoryTallyStore::new());
//!
//!     match journal.log(Mood::Happy).await.unwrap() {
//!         LogOutcome::Recorded { count } => println!("Happy, logged {count} time(s)"),
//!         LogOutcome::RateLimited { retry_after } => {
//!             println!("limit reached, try again in {retry_after:?}")
//!         }
//!     }
//! }
//! ```

pub mod clock;
pub mod error;
pub mod journal;
pub mod mood;
pub mod prelude;
pub mod throttle;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use error::GateError;
pub use journal::{JournalError, LogOutcome, MoodJournal};
pub use mood::Mood;
pub use throttle::{Decision, SubmissionThrottle, ThrottleConfig, ThrottleState};
