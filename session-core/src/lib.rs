//! # BankFeed Session Core
//!
//! Client for the BankFeed aggregation API with:
//! - Authenticated JSON request dispatch (single attempt, no retry)
//! - Typed error taxonomy; 404 reported as absence, not failure
//! - Transparent unwrapping of `{ "<key>": [...] }` list envelopes
//! - The bank-task workflow: start, poll, challenge/response, cancel
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │       Session (resource accessors)            │
//! └───────────┬───────────────────────┬───────────┘
//!             │                       │
//! ┌───────────▼───────────┐ ┌─────────▼─────────┐
//! │      Dispatcher       │ │     BankTask      │
//! │  call / call_list /   │ │  state machine +  │
//! │  call_void / dispatch │ │   poll driver     │
//! └───────────┬───────────┘ └─────────┬─────────┘
//!             │                       │
//! ┌───────────▼───────────────────────▼───────────┐
//! │   Transport envelope + error classifier       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! All network I/O is off the caller's thread; completion is delivered
//! through the awaited future, exactly once.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod dispatch;
mod envelope;
pub mod error;
pub mod session;
pub mod task;
mod transport;

pub use config::{SessionConfig, TrustPolicy, DEFAULT_API_ENDPOINT, DEFAULT_TIMEOUT};
pub use dispatch::{Dispatcher, InFlight};
pub use error::{Error, Result};
pub use session::{Session, TransactionOptions};
pub use task::{BankTask, ChallengeHandler, PollPolicy, TaskState};
