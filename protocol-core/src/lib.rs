//! # BankFeed Protocol Core
//!
//! Wire-level types for the BankFeed aggregation API:
//! - Domain models (accounts, transactions, payments, securities, ...)
//! - Mutation request payloads
//! - The bank-task protocol (task tokens, status polling, challenges)
//!
//! Everything in this crate is plain data plus serde; no I/O happens here.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod models;
pub mod requests;
pub mod task;

pub use models::*;
pub use requests::*;
pub use task::*;

/// Sync task name for transaction retrieval (on by default server-side)
pub const SYNC_TASK_TRANSACTIONS: &str = "transactions";

/// Sync task name for standing order retrieval
pub const SYNC_TASK_STANDING_ORDERS: &str = "standingOrders";
