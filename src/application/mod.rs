//! Application layer containing the payment core's use cases.
//!
//! `engine::PaymentEngine` is the entry point. Each use case runs inside a
//! single store transaction: every check happens before any mutation, the
//! first failure rolls the whole transaction back, and a commit publishes
//! all effects at once.

pub mod deposits;
pub mod engine;
pub mod payments;
