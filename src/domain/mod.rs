//! Domain slices.
//!
//! `collateral_type` and `position` wrap what the SDK fetches: a `wire.rs`
//! with the raw response shapes, conversions into validated types, and a
//! sub-client reached through [`FiatClient`](crate::client::FiatClient).
//! `form` holds the per-mode inputs the valuation engine reads and writes.
//! `transaction` tracks the single in-flight submission.

pub mod collateral_type;
pub mod form;
pub mod position;
pub mod transaction;
