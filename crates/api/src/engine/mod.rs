//! Side effects that follow qualifying user actions.
//!
//! - [`activity`] -- weekly streak bookkeeping and badge evaluation.

pub mod activity;
