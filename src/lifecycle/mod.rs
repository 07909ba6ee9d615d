//! Lifecycle Coordinator Module
//!
//! Orchestrates one instance's whole participation in a job:
//! registration (the broker-side barrier that also yields the ordinal
//! identity), relay startup, the engine run, the drain-before-stop teardown,
//! and unregistration.
//!
//! Every failure is caught at this boundary and reported as a structured
//! [`types::RunReport`] carrying the error description and elapsed duration,
//! never as an unhandled fault. Aggregation policy on non-success reports is
//! the caller's call; [`coordinator::merge_reports`] implements the strict
//! variant that fails the whole job.

pub mod coordinator;
pub mod types;
