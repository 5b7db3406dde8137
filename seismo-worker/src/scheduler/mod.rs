//! Scheduler layer for the worker
//!
//! Consumes the job queue and drives each job through its lifecycle, from
//! dequeue to a stored result.

pub mod worker;

pub use worker::{Outcome, Worker};
