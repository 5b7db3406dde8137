//! Core domain types
//!
//! This module contains the core domain structures used across Seismo services.
//! They are shared between the API (which creates jobs and serves results) and
//! the worker (which executes jobs and writes results).

pub mod job;
pub mod quake;
pub mod range;
pub mod result;
