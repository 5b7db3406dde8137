//! Seismo Core
//!
//! Core types and abstractions for the Seismo earthquake service.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, JobResult, Earthquake, etc.)
//! - DTOs: Data transfer objects shared by the API, the worker and the client

pub mod domain;
pub mod dto;
