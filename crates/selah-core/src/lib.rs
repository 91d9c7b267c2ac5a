//! # Selah Core
//!
//! The domain layer of the Selah quota service.
//! This crate holds the rate-limit counters, the policy that governs them and
//! the ports that infrastructure implements. It performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
