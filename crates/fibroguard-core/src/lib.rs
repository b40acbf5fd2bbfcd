//! # FibroGuardian Core
//!
//! The domain layer of the FibroGuardian backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the fixed-window rate limiting model and the ports infrastructure must implement.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
