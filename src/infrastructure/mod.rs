//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`database`] - Connection pool, schema bootstrap and migrations
//! - [`persistence`] - Repository implementations

pub mod database;
pub mod persistence;
