//! Device repository implementations.
//!
//! # Repositories
//!
//! - [`PgDeviceRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryDeviceRepository`] - process-local storage for tests and local runs

pub mod memory_device_repository;
pub mod pg_device_repository;

pub use memory_device_repository::InMemoryDeviceRepository;
pub use pg_device_repository::PgDeviceRepository;
