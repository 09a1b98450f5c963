//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`DeviceRepository`] - Device CRUD, filtering and pagination

pub mod device_repository;

pub use device_repository::DeviceRepository;

#[cfg(test)]
pub use device_repository::MockDeviceRepository;
