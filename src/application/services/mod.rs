//! Business logic services for the application layer.

pub mod device_service;

pub use device_service::DeviceService;
