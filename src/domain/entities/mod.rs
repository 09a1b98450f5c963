//! Core domain entities representing the device registry data model.
//!
//! Entities are plain data structures. Business rules live in
//! [`crate::application::services`].
//!
//! # Entity Types
//!
//! - [`Device`] - A registered device and its [`DeviceState`]
//! - [`Page`] - One page of results with navigation totals
//!
//! # Design Pattern
//!
//! Separate structs describe each kind of write:
//! - `NewDevice` - For creating new records
//! - `DeviceUpdate` - For partial updates requested by clients
//! - `DeviceChanges` - Resolved values handed to the repository

pub mod device;
pub mod page;

pub use device::{Device, DeviceChanges, DeviceState, DeviceUpdate, NewDevice, UnknownDeviceState};
pub use page::{DeviceFilter, Page, PageRequest};
