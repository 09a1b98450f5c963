//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod actuator;
pub mod devices;

pub use devices::{
    create_device, delete_device, get_device, list_devices, patch_device, replace_device,
};
