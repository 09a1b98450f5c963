//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are validated with `validator`; responses follow HAL.

pub mod device;
pub mod health;
pub mod pagination;
