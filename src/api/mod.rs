//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into domain operations and formats
//! responses as HAL documents.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`hal`] - Hypermedia links and the `application/hal+json` wrapper
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Tracing and metrics middleware
//! - [`openapi`] - Generated OpenAPI document
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod hal;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
