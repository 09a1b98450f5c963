//! HTTP middleware for request processing.
//!
//! Provides request tracing and Prometheus metrics.

pub mod metrics;
pub mod tracing;
