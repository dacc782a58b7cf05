//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: tracing subscriber initialization
//! - **Metrics**: thread-safe process-wide counters

pub mod logging;
pub mod metrics;
