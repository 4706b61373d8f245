//! regsift-common — Shared error type, throttle-aware HTTP client, and
//! harvest configuration used across all regsift crates.

pub mod client;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use client::{BackoffPolicy, FetchError, NoBackoff, RetryAfterBackoff, ThrottledClient};
pub use config::HarvestConfig;
pub use error::{RegsiftError, Result};
