//! Utility modules shared across the pipeline.
//!
//! - [`http::HttpClient`]: shared HTTP client used by the probes
//! - [`progress::ProgressReporter`]: terminal progress for long renders
//! - [`display`]: terminal size detection and text truncation

pub mod display;
pub mod http;
pub mod progress;

pub use http::HttpClient;
