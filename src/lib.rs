//! # ctxkit
//!
//! A context-window testing toolkit: generates a large synthetic
//! AI-research PDF, splits it into single pages, extracts per-page text
//! with token estimates, and probes the model endpoints a test rig
//! depends on.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`content`]: Section catalog and paragraph expansion
//! - [`pdf`]: Document composition, rendering, splitting, and text
//!   extraction
//! - [`probe`]: Endpoint availability probes (HuggingFace, local
//!   inference)
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client, progress reporting, display helpers
//! - [`ui`]: Styled terminal output

pub mod config;
pub mod content;
pub mod pdf;
pub mod probe;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use content::Catalog;
pub use pdf::{BuildSummary, ExtractSummary, SplitSummary};
pub use probe::{Probe, ProbeReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
