//! Endpoint availability probes.
//!
//! This module defines the [`Probe`] trait and the report types shared by
//! the probe implementations. A probe issues one HTTP request per endpoint,
//! records the outcome, and keeps going: an unreachable endpoint never
//! aborts the run. There is no retry or backoff, these are one-shot
//! availability checks, not a health monitor.

mod huggingface;
mod inference;

pub use huggingface::HuggingFaceProbe;
pub use inference::InferenceProbe;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

use crate::utils::http::HttpClient;

/// Network failure classification for a single endpoint check
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkError {
    /// The request exceeded its deadline
    #[error("timed out")]
    Timeout,

    /// The endpoint refused the connection
    #[error("connection refused")]
    ConnectionRefused,

    /// The endpoint answered with a non-success status
    #[error("status {0}")]
    NonSuccessStatus(u16),

    /// Any other transport-level failure (DNS, TLS, protocol)
    #[error("{0}")]
    Transport(String),
}

impl NetworkError {
    /// Classify a reqwest error into the probe taxonomy
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return NetworkError::Timeout;
        }
        if err.is_connect() {
            return NetworkError::ConnectionRefused;
        }
        if let Some(status) = err.status() {
            return NetworkError::NonSuccessStatus(status.as_u16());
        }
        NetworkError::Transport(err.to_string())
    }
}

/// Interpreted state of one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointHealth {
    /// Answered 200
    Available,
    /// Answered 503, the model behind it is still loading
    Warming,
    /// Request failed or answered any other status
    Failed(NetworkError),
}

impl EndpointHealth {
    /// Map an HTTP status code onto a health state
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => EndpointHealth::Available,
            503 => EndpointHealth::Warming,
            other => EndpointHealth::Failed(NetworkError::NonSuccessStatus(other)),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, EndpointHealth::Available)
    }
}

impl fmt::Display for EndpointHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointHealth::Available => write!(f, "available"),
            EndpointHealth::Warming => write!(f, "warming (model loading)"),
            EndpointHealth::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// What a check was probing for, used to group report lines and decide
/// overall readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Auth,
    AvatarSpace,
    TtsModel,
    Inference,
}

/// Outcome of one endpoint check
#[derive(Debug, Clone, Serialize)]
pub struct EndpointCheck {
    pub name: String,
    pub url: String,
    pub kind: CheckKind,
    pub health: EndpointHealth,
    pub elapsed_ms: u64,
}

/// Full result of a probe run
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Probe identifier (e.g. "huggingface")
    pub probe: String,
    pub started_at: DateTime<Utc>,
    pub checks: Vec<EndpointCheck>,
    /// Free-form remarks (authenticated user, skipped checks, response
    /// excerpts)
    pub notes: Vec<String>,
    /// Whether the probed system is usable as a whole
    pub ready: bool,
}

impl ProbeReport {
    pub fn new(probe: &str) -> Self {
        Self {
            probe: probe.to_string(),
            started_at: Utc::now(),
            checks: Vec::new(),
            notes: Vec::new(),
            ready: false,
        }
    }

    pub fn push(&mut self, check: EndpointCheck) {
        self.checks.push(check);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Number of available endpoints of the given kind
    pub fn available_of(&self, kind: CheckKind) -> usize {
        self.checks
            .iter()
            .filter(|c| c.kind == kind && c.health.is_available())
            .count()
    }

    /// Number of checks of the given kind
    pub fn total_of(&self, kind: CheckKind) -> usize {
        self.checks.iter().filter(|c| c.kind == kind).count()
    }
}

/// An availability probe against one external system.
///
/// Implementations issue their checks sequentially and record every
/// outcome in the returned report; they do not return errors, a dead
/// endpoint is a result, not a failure of the probe itself.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe identifier, used for `--target` selection and report headers
    fn name(&self) -> &str;

    /// Run all checks and collect the report
    async fn run(&self, client: &HttpClient) -> ProbeReport;
}

/// Send a prepared request and interpret the outcome.
///
/// Consumes the response; callers that need the body (whoami) issue the
/// request themselves.
pub(crate) async fn send_check(request: reqwest::RequestBuilder) -> (EndpointHealth, u64) {
    let start = Instant::now();
    let health = match request.send().await {
        Ok(response) => EndpointHealth::from_status(response.status().as_u16()),
        Err(err) => EndpointHealth::Failed(NetworkError::from_reqwest(&err)),
    };
    (health, start.elapsed().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_from_status() {
        assert_eq!(EndpointHealth::from_status(200), EndpointHealth::Available);
        assert_eq!(EndpointHealth::from_status(503), EndpointHealth::Warming);
        assert_eq!(
            EndpointHealth::from_status(404),
            EndpointHealth::Failed(NetworkError::NonSuccessStatus(404))
        );
        // Only an exact 200 counts as available.
        assert_eq!(
            EndpointHealth::from_status(201),
            EndpointHealth::Failed(NetworkError::NonSuccessStatus(201))
        );
    }

    #[test]
    fn test_health_display() {
        assert_eq!(EndpointHealth::Available.to_string(), "available");
        assert_eq!(
            EndpointHealth::Warming.to_string(),
            "warming (model loading)"
        );
        assert_eq!(
            EndpointHealth::Failed(NetworkError::Timeout).to_string(),
            "failed: timed out"
        );
        assert_eq!(
            EndpointHealth::Failed(NetworkError::NonSuccessStatus(404)).to_string(),
            "failed: status 404"
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = ProbeReport::new("test");
        report.push(EndpointCheck {
            name: "a".to_string(),
            url: "http://a".to_string(),
            kind: CheckKind::AvatarSpace,
            health: EndpointHealth::Available,
            elapsed_ms: 1,
        });
        report.push(EndpointCheck {
            name: "b".to_string(),
            url: "http://b".to_string(),
            kind: CheckKind::AvatarSpace,
            health: EndpointHealth::Failed(NetworkError::Timeout),
            elapsed_ms: 2,
        });
        report.push(EndpointCheck {
            name: "t".to_string(),
            url: "http://t".to_string(),
            kind: CheckKind::TtsModel,
            health: EndpointHealth::Warming,
            elapsed_ms: 3,
        });

        assert_eq!(report.available_of(CheckKind::AvatarSpace), 1);
        assert_eq!(report.total_of(CheckKind::AvatarSpace), 2);
        // Warming is responding but not available.
        assert_eq!(report.available_of(CheckKind::TtsModel), 0);
        assert_eq!(report.total_of(CheckKind::TtsModel), 1);
        assert_eq!(report.total_of(CheckKind::Auth), 0);
        assert!(!report.ready);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ProbeReport::new("test");
        report.push(EndpointCheck {
            name: "a".to_string(),
            url: "http://a".to_string(),
            kind: CheckKind::Inference,
            health: EndpointHealth::Failed(NetworkError::ConnectionRefused),
            elapsed_ms: 12,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["probe"], "test");
        assert_eq!(json["checks"][0]["kind"], "inference");
        assert_eq!(json["checks"][0]["health"]["failed"], "connection_refused");
    }
}
