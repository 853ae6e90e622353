//! HuggingFace avatar system probe.
//!
//! Checks the whoami endpoint (authentication), the avatar model spaces,
//! and the TTS models behind the inference API, in that order.

use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::utils::http::HttpClient;

use super::{
    send_check, CheckKind, EndpointCheck, EndpointHealth, NetworkError, Probe, ProbeReport,
};

/// Probe for the HuggingFace endpoints an avatar pipeline depends on
#[derive(Debug, Clone)]
pub struct HuggingFaceProbe {
    config: ProbeConfig,
    token: Option<String>,
}

impl HuggingFaceProbe {
    /// Create a probe reading the API token from `HF_TOKEN`, then
    /// `NEXT_PUBLIC_HF_TOKEN`
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            token: read_token(),
            config,
        }
    }

    /// Create a probe with an explicit token (or none)
    pub fn with_token(config: ProbeConfig, token: Option<String>) -> Self {
        Self { config, token }
    }

    async fn check_whoami(&self, client: &HttpClient, report: &mut ProbeReport) {
        let token = match &self.token {
            Some(token) => token,
            None => {
                warn!("no HuggingFace token found, skipping authentication check");
                report.note("No HuggingFace token found (set HF_TOKEN), authentication check skipped");
                return;
            }
        };

        let url = &self.config.whoami_url;
        debug!(url, "checking whoami");
        let start = Instant::now();
        let result = client
            .client()
            .get(url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(self.config.whoami_timeout_secs))
            .send()
            .await;

        let health = match result {
            Ok(response) => {
                let health = EndpointHealth::from_status(response.status().as_u16());
                if health.is_available() {
                    if let Ok(body) = response.json::<serde_json::Value>().await {
                        if let Some(name) = body.get("name").and_then(|v| v.as_str()) {
                            report.note(format!("Authenticated as: {}", name));
                        }
                    }
                }
                health
            }
            Err(err) => EndpointHealth::Failed(NetworkError::from_reqwest(&err)),
        };

        report.push(EndpointCheck {
            name: "whoami".to_string(),
            url: url.clone(),
            kind: CheckKind::Auth,
            health,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });
    }

    async fn check_avatar_spaces(&self, client: &HttpClient, report: &mut ProbeReport) {
        for space in &self.config.avatar_spaces {
            debug!(name = %space.name, url = %space.url, "checking avatar space");
            let request = client
                .client()
                .get(&space.url)
                .timeout(Duration::from_secs(self.config.avatar_timeout_secs));
            let (health, elapsed_ms) = send_check(request).await;
            report.push(EndpointCheck {
                name: space.name.clone(),
                url: space.url.clone(),
                kind: CheckKind::AvatarSpace,
                health,
                elapsed_ms,
            });
        }
    }

    async fn check_tts_models(&self, client: &HttpClient, report: &mut ProbeReport) {
        for model in &self.config.tts_models {
            let url = format!("{}/{}", self.config.api_base, model);
            debug!(model = %model, "checking TTS model");
            let mut request = client
                .client()
                .post(&url)
                .json(&json!({ "inputs": self.config.tts_sample_text }))
                .timeout(Duration::from_secs(self.config.tts_timeout_secs));
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            let (health, elapsed_ms) = send_check(request).await;
            report.push(EndpointCheck {
                name: model.clone(),
                url,
                kind: CheckKind::TtsModel,
                health,
                elapsed_ms,
            });
        }
    }
}

#[async_trait]
impl Probe for HuggingFaceProbe {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn run(&self, client: &HttpClient) -> ProbeReport {
        let mut report = ProbeReport::new(self.name());

        self.check_whoami(client, &mut report).await;
        self.check_avatar_spaces(client, &mut report).await;
        self.check_tts_models(client, &mut report).await;

        // Usable when authenticated with at least one avatar space and one
        // TTS model answering.
        report.ready = report.available_of(CheckKind::Auth) > 0
            && report.available_of(CheckKind::AvatarSpace) > 0
            && report.available_of(CheckKind::TtsModel) > 0;
        report
    }
}

fn read_token() -> Option<String> {
    std::env::var("HF_TOKEN")
        .or_else(|_| std::env::var("NEXT_PUBLIC_HF_TOKEN"))
        .ok()
        .filter(|token| !token.is_empty())
}
