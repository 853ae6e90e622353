//! Local LLM inference endpoint probe.
//!
//! Sends one chat-completion request to a locally hosted model server and
//! reports whether it answers.

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ProbeConfig;
use crate::utils::http::HttpClient;

use super::{CheckKind, EndpointCheck, EndpointHealth, NetworkError, Probe, ProbeReport};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// Probe for a local chat-completions endpoint
#[derive(Debug, Clone)]
pub struct InferenceProbe {
    config: ProbeConfig,
}

impl InferenceProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    fn request_body(&self) -> ChatRequest {
        ChatRequest {
            model: self.config.inference_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: self.config.inference_prompt.clone(),
            }],
            max_tokens: self.config.inference_max_tokens,
        }
    }
}

#[async_trait]
impl Probe for InferenceProbe {
    fn name(&self) -> &str {
        "inference"
    }

    async fn run(&self, client: &HttpClient) -> ProbeReport {
        let mut report = ProbeReport::new(self.name());
        let url = &self.config.inference_url;
        debug!(url, model = %self.config.inference_model, "checking inference endpoint");

        let start = Instant::now();
        let result = client
            .client()
            .post(url)
            .json(&self.request_body())
            .timeout(Duration::from_secs(self.config.inference_timeout_secs))
            .send()
            .await;

        let health = match result {
            Ok(response) => {
                let health = EndpointHealth::from_status(response.status().as_u16());
                if health.is_available() {
                    if let Ok(body) = response.json::<serde_json::Value>().await {
                        report.note(format!(
                            "Model response: {}",
                            crate::utils::display::truncate_with_ellipsis(&body.to_string(), 120)
                        ));
                    }
                }
                health
            }
            Err(err) => EndpointHealth::Failed(NetworkError::from_reqwest(&err)),
        };

        report.push(EndpointCheck {
            name: self.config.inference_model.clone(),
            url: url.clone(),
            kind: CheckKind::Inference,
            health,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        report.ready = report.available_of(CheckKind::Inference) > 0;
        report
    }
}
