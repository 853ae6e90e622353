//! Configuration management.
//!
//! All tunables of the pipeline (paths, cycle/repetition counts, the
//! token-estimate ratio, probe endpoints and timeouts) live here so tests
//! and the CLI can parametrize components instead of relying on magic
//! numbers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document generation settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Page splitting settings
    #[serde(default)]
    pub split: SplitConfig,

    /// Text extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Endpoint probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            split: SplitConfig::default(),
            extract: ExtractConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Document generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Output path for the generated document
    #[serde(default = "default_document_path")]
    pub output: PathBuf,

    /// Number of times the full section catalog is repeated
    #[serde(default = "default_cycles")]
    pub cycles: usize,

    /// Number of copies of each expanded paragraph per section-cycle
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,

    /// Alternate section catalog file (built-in catalog when unset)
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output: default_document_path(),
            cycles: default_cycles(),
            repetitions: default_repetitions(),
            catalog: None,
        }
    }
}

fn default_document_path() -> PathBuf {
    PathBuf::from("large_ai_research_document.pdf")
}

fn default_cycles() -> usize {
    20
}

fn default_repetitions() -> usize {
    200
}

/// Page splitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Source document to split
    #[serde(default = "default_document_path")]
    pub input: PathBuf,

    /// Directory for the single-page output files
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: default_document_path(),
            pages_dir: default_pages_dir(),
        }
    }
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("pdf_pages")
}

/// Text extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Directory holding the single-page files to read
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    /// Directory for the extracted text files
    #[serde(default = "default_text_dir")]
    pub text_dir: PathBuf,

    /// Characters-per-token ratio for the token estimate. Policy constant,
    /// not derived; 3.8 approximates the Gemini tokenizer.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            text_dir: default_text_dir(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

fn default_text_dir() -> PathBuf {
    PathBuf::from("pdf_text")
}

fn default_chars_per_token() -> f64 {
    3.8
}

/// One named avatar space endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarSpace {
    pub name: String,
    pub url: String,
}

/// Endpoint probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// HuggingFace authentication check endpoint
    #[serde(default = "default_whoami_url")]
    pub whoami_url: String,

    /// Avatar model spaces, checked with a plain GET
    #[serde(default = "default_avatar_spaces")]
    pub avatar_spaces: Vec<AvatarSpace>,

    /// HuggingFace inference API base for the TTS model checks
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// TTS models checked through the inference API
    #[serde(default = "default_tts_models")]
    pub tts_models: Vec<String>,

    /// Sample text posted to the TTS models
    #[serde(default = "default_tts_sample_text")]
    pub tts_sample_text: String,

    /// Local LLM chat-completions endpoint
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    /// Model name sent to the local inference endpoint
    #[serde(default = "default_inference_model")]
    pub inference_model: String,

    /// Prompt sent to the local inference endpoint
    #[serde(default = "default_inference_prompt")]
    pub inference_prompt: String,

    /// max_tokens for the inference request
    #[serde(default = "default_inference_max_tokens")]
    pub inference_max_tokens: u32,

    /// Timeout for the whoami check, in seconds
    #[serde(default = "default_whoami_timeout")]
    pub whoami_timeout_secs: u64,

    /// Timeout per avatar space check, in seconds
    #[serde(default = "default_avatar_timeout")]
    pub avatar_timeout_secs: u64,

    /// Timeout per TTS model check, in seconds
    #[serde(default = "default_tts_timeout")]
    pub tts_timeout_secs: u64,

    /// Timeout for the inference check, in seconds
    #[serde(default = "default_inference_timeout")]
    pub inference_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            whoami_url: default_whoami_url(),
            avatar_spaces: default_avatar_spaces(),
            api_base: default_api_base(),
            tts_models: default_tts_models(),
            tts_sample_text: default_tts_sample_text(),
            inference_url: default_inference_url(),
            inference_model: default_inference_model(),
            inference_prompt: default_inference_prompt(),
            inference_max_tokens: default_inference_max_tokens(),
            whoami_timeout_secs: default_whoami_timeout(),
            avatar_timeout_secs: default_avatar_timeout(),
            tts_timeout_secs: default_tts_timeout(),
            inference_timeout_secs: default_inference_timeout(),
        }
    }
}

fn default_whoami_url() -> String {
    "https://huggingface.co/api/whoami-v2".to_string()
}

fn default_avatar_spaces() -> Vec<AvatarSpace> {
    [
        ("hallo", "https://fffiloni-hallo-api.hf.space"),
        ("sadtalker", "https://sadtalker.hf.space"),
        ("talking_face_tts", "https://cvpr-ml-talking-face.hf.space"),
        ("tts_hallo", "https://fffiloni-tts-hallo-talking-portrait.hf.space"),
    ]
    .into_iter()
    .map(|(name, url)| AvatarSpace {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

fn default_api_base() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_tts_models() -> Vec<String> {
    vec![
        "microsoft/speecht5_tts".to_string(),
        "facebook/mms-tts-eng".to_string(),
        "espnet/kan-bayashi_ljspeech_vits".to_string(),
    ]
}

fn default_tts_sample_text() -> String {
    "Hello, this is a test of the text to speech system.".to_string()
}

fn default_inference_url() -> String {
    "http://localhost:8321/inference/chat/completions".to_string()
}

fn default_inference_model() -> String {
    "Llama-4-Scout-17B-16E-Instruct".to_string()
}

fn default_inference_prompt() -> String {
    "Hello, can you introduce yourself?".to_string()
}

fn default_inference_max_tokens() -> u32 {
    100
}

fn default_whoami_timeout() -> u64 {
    10
}

fn default_avatar_timeout() -> u64 {
    15
}

fn default_tts_timeout() -> u64 {
    30
}

fn default_inference_timeout() -> u64 {
    30
}

/// Load configuration from a file, with environment variable overrides
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        // CTXKIT_DOCUMENT__CYCLES=2 overrides document.cycles
        .add_source(config::Environment::with_prefix("CTXKIT").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Default config file location (`<config dir>/ctxkit/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ctxkit").join("config.toml"))
}

/// Load the explicit config file if given, the default one if it exists,
/// or built-in defaults otherwise.
pub fn load_or_default(path: Option<&PathBuf>) -> Result<Config, config::ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.document.output,
            PathBuf::from("large_ai_research_document.pdf")
        );
        assert_eq!(config.document.cycles, 20);
        assert_eq!(config.document.repetitions, 200);
        assert_eq!(config.split.pages_dir, PathBuf::from("pdf_pages"));
        assert_eq!(config.extract.text_dir, PathBuf::from("pdf_text"));
        assert_eq!(config.extract.chars_per_token, 3.8);
    }

    #[test]
    fn test_default_probe_endpoints() {
        let probe = ProbeConfig::default();
        assert_eq!(probe.avatar_spaces.len(), 4);
        assert_eq!(probe.avatar_spaces[0].name, "hallo");
        assert_eq!(probe.tts_models.len(), 3);
        assert_eq!(probe.whoami_timeout_secs, 10);
        assert_eq!(probe.avatar_timeout_secs, 15);
        assert_eq!(probe.tts_timeout_secs, 30);
        assert_eq!(probe.inference_timeout_secs, 30);
        assert!(probe.inference_url.contains("localhost:8321"));
    }

    #[test]
    fn test_probe_timeout_overrides_are_independent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[probe]
tts_timeout_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.probe.tts_timeout_secs, 5);
        // The inference timeout has its own default and must not follow.
        assert_eq!(config.probe.inference_timeout_secs, 30);
    }

    #[test]
    fn test_load_config_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[document]
cycles = 2
repetitions = 5

[extract]
chars_per_token = 4.0
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.document.cycles, 2);
        assert_eq!(config.document.repetitions, 5);
        assert_eq!(config.extract.chars_per_token, 4.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.split.pages_dir, PathBuf::from("pdf_pages"));
        assert_eq!(config.probe.tts_models.len(), 3);
    }

    #[test]
    fn test_load_config_missing_file() {
        let path = PathBuf::from("/nonexistent/ctxkit.toml");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        // No explicit path: must not error even when no default file exists.
        let config = load_or_default(None).unwrap();
        assert_eq!(config.document.cycles, 20);
    }
}
