//! Research section catalog and paragraph expansion.
//!
//! The generated document is assembled from a small catalog of section
//! titles and base sentences. Each base sentence is expanded into a long
//! paragraph by appending a fixed set of explanatory clauses, then repeated
//! many times to inflate the document to a size useful for context-window
//! testing.
//!
//! # Catalog File Format
//!
//! ```toml
//! [[sections]]
//! title = "Deep Learning Fundamentals and Mathematical Foundations"
//! sentences = [
//!     "Neural networks are sophisticated computational models...",
//!     "The fundamental building block is the artificial neuron...",
//! ]
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Catalog compiled into the binary; used when no `--catalog` is given.
const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Clauses appended to every base sentence, in order. Two positions embed
/// the lowercased base sentence itself (see [`expand_sentence`]).
const FUNDAMENTALS_CLAUSE: &str = "This concept is fundamental to understanding modern AI systems and represents a significant breakthrough in computational approaches to machine learning. ";
const INSTITUTIONS_CLAUSE: &str = "Research from leading institutions including MIT, Stanford, Carnegie Mellon, UC Berkeley, and Google Research has shown that ";
const FRAMEWORKS_CLAUSE: &str = "Implementation details vary significantly across different frameworks including TensorFlow 2.x, PyTorch 2.0, JAX with Flax, Hugging Face Transformers, and specialized libraries like FairSeq and AllenNLP. ";
const BENCHMARKS_CLAUSE: &str = "Performance benchmarks conducted on diverse hardware configurations including NVIDIA A100, H100, V100 GPUs, TPU v4 pods, and AWS Trainium instances indicate substantial improvements when ";
const DOMAINS_CLAUSE: &str = "Industry applications span numerous domains including healthcare diagnostics, financial risk assessment, autonomous vehicle perception, robotics control systems, natural language understanding, computer vision, and drug discovery. ";
const FUTURE_WORK_CLAUSE: &str = "Future research directions encompass optimization strategies, model interpretability techniques, robustness enhancement methods, privacy-preserving approaches, federated learning architectures, and sustainable AI development practices. ";
const MATH_CLAUSE: &str = "Mathematical formulations underlying these concepts involve complex optimization problems, gradient-based learning algorithms, statistical learning theory, information theory principles, and computational complexity analysis. ";
const VALIDATION_CLAUSE: &str = "Experimental validation requires comprehensive datasets, rigorous evaluation protocols, statistical significance testing, ablation studies, and reproducibility verification across multiple research groups and computational environments. ";
const DEPLOYMENT_CLAUSE: &str = "The implications for practical deployment include considerations for model serving infrastructure, real-time inference requirements, batch processing capabilities, monitoring and observability systems, A/B testing frameworks, and continuous learning pipelines. ";

/// One titled section with its ordered base sentences.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub title: String,
    pub sentences: Vec<String>,
}

/// Ordered collection of sections. Section order is preserved from the
/// source file and titles are unique.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub sections: Vec<Section>,
}

/// Catalog loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog has no sections")]
    Empty,

    #[error("section '{0}' has no sentences")]
    EmptySection(String),

    #[error("duplicate section title: '{0}'")]
    DuplicateTitle(String),
}

impl Catalog {
    /// Load the built-in eight-section research catalog.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog from an alternate TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate catalog TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, ContentError> {
        let catalog: Catalog = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.sections.is_empty() {
            return Err(ContentError::Empty);
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.sentences.is_empty() {
                return Err(ContentError::EmptySection(section.title.clone()));
            }
            if !seen.insert(section.title.as_str()) {
                return Err(ContentError::DuplicateTitle(section.title.clone()));
            }
        }

        Ok(())
    }

    /// Total number of base sentences across all sections.
    pub fn sentence_count(&self) -> usize {
        self.sections.iter().map(|s| s.sentences.len()).sum()
    }
}

/// Expand one base sentence into a full paragraph by appending the fixed
/// clause sequence. The institutions and benchmarks clauses are continued
/// with the lowercased base sentence, so the base text appears three times
/// per paragraph in total.
pub fn expand_sentence(base: &str) -> String {
    let lowered = base.to_lowercase();

    let mut paragraph = String::with_capacity(base.len() * 3 + 1600);
    paragraph.push_str(base);
    paragraph.push(' ');
    paragraph.push_str(FUNDAMENTALS_CLAUSE);
    paragraph.push_str(INSTITUTIONS_CLAUSE);
    paragraph.push_str(&lowered);
    paragraph.push(' ');
    paragraph.push_str(FRAMEWORKS_CLAUSE);
    paragraph.push_str(BENCHMARKS_CLAUSE);
    paragraph.push_str(&lowered);
    paragraph.push(' ');
    paragraph.push_str(DOMAINS_CLAUSE);
    paragraph.push_str(FUTURE_WORK_CLAUSE);
    paragraph.push_str(MATH_CLAUSE);
    paragraph.push_str(VALIDATION_CLAUSE);
    paragraph.push_str(DEPLOYMENT_CLAUSE);
    paragraph
}

/// Expand every sentence `repetitions` times, in sentence-major order: all
/// repetitions of the first sentence, then the second, and so on. The copies
/// are intentionally identical; repetition exists only to inflate size.
pub fn expand(sentences: &[String], repetitions: usize) -> Vec<String> {
    let mut expanded = Vec::with_capacity(sentences.len() * repetitions);
    for base in sentences {
        let paragraph = expand_sentence(base);
        for _ in 0..repetitions {
            expanded.push(paragraph.clone());
        }
    }
    expanded
}
