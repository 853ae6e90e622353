//! Integration tests for the ctxkit pipeline.
//!
//! These tests drive the generate, split, extract sequence end to end
//! through the library API, using small documents in temporary directories.

use ctxkit::config::Config;
use ctxkit::content::Catalog;
use ctxkit::pdf;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Two small sections so a full run stays fast
const TINY_CATALOG: &str = r#"
[[sections]]
title = "Attention Mechanisms"
sentences = [
    "Attention weights express pairwise token relevance.",
    "Positional encodings preserve sequence order.",
]

[[sections]]
title = "Optimization Methods"
sentences = ["Adaptive learning rates accelerate convergence."]
"#;

fn tiny_catalog() -> Catalog {
    Catalog::from_toml_str(TINY_CATALOG).unwrap()
}

/// Build a config with every stage pointed into the given directory
fn pipeline_config(root: &Path, cycles: usize, repetitions: usize) -> Config {
    let mut config = Config::default();
    config.document.output = root.join("doc.pdf");
    config.document.cycles = cycles;
    config.document.repetitions = repetitions;
    config.split.input = config.document.output.clone();
    config.split.pages_dir = root.join("pdf_pages");
    config.extract.pages_dir = config.split.pages_dir.clone();
    config.extract.text_dir = root.join("pdf_text");
    config
}

/// Test the full generate, split, extract sequence end to end
#[test]
fn test_full_pipeline() {
    let dir = tempdir().unwrap();
    let config = pipeline_config(dir.path(), 2, 2);

    let build = pdf::build(&tiny_catalog(), &config.document, true).unwrap();
    // cycles x total base sentences x repetitions
    assert_eq!(build.paragraphs, 2 * 3 * 2);
    assert!(build.pages > 0);
    assert!(build.bytes > 0);

    let split = pdf::split(&config.split, true).unwrap();
    assert_eq!(split.pages.len(), build.pages);
    for (i, page) in split.pages.iter().enumerate() {
        assert!(page.path.ends_with(format!("page_{:03}.pdf", i + 1)));
        assert!(page.bytes > 0);
    }

    let extract = pdf::extract(&config.extract, true).unwrap();
    assert_eq!(extract.files.len(), build.pages);
    assert!(extract.total_chars > 0);
    // Every page yields at least one token.
    assert!(extract.total_tokens >= extract.files.len() as u64);
    assert!(extract.average_tokens().unwrap() >= 1);
}

/// Test that the title page text survives splitting and extraction
#[test]
fn test_title_page_text_round_trip() {
    let dir = tempdir().unwrap();
    let config = pipeline_config(dir.path(), 1, 1);

    pdf::build(&tiny_catalog(), &config.document, true).unwrap();
    pdf::split(&config.split, true).unwrap();
    let extract = pdf::extract(&config.extract, true).unwrap();

    let first = std::fs::read_to_string(&extract.files[0].text_path).unwrap();
    assert!(first.contains("Comprehensive AI Research Document"));
}

/// Test that extract totals are the sums of the per-page values
#[test]
fn test_extract_totals_are_sums() {
    let dir = tempdir().unwrap();
    let config = pipeline_config(dir.path(), 1, 2);

    pdf::build(&tiny_catalog(), &config.document, true).unwrap();
    pdf::split(&config.split, true).unwrap();
    let extract = pdf::extract(&config.extract, true).unwrap();

    let sum_chars: usize = extract.files.iter().map(|f| f.char_count).sum();
    let sum_tokens: u64 = extract.files.iter().map(|f| f.token_estimate).sum();
    assert_eq!(extract.total_chars, sum_chars);
    assert_eq!(extract.total_tokens, sum_tokens);
    assert_eq!(
        extract.average_tokens(),
        Some(sum_tokens / extract.files.len() as u64)
    );
}

/// Test that a second run over the same directories overwrites cleanly
#[test]
fn test_pipeline_rerun_is_stable() {
    let dir = tempdir().unwrap();
    let config = pipeline_config(dir.path(), 1, 1);
    let catalog = tiny_catalog();

    pdf::build(&catalog, &config.document, true).unwrap();
    let first_split = pdf::split(&config.split, true).unwrap();
    let first_extract = pdf::extract(&config.extract, true).unwrap();

    pdf::build(&catalog, &config.document, true).unwrap();
    let second_split = pdf::split(&config.split, true).unwrap();
    let second_extract = pdf::extract(&config.extract, true).unwrap();

    assert_eq!(first_split.pages.len(), second_split.pages.len());
    assert_eq!(first_extract.total_chars, second_extract.total_chars);
    assert_eq!(first_extract.total_tokens, second_extract.total_tokens);
}

/// Test that zero cycles still produces the one-page title document
#[test]
fn test_zero_cycles_title_only_document() {
    let dir = tempdir().unwrap();
    let config = pipeline_config(dir.path(), 0, 5);

    let build = pdf::build(&tiny_catalog(), &config.document, true).unwrap();
    assert_eq!(build.pages, 1);
    assert_eq!(build.paragraphs, 0);

    let split = pdf::split(&config.split, true).unwrap();
    assert_eq!(split.pages.len(), 1);

    let extract = pdf::extract(&config.extract, true).unwrap();
    assert_eq!(extract.files.len(), 1);
    assert!(extract.total_chars > 0);
}

/// Test that the default config wires the stage paths together
#[test]
fn test_default_config_stage_paths() {
    let config = Config::default();

    assert_eq!(
        config.document.output,
        PathBuf::from("large_ai_research_document.pdf")
    );
    // Split reads what generate writes, extract reads what split writes.
    assert_eq!(config.split.input, config.document.output);
    assert_eq!(config.split.pages_dir, PathBuf::from("pdf_pages"));
    assert_eq!(config.extract.pages_dir, config.split.pages_dir);
    assert_eq!(config.extract.text_dir, PathBuf::from("pdf_text"));
    assert!((config.extract.chars_per_token - 3.8).abs() < f64::EPSILON);
}
